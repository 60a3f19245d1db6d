//! The persistence seam used by the store. A backend only has to hold string
//! values under string keys; the store decides what goes in them.

use std::collections::HashMap;

use anyhow::Result;

/// Durable key-value storage for serialized snapshots.
pub trait SnapshotStorage {
    /// Fetch the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Volatile storage for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.values.insert(key.to_string(), value.to_string());
        storage
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
