use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::storage::SnapshotStorage;

/// Key-value storage backed by a single SQLite table. Each key holds one
/// opaque text value; the song store keeps its whole JSON snapshot under one
/// key.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Wrap a connection whose schema was prepared by `ensure_schema` or
    /// `open_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Every stored key, sorted. Handy for diagnostics and tests.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_store ORDER BY key")
            .context("failed to prepare key query")?;

        let keys = stmt
            .query_map([], |row| row.get(0))
            .context("failed to iterate keys")?
            .collect::<Result<Vec<String>, _>>()
            .context("failed to collect keys")?;

        Ok(keys)
    }
}

impl SnapshotStorage for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to read stored value")
    }

    /// Upsert the value. `ON CONFLICT` keeps the write a single statement, so
    /// a crash leaves either the old snapshot or the new one.
    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .context("failed to write stored value")?;
        Ok(())
    }
}
