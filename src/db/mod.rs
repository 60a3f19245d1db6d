//! Persistence module split across logical submodules.

mod connection;
mod kv;

pub(crate) use connection::DATA_DIR_NAME;
pub use connection::{default_db_path, ensure_schema, open_in_memory};
pub use kv::SqliteStorage;
