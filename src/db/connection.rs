use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;
use tracing::debug;

/// Folder name used beneath the user's home directory for application data.
pub(crate) const DATA_DIR_NAME: &str = ".songmarks";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "songmarks.sqlite";

/// Open (or create) the database at `path` and make sure the key-value table
/// exists. Parent directories are created on demand so a fresh `--db` path
/// works without any setup.
pub fn ensure_schema(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    create_tables(&conn)?;
    debug!("opened database at {}", path.display());
    Ok(conn)
}

/// Fresh database that lives only as long as the connection. Used by tests
/// and by the `--db :memory:` escape hatch.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create kv_store table")?;
    Ok(())
}

/// Resolve the absolute path to the SQLite database inside the user's home.
pub fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
