//! Runtime paths. Defaults live under `~/.songmarks`; the CLI can override
//! each of them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use crate::db::default_db_path;

/// Log directory name inside the data directory.
const LOG_DIR_NAME: &str = "logs";

/// Where the application reads and writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// SQLite database holding the song snapshot. `:memory:` keeps
    /// everything in RAM for throwaway sessions.
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    /// Directory that receives `songs_backup.json` when exporting from the
    /// TUI.
    pub export_dir: PathBuf,
}

impl Settings {
    /// Fill in any path the user did not pass on the command line.
    pub fn resolve(
        db_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        export_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => default_db_path()?,
        };
        let log_dir = match log_dir {
            Some(dir) => dir,
            None => default_log_dir()?,
        };
        let export_dir = export_dir.unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            db_path,
            log_dir,
            export_dir,
        })
    }

    /// True when the database should not touch the filesystem.
    pub fn in_memory(&self) -> bool {
        self.db_path == Path::new(":memory:")
    }

    /// Create the log and export directories if they are missing. The
    /// database directory is handled when the connection is opened.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.log_dir).context("failed to create log directory")?;
        fs::create_dir_all(&self.export_dir).context("failed to create export directory")?;
        Ok(())
    }
}

fn default_log_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs
        .home_dir()
        .join(crate::db::DATA_DIR_NAME)
        .join(LOG_DIR_NAME))
}
