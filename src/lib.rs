//! Core library for songmarks, a terminal bookmark list for songs.
//!
//! The store owns the collection and its persistence, `classify` tags each
//! link, and `view` turns the collection into the filtered, ordered list the
//! UI draws. The binary wires these to SQLite, the CLI and the TUI.
pub mod backup;
pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;
pub mod store;
pub mod ui;
pub mod view;

pub use classify::classify;
pub use error::{ImportError, NotFoundError, SongField, StoreError, ValidationError};
pub use models::{LinkKind, Song};
pub use storage::{MemoryStorage, SnapshotStorage};
pub use store::{Clock, Store, SystemClock};
pub use view::{FilterMode, SortOrder, ViewState};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
