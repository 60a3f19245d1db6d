//! Typed errors raised by the song store. Infrastructure code (SQLite, files,
//! the terminal) keeps using `anyhow`; these enums exist so callers can tell a
//! rejected form apart from a broken disk.

use std::fmt;

use thiserror::Error;

/// Required song fields, named for validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongField {
    Title,
    Artist,
    Link,
}

impl fmt::Display for SongField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SongField::Title => "Title",
            SongField::Artist => "Artist",
            SongField::Link => "Link",
        };
        f.write_str(name)
    }
}

/// A required field was empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} is required.")]
pub struct ValidationError {
    pub field: SongField,
}

/// No song with the given id exists in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Song {id} not found.")]
pub struct NotFoundError {
    pub id: i64,
}

/// Why a snapshot could not be imported. The collection is untouched in every
/// case.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("not a valid song list: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("record {index} has an empty {field}")]
    EmptyField { index: usize, field: SongField },
    #[error("record {index} reuses id {id}")]
    DuplicateId { index: usize, id: i64 },
    #[error("record {index} has id {id}, outside 0..={max}")]
    IdOutOfRange { index: usize, id: i64, max: i64 },
}

/// Error type for every `Store` operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Import(#[from] ImportError),
    /// The largest stored id leaves no room for another song.
    #[error("no song id is left after {max}.")]
    IdsExhausted { max: i64 },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
