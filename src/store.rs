//! The song store: sole owner of the collection. Every mutation follows the
//! same pattern: build the next collection, persist it, then swap it in. A
//! failed write therefore leaves memory and disk in agreement.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::error::{ImportError, NotFoundError, SongField, StoreError, ValidationError};
use crate::models::Song;
use crate::storage::SnapshotStorage;

/// Storage key holding the serialized collection.
pub const SONGS_KEY: &str = "songs";

/// Largest accepted song id: 2^53 - 1, the last integer a JSON number holds
/// exactly in every reader. Millisecond timestamps stay far below it.
pub const MAX_SONG_ID: i64 = 9_007_199_254_740_991;

/// Source of "now" for ids and `last_opened` stamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to whole milliseconds, matching the precision of the
/// serialized timestamps.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
    }
}

pub struct Store<S> {
    storage: S,
    clock: Box<dyn Clock>,
    songs: Vec<Song>,
}

impl<S: SnapshotStorage> Store<S> {
    /// Load the collection from `storage` using the system clock.
    pub fn load(storage: S) -> Result<Self, StoreError> {
        Self::load_with_clock(storage, Box::new(SystemClock))
    }

    /// Load the collection, falling back to an empty list when nothing is
    /// stored yet or the stored value does not parse. Only a failing read
    /// is an error.
    pub fn load_with_clock(storage: S, clock: Box<dyn Clock>) -> Result<Self, StoreError> {
        let songs = match storage.read(SONGS_KEY)? {
            Some(text) => match serde_json::from_str::<Vec<Song>>(&text) {
                Ok(songs) => songs,
                Err(err) => {
                    warn!("stored song list is unreadable, starting empty: {err}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        info!("loaded {} songs", songs.len());

        Ok(Self {
            storage,
            clock,
            songs,
        })
    }

    /// Songs in insertion order.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn get(&self, id: i64) -> Option<&Song> {
        self.songs.iter().find(|song| song.id == id)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Validate, classify and append a new song.
    pub fn add_song(&mut self, title: &str, artist: &str, link: &str) -> Result<Song, StoreError> {
        let title = required(title, SongField::Title)?;
        let artist = required(artist, SongField::Artist)?;
        let link = required(link, SongField::Link)?;

        let song = Song {
            id: self.next_id()?,
            title: title.to_string(),
            artist: artist.to_string(),
            link: link.to_string(),
            link_kind: classify(link),
            last_opened: None,
        };

        let mut next = self.songs.clone();
        next.push(song.clone());
        self.commit(next)?;
        info!(id = song.id, kind = %song.link_kind, "added song '{}'", song.title);
        Ok(song)
    }

    /// Remove the song with `id`. Returns `false` without touching storage
    /// when no such song exists.
    pub fn delete_song(&mut self, id: i64) -> Result<bool, StoreError> {
        if self.get(id).is_none() {
            debug!(id, "delete ignored, no such song");
            return Ok(false);
        }

        let next: Vec<Song> = self
            .songs
            .iter()
            .filter(|song| song.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        info!(id, "deleted song");
        Ok(true)
    }

    /// Stamp the song as opened now and hand back its link for the caller to
    /// launch.
    pub fn open_song(&mut self, id: i64) -> Result<String, StoreError> {
        let index = self
            .songs
            .iter()
            .position(|song| song.id == id)
            .ok_or(NotFoundError { id })?;

        let mut next = self.songs.clone();
        next[index].last_opened = Some(self.clock.now());
        let link = next[index].link.clone();
        self.commit(next)?;
        debug!(id, "marked song as opened");
        Ok(link)
    }

    /// Serialize the whole collection in the interchange format.
    pub fn export_snapshot(&self) -> String {
        serialize(&self.songs)
    }

    /// Replace the collection with the songs in `text`. The snapshot must be
    /// a JSON array of song records; each record needs non-empty title,
    /// artist and link fields and an id not used by an earlier record.
    pub fn import_snapshot(&mut self, text: &str) -> Result<(), StoreError> {
        let songs = parse_snapshot(text)?;
        let count = songs.len();
        self.commit(songs)?;
        info!("imported {count} songs");
        Ok(())
    }

    fn next_id(&self) -> Result<i64, StoreError> {
        let now = self.clock.now().timestamp_millis();
        match self.songs.iter().map(|song| song.id).max() {
            Some(max) if max >= now => max
                .checked_add(1)
                .ok_or(StoreError::IdsExhausted { max }),
            _ => Ok(now),
        }
    }

    fn commit(&mut self, next: Vec<Song>) -> Result<(), StoreError> {
        self.storage.write(SONGS_KEY, &serialize(&next))?;
        self.songs = next;
        Ok(())
    }
}

fn required(value: &str, field: SongField) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError { field })
    } else {
        Ok(trimmed)
    }
}

fn serialize(songs: &[Song]) -> String {
    // A Vec of plain structs with string keys cannot fail to serialize.
    serde_json::to_string(songs).unwrap_or_else(|_| String::from("[]"))
}

/// Parse and check an imported snapshot without touching any state.
pub fn parse_snapshot(text: &str) -> Result<Vec<Song>, ImportError> {
    let songs: Vec<Song> = serde_json::from_str(text)?;

    let mut seen = HashSet::with_capacity(songs.len());
    for (index, song) in songs.iter().enumerate() {
        for (field, value) in [
            (SongField::Title, &song.title),
            (SongField::Artist, &song.artist),
            (SongField::Link, &song.link),
        ] {
            if value.trim().is_empty() {
                return Err(ImportError::EmptyField { index, field });
            }
        }
        if !(0..=MAX_SONG_ID).contains(&song.id) {
            return Err(ImportError::IdOutOfRange {
                index,
                id: song.id,
                max: MAX_SONG_ID,
            });
        }
        if !seen.insert(song.id) {
            return Err(ImportError::DuplicateId { index, id: song.id });
        }
    }

    Ok(songs)
}
