//! Domain models shared by the store, the view selector and the TUI. The
//! serde attributes pin the snapshot format: a JSON array of records with
//! `id`, `title`, `artist`, `link`, `linkType` and `lastOpened` keys, the same
//! shape the browser version of the tool wrote to local storage.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification tag derived from a song's link when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[serde(rename = "youtube")]
    YouTube,
    Tabs,
}

impl LinkKind {
    /// Short label used on song cards and in CLI listings.
    pub fn label(self) -> &'static str {
        match self {
            LinkKind::YouTube => "YouTube",
            LinkKind::Tabs => "Tabs",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single bookmarked song. Only the store constructs new values; everything
/// else receives them through the store's accessors or a view projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Creation time in milliseconds, bumped when needed to stay unique.
    pub id: i64,
    pub title: String,
    pub artist: String,
    /// Raw link text. Usually a URL but never parsed as one.
    pub link: String,
    /// Fixed at creation; never recomputed from `link`.
    #[serde(rename = "linkType")]
    pub link_kind: LinkKind,
    #[serde(default, with = "iso_millis")]
    pub last_opened: Option<DateTime<Utc>>,
}

impl Song {
    /// `Title by Artist`, used in confirmation dialogs and status messages.
    pub fn display_title(&self) -> String {
        if self.artist.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} by {}", self.title, self.artist)
        }
    }
}

/// Serialize optional timestamps as `2024-05-01T12:30:00.123Z`, the format
/// produced by `Date.prototype.toISOString`. Deserialization accepts any RFC
/// 3339 string so hand-edited backups still load.
pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|text| {
            DateTime::parse_from_rfc3339(&text)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
