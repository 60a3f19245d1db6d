//! Filtering and ordering of the song list for display. Nothing here touches
//! the store; every function takes a slice and returns a fresh `Vec`.

use std::cmp::Ordering;
use std::fmt;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{LinkKind, Song};

/// Which link kinds are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    YouTube,
    Tabs,
}

impl FilterMode {
    /// Next mode in the fixed cycle All → YouTube → Tabs → All.
    pub fn cycle(self) -> Self {
        match self {
            FilterMode::All => FilterMode::YouTube,
            FilterMode::YouTube => FilterMode::Tabs,
            FilterMode::Tabs => FilterMode::All,
        }
    }

    pub fn matches(self, kind: LinkKind) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::YouTube => kind == LinkKind::YouTube,
            FilterMode::Tabs => kind == LinkKind::Tabs,
        }
    }

    /// Text for the filter toggle, e.g. `Filter: Youtube`.
    pub fn label(self) -> String {
        format!("Filter: {self}")
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterMode::All => "All",
            FilterMode::YouTube => "Youtube",
            FilterMode::Tabs => "Tabs",
        };
        f.write_str(name)
    }
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Name,
    LastOpened,
}

impl SortOrder {
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Name => "Sort: Name",
            SortOrder::LastOpened => "Sort: Recently Opened",
        }
    }
}

/// Per-session display settings owned by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub filter: FilterMode,
    pub sort: SortOrder,
}

impl ViewState {
    /// Advance the filter and return the new mode.
    pub fn cycle_filter(&mut self) -> FilterMode {
        self.filter = cycle_filter(self.filter);
        self.filter
    }

    /// Filtered list in the selected order.
    pub fn project(&self, songs: &[Song]) -> Vec<Song> {
        let filtered = apply_filter(songs, self.filter);
        match self.sort {
            SortOrder::Name => filtered,
            SortOrder::LastOpened => sort_by_last_opened(&filtered),
        }
    }
}

/// Keep songs matching `mode`, sorted by title.
pub fn apply_filter(songs: &[Song], mode: FilterMode) -> Vec<Song> {
    let filtered: Vec<Song> = songs
        .iter()
        .filter(|song| mode.matches(song.link_kind))
        .cloned()
        .collect();
    sort_by_name(&filtered)
}

pub fn cycle_filter(mode: FilterMode) -> FilterMode {
    mode.cycle()
}

/// Stable ascending sort by title.
pub fn sort_by_name(songs: &[Song]) -> Vec<Song> {
    let mut sorted = songs.to_vec();
    sorted.sort_by(|a, b| compare_titles(&a.title, &b.title));
    sorted
}

/// Stable sort, most recently opened first. Never-opened songs go last.
pub fn sort_by_last_opened(songs: &[Song]) -> Vec<Song> {
    let mut sorted = songs.to_vec();
    // `None` orders below every `Some`, so reversing the comparison puts
    // unopened songs at the end.
    sorted.sort_by(|a, b| b.last_opened.cmp(&a.last_opened));
    sorted
}

/// Compare titles on their folded keys, with the raw text as tie-breaker, so
/// "apple", "Apple" and "Äpple" sit together but still have a fixed order.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    fold_title(a)
        .cmp(&fold_title(b))
        .then_with(|| a.cmp(b))
}

/// Lowercased title with accents removed: NFD splits "É" into "E" plus a
/// combining mark, and the marks are dropped.
fn fold_title(title: &str) -> String {
    title
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
}
