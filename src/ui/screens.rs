use crate::models::Song;
use crate::view::{FilterMode, SortOrder, ViewState};

/// The song list as currently displayed: the view settings, the projection
/// they produce, and the highlighted row.
pub(crate) struct SongListScreen {
    pub(crate) view: ViewState,
    pub(crate) visible: Vec<Song>,
    pub(crate) selected: usize,
}

impl SongListScreen {
    pub(crate) fn new(songs: &[Song]) -> Self {
        let mut screen = Self {
            view: ViewState::default(),
            visible: Vec::new(),
            selected: 0,
        };
        screen.refresh(songs);
        screen
    }

    /// Recompute the projection after the collection or the view changed.
    /// The selection follows the previously highlighted song when it is
    /// still visible.
    pub(crate) fn refresh(&mut self, songs: &[Song]) {
        let focus = self.current_song().map(|song| song.id);
        self.visible = self.view.project(songs);
        if let Some(id) = focus {
            if let Some(index) = self.visible.iter().position(|song| song.id == id) {
                self.selected = index;
            }
        }
        self.ensure_in_bounds();
    }

    /// Recompute and highlight `id`.
    pub(crate) fn refresh_focusing(&mut self, songs: &[Song], id: i64) {
        self.visible = self.view.project(songs);
        self.selected = self
            .visible
            .iter()
            .position(|song| song.id == id)
            .unwrap_or(self.selected);
        self.ensure_in_bounds();
    }

    pub(crate) fn cycle_filter(&mut self, songs: &[Song]) -> FilterMode {
        let mode = self.view.cycle_filter();
        self.refresh(songs);
        mode
    }

    pub(crate) fn set_sort(&mut self, songs: &[Song], sort: SortOrder) {
        self.view.sort = sort;
        self.refresh(songs);
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.visible.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.visible.is_empty() {
            return;
        }
        let len = self.visible.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        if !self.visible.is_empty() {
            self.selected = 0;
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.visible.is_empty() {
            self.selected = self.visible.len() - 1;
        }
    }

    fn ensure_in_bounds(&mut self) {
        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkKind;

    fn song(id: i64, title: &str, kind: LinkKind) -> Song {
        Song {
            id,
            title: title.to_string(),
            artist: "A".to_string(),
            link: "l".to_string(),
            link_kind: kind,
            last_opened: None,
        }
    }

    fn library() -> Vec<Song> {
        vec![
            song(1, "Zelda", LinkKind::Tabs),
            song(2, "Anthem", LinkKind::YouTube),
            song(3, "Mango", LinkKind::YouTube),
        ]
    }

    #[test]
    fn starts_sorted_by_title() {
        let screen = SongListScreen::new(&library());
        let titles: Vec<&str> = screen.visible.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Anthem", "Mango", "Zelda"]);
    }

    #[test]
    fn selection_is_clamped() {
        let mut screen = SongListScreen::new(&library());
        screen.move_selection(10);
        assert_eq!(screen.selected, 2);
        screen.move_selection(-10);
        assert_eq!(screen.selected, 0);
        screen.select_last();
        assert_eq!(screen.current_song().map(|s| s.id), Some(1));
    }

    #[test]
    fn selection_follows_song_across_filter_changes() {
        let songs = library();
        let mut screen = SongListScreen::new(&songs);
        screen.move_selection(1);
        assert_eq!(screen.current_song().map(|s| s.id), Some(3));

        assert_eq!(screen.cycle_filter(&songs), FilterMode::YouTube);
        assert_eq!(screen.current_song().map(|s| s.id), Some(3));

        assert_eq!(screen.cycle_filter(&songs), FilterMode::Tabs);
        assert_eq!(screen.visible.len(), 1);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn empty_projection_has_no_current_song() {
        let mut screen = SongListScreen::new(&[]);
        screen.move_selection(1);
        assert!(screen.current_song().is_none());
    }
}
