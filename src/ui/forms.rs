use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Song;

/// Form state for adding a song.
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) link: String,
    pub(crate) active: FormField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the song form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum FormField {
    #[default]
    Title,
    Artist,
    Link,
}

impl FormField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Artist => "Artist",
            FormField::Link => "Link",
        }
    }

    /// Row of the field inside the form popup.
    pub(crate) fn row(self) -> u16 {
        match self {
            FormField::Title => 0,
            FormField::Artist => 1,
            FormField::Link => 2,
        }
    }
}

impl SongForm {
    /// Cycle focus forward across the three fields.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            FormField::Title => FormField::Artist,
            FormField::Artist => FormField::Link,
            FormField::Link => FormField::Title,
        };
    }

    /// Cycle focus backward (Shift+Tab).
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            FormField::Title => FormField::Link,
            FormField::Artist => FormField::Title,
            FormField::Link => FormField::Artist,
        };
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Artist => &self.artist,
            FormField::Link => &self.link,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Artist => &mut self.artist,
            FormField::Link => &mut self.link,
        }
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field: FormField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor column for the active field, relative to the popup's inner area.
    pub(crate) fn cursor_offset(&self) -> usize {
        let prefix = format!("{}: ", self.active.label()).len();
        prefix + self.value(self.active).chars().count()
    }
}

/// Path prompt shown before importing a backup file.
#[derive(Clone)]
pub(crate) struct ImportForm {
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl ImportForm {
    /// Prompt pre-filled with `path`, normally the last export location.
    pub(crate) fn with_path(path: String) -> Self {
        Self { path, error: None }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.path.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }

    pub(crate) fn trimmed_path(&self) -> Option<&str> {
        let trimmed = self.path.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// State for confirming permanent song deletion.
pub(crate) struct ConfirmSongDelete {
    pub(crate) song: Song,
}
