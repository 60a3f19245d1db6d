use std::cmp::min;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, warn};

use crate::backup::{export_to_path, import_from_path, BACKUP_FILE_NAME};
use crate::db::SqliteStorage;
use crate::error::StoreError;
use crate::models::Song;
use crate::store::Store;
use crate::view::SortOrder;

use super::forms::{ConfirmSongDelete, FormField, ImportForm, SongForm};
use super::helpers::{centered_rect, cursor_in, kind_style, surface_error};
use super::screens::SongListScreen;

/// Header space for the filter, sort and delete-mode indicators.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height allocation per song card in the list.
const SONG_CARD_HEIGHT: u16 = 5;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 5;

/// Launches a link outside the terminal.
type LinkOpener = fn(&str) -> io::Result<()>;

fn launch_in_browser(link: &str) -> io::Result<()> {
    open_link(link)
}

/// Modal state layered over the song list.
enum Mode {
    Normal,
    AddingSong(SongForm),
    ConfirmSongDelete(ConfirmSongDelete),
    Importing(ImportForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: Store<SqliteStorage>,
    export_dir: PathBuf,
    list: SongListScreen,
    mode: Mode,
    delete_mode: bool,
    status: Option<StatusMessage>,
    opener: LinkOpener,
}

impl App {
    pub fn new(store: Store<SqliteStorage>, export_dir: PathBuf) -> Self {
        let list = SongListScreen::new(store.songs());
        Self {
            store,
            export_dir,
            list,
            mode: Mode::Normal,
            delete_mode: false,
            status: None,
            opener: launch_in_browser,
        }
    }

    /// Dispatch one key press. Returns `true` when the user asked to quit.
    /// Storage failures are returned as errors and end the session.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingSong(form) => self.handle_add_song(code, form)?,
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_song_delete(code, confirm)?,
            Mode::Importing(form) => self.handle_import(code, form)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.delete_mode {
                    self.delete_mode = false;
                    self.set_status("Delete mode off.", StatusKind::Info);
                } else {
                    *exit = true;
                }
            }
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::PageUp => self.list.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.list.move_selection(PAGE_STEP),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(),
            KeyCode::Enter => self.open_current()?,
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingSong(SongForm::default()));
            }
            KeyCode::Char('d') => {
                self.delete_mode = !self.delete_mode;
                let message = if self.delete_mode {
                    "Delete mode on. Press '-' to delete the selected song."
                } else {
                    "Delete mode off."
                };
                self.set_status(message, StatusKind::Info);
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if !self.delete_mode {
                    self.set_status("Press 'd' to enable delete mode first.", StatusKind::Error);
                } else if let Some(song) = self.list.current_song().cloned() {
                    self.clear_status();
                    return Ok(Mode::ConfirmSongDelete(ConfirmSongDelete { song }));
                } else {
                    self.set_status("No song selected to delete.", StatusKind::Error);
                }
            }
            KeyCode::Char('f') => {
                let mode = self.list.cycle_filter(self.store.songs());
                self.set_status(mode.label(), StatusKind::Info);
            }
            KeyCode::Char('n') => {
                self.list.set_sort(self.store.songs(), SortOrder::Name);
                self.set_status("Sorted by name.", StatusKind::Info);
            }
            KeyCode::Char('r') => {
                self.list.set_sort(self.store.songs(), SortOrder::LastOpened);
                self.set_status("Sorted by most recently opened.", StatusKind::Info);
            }
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('i') => {
                self.clear_status();
                let default_path = self.export_dir.join(BACKUP_FILE_NAME);
                return Ok(Mode::Importing(ImportForm::with_path(
                    default_path.display().to_string(),
                )));
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_song(&mut self, code: KeyCode, mut form: SongForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Song creation cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.store.add_song(&form.title, &form.artist, &form.link) {
                Ok(song) => {
                    self.list.refresh_focusing(self.store.songs(), song.id);
                    self.set_status(
                        format!("Added {} [{}].", song.display_title(), song.link_kind),
                        StatusKind::Info,
                    );
                    return Ok(Mode::Normal);
                }
                Err(err @ (StoreError::Validation(_) | StoreError::IdsExhausted { .. })) => {
                    let message = err.to_string();
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
                Err(err) => return Err(err.into()),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingSong(form))
    }

    fn handle_confirm_song_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmSongDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if self.store.delete_song(confirm.song.id)? {
                    self.set_status(
                        format!("Deleted {}.", confirm.song.display_title()),
                        StatusKind::Info,
                    );
                } else {
                    self.set_status("That song was already gone.", StatusKind::Error);
                }
                self.list.refresh(self.store.songs());
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmSongDelete(confirm)),
        }
    }

    fn handle_import(&mut self, code: KeyCode, mut form: ImportForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Import cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let Some(path) = form.trimmed_path().map(PathBuf::from) else {
                    form.error = Some("Enter the path of a backup file.".to_string());
                    return Ok(Mode::Importing(form));
                };
                match self.import(&path) {
                    Ok(count) => {
                        self.set_status(
                            format!("Import successful! {count} songs loaded."),
                            StatusKind::Info,
                        );
                        return Ok(Mode::Normal);
                    }
                    Err(err) => {
                        if matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Storage(_))) {
                            return Err(err);
                        }
                        warn!("import from {} failed: {err:#}", path.display());
                        let message = format!("Error importing file: {}", surface_error(&err));
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::Importing(form))
    }

    fn import(&mut self, path: &Path) -> Result<usize> {
        let count = import_from_path(&mut self.store, path)?;
        self.list.refresh(self.store.songs());
        self.list.select_first();
        Ok(count)
    }

    fn export(&mut self) {
        match export_to_path(&self.store, &self.export_dir) {
            Ok(path) => self.set_status(
                format!("Exported {} songs to {}.", self.store.len(), path.display()),
                StatusKind::Info,
            ),
            Err(err) => {
                warn!("export failed: {err:#}");
                self.set_status(
                    format!("Export failed: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    /// Record the open in the store, then hand the link to the system.
    fn open_current(&mut self) -> Result<()> {
        let Some(song) = self.list.current_song().cloned() else {
            return Ok(());
        };

        let link = match self.store.open_song(song.id) {
            Ok(link) => link,
            Err(StoreError::NotFound(_)) => {
                self.list.refresh(self.store.songs());
                self.set_status("That song no longer exists.", StatusKind::Error);
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        self.list.refresh(self.store.songs());

        if let Err(err) = (self.opener)(&link) {
            self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
        } else {
            debug!(id = song.id, "opened link");
            self.set_status(format!("Opened {}.", song.display_title()), StatusKind::Info);
        }
        Ok(())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let header_height = HEADER_HEIGHT.min(area.height);
        let footer_height = FOOTER_HEIGHT.min(area.height.saturating_sub(header_height));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Min(0),
                Constraint::Length(footer_height),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_song_list(frame, chunks[1]);
        if footer_height > 0 {
            self.draw_footer(frame, chunks[2]);
        }

        match &self.mode {
            Mode::AddingSong(form) => self.draw_song_form(frame, area, form),
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm_song_delete(frame, area, confirm),
            Mode::Importing(form) => self.draw_import_form(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        let badge = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut spans = vec![
            Span::styled("Songmarks", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled(self.list.view.filter.label(), badge),
            Span::raw("   "),
            Span::styled(self.list.view.sort.label(), badge),
            Span::raw(format!(
                "   {} of {} songs",
                self.list.visible.len(),
                self.store.len()
            )),
        ];
        if self.delete_mode {
            spans.push(Span::raw("   "));
            spans.push(Span::styled(
                "DELETE MODE",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }

        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Left);
        frame.render_widget(header, area);
    }

    fn draw_song_list(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }

        if self.store.is_empty() {
            let message = Paragraph::new("No songs yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Songs"));
            frame.render_widget(message, area);
            return;
        }

        if self.list.visible.is_empty() {
            let message = Paragraph::new(format!(
                "No songs match {}. Press 'f' to change it.",
                self.list.view.filter.label()
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Songs"));
            frame.render_widget(message, area);
            return;
        }

        self.render_song_cards(frame, area, &self.list.visible, self.list.selected);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match &self.mode {
            Mode::AddingSong(_) => &[
                ("[Tab]", " Next Field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::ConfirmSongDelete(_) => &[("[y]", " Delete   "), ("[n]", " Keep")],
            Mode::Importing(_) => &[("[Enter]", " Import   "), ("[Esc]", " Cancel")],
            Mode::Normal if self.delete_mode => &[
                ("[↑↓]", " Select   "),
                ("[-]", " Delete   "),
                ("[d/Esc]", " Leave Delete Mode   "),
                ("[q]", " Quit"),
            ],
            Mode::Normal => &[
                ("[↑↓]", " Select   "),
                ("[Enter]", " Open Link   "),
                ("[+]", " Add   "),
                ("[f]", " Filter   "),
                ("[n/r]", " Sort Name/Recent   "),
                ("[d]", " Delete Mode   "),
                ("[x]", " Export   "),
                ("[i]", " Import   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, action)| [Span::styled(*key, key_style), Span::raw(*action)])
            .collect();
        Line::from(spans)
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, form: &SongForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(FormField::Title),
            form.build_line(FormField::Artist),
            form.build_line(FormField::Link),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        frame.set_cursor_position(cursor_in(inner, form.cursor_offset(), form.active.row()));
    }

    fn draw_confirm_song_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete '{}'?", confirm.song.display_title())),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_import_form(&self, frame: &mut Frame, area: Rect, form: &ImportForm) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Import Backup").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            Line::from(vec![
                Span::raw("File: "),
                Span::styled(form.path.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Importing replaces every song in the list.",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);

        let column = "File: ".len() + form.path.chars().count();
        frame.set_cursor_position(cursor_in(inner, column, 0));
    }

    /// Draw the visible songs as cards. In delete mode the highlighted card
    /// carries the delete hint.
    fn render_song_cards(&self, frame: &mut Frame, area: Rect, songs: &[Song], selected: usize) {
        if songs.is_empty() || area.height == 0 {
            return;
        }

        let card_height = SONG_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = songs.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(SONG_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            if chunk.height == 0 {
                continue;
            }

            let song_index = start + idx;
            if song_index >= len {
                break;
            }

            let song = &songs[song_index];
            let is_selected = song_index == selected;
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if is_selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
                if self.delete_mode {
                    block = block.title(Span::styled(
                        " [-] Delete ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ));
                }
            }

            let title = if is_selected {
                format!("▶ {}", song.title)
            } else {
                song.title.clone()
            };

            let mut link_spans = vec![
                Span::styled(format!("[{}] ", song.link_kind), kind_style(song.link_kind)),
                Span::styled(song.link.clone(), Style::default().fg(Color::Cyan)),
            ];
            if let Some(opened) = song.last_opened {
                link_spans.push(Span::styled(
                    format!(
                        "  opened {}",
                        opened.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                    ),
                    Style::default().fg(Color::DarkGray),
                ));
            }

            let lines = vec![
                Line::from(Span::styled(
                    title,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("by {}", song.artist),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(link_spans),
            ];

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left)
                .style(paragraph_style);

            frame.render_widget(paragraph, *chunk);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::db::open_in_memory;
    use crate::models::LinkKind;
    use crate::store::tests::StepClock;
    use crate::view::FilterMode;

    const START: i64 = 1_714_566_600_000;

    fn quiet_opener(_link: &str) -> io::Result<()> {
        Ok(())
    }

    fn broken_opener(_link: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no browser"))
    }

    fn app_in(export_dir: &Path) -> App {
        let storage = SqliteStorage::new(open_in_memory().unwrap());
        let store =
            Store::load_with_clock(storage, Box::new(StepClock::starting_at(START))).unwrap();
        let mut app = App::new(store, export_dir.to_path_buf());
        app.opener = quiet_opener;
        app
    }

    fn app() -> App {
        app_in(Path::new("."))
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            app.handle_key(*key).unwrap();
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn add(app: &mut App, title: &str, artist: &str, link: &str) {
        press(app, &[KeyCode::Char('+')]);
        type_text(app, title);
        press(app, &[KeyCode::Tab]);
        type_text(app, artist);
        press(app, &[KeyCode::Tab]);
        type_text(app, link);
        press(app, &[KeyCode::Enter]);
    }

    fn status_text(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    fn visible_titles(app: &App) -> Vec<String> {
        app.list.visible.iter().map(|s| s.title.clone()).collect()
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn adding_through_the_form_saves_and_selects_the_song() {
        let mut app = app();
        add(&mut app, "Zelda", "Koji Kondo", "https://tabs.example/zelda");
        add(&mut app, "Anthem", "Rush", "https://youtu.be/anthem");

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store.len(), 2);
        assert_eq!(visible_titles(&app), vec!["Anthem", "Zelda"]);
        assert_eq!(app.list.current_song().map(|s| s.title.as_str()), Some("Anthem"));
        assert_eq!(app.list.visible[0].link_kind, LinkKind::YouTube);
        assert!(status_text(&app).starts_with("Added Anthem by Rush"));
    }

    #[test]
    fn blank_fields_keep_the_form_open_with_an_error() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('+')]);
        type_text(&mut app, "Only a title");
        press(&mut app, &[KeyCode::Enter]);

        match &app.mode {
            Mode::AddingSong(form) => {
                assert_eq!(form.error.as_deref(), Some("Artist is required."))
            }
            _ => panic!("form should stay open"),
        }
        assert!(app.store.is_empty());
        assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));
    }

    #[test]
    fn escape_cancels_the_form() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('+')]);
        type_text(&mut app, "Draft");
        press(&mut app, &[KeyCode::Esc]);

        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.store.is_empty());
    }

    #[test]
    fn filter_key_cycles_through_link_kinds() {
        let mut app = app();
        add(&mut app, "Video", "A", "https://youtube.com/watch?v=1");
        add(&mut app, "Sheet", "B", "https://tabs.example/sheet");

        press(&mut app, &[KeyCode::Char('f')]);
        assert_eq!(app.list.view.filter, FilterMode::YouTube);
        assert_eq!(visible_titles(&app), vec!["Video"]);

        press(&mut app, &[KeyCode::Char('f')]);
        assert_eq!(visible_titles(&app), vec!["Sheet"]);
        assert_eq!(status_text(&app), "Filter: Tabs");

        press(&mut app, &[KeyCode::Char('f')]);
        assert_eq!(app.list.view.filter, FilterMode::All);
        assert_eq!(visible_titles(&app), vec!["Sheet", "Video"]);
    }

    #[test]
    fn delete_needs_delete_mode_and_confirmation() {
        let mut app = app();
        add(&mut app, "Doomed", "A", "l");

        press(&mut app, &[KeyCode::Char('-')]);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));

        press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('-')]);
        assert!(matches!(app.mode, Mode::ConfirmSongDelete(_)));
        press(&mut app, &[KeyCode::Char('n')]);
        assert_eq!(app.store.len(), 1);

        press(&mut app, &[KeyCode::Char('-'), KeyCode::Char('y')]);
        assert!(app.store.is_empty());
        assert!(app.list.visible.is_empty());
        assert_eq!(status_text(&app), "Deleted Doomed by A.");
    }

    #[test]
    fn escape_leaves_delete_mode_before_quitting() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('d')]);
        assert!(!app.handle_key(KeyCode::Esc).unwrap());
        assert!(!app.delete_mode);
        assert!(app.handle_key(KeyCode::Esc).unwrap());
    }

    #[test]
    fn opening_records_time_and_recent_sort_uses_it() {
        let mut app = app();
        add(&mut app, "A", "x", "https://tabs.example/a");
        add(&mut app, "B", "x", "https://tabs.example/b");
        add(&mut app, "C", "x", "https://tabs.example/c");

        press(&mut app, &[KeyCode::Home, KeyCode::Enter]);
        press(&mut app, &[KeyCode::End, KeyCode::Enter]);
        press(&mut app, &[KeyCode::Char('r')]);

        assert_eq!(visible_titles(&app), vec!["C", "A", "B"]);
        assert_eq!(status_text(&app), "Sorted by most recently opened.");
        assert!(app.store.songs().iter().any(|s| s.last_opened.is_some()));

        press(&mut app, &[KeyCode::Char('n')]);
        assert_eq!(visible_titles(&app), vec!["A", "B", "C"]);
    }

    #[test]
    fn failed_launch_is_reported_but_still_recorded() {
        let mut app = app();
        add(&mut app, "A", "x", "https://tabs.example/a");
        app.opener = broken_opener;

        press(&mut app, &[KeyCode::Enter]);

        assert!(status_text(&app).starts_with("Failed to open link"));
        assert!(app.store.songs()[0].last_opened.is_some());
    }

    #[test]
    fn export_then_import_through_the_ui() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = app_in(dir.path());
        add(&mut source, "A", "x", "https://youtu.be/a");
        add(&mut source, "B", "y", "https://tabs.example/b");
        press(&mut source, &[KeyCode::Char('x')]);
        assert!(dir.path().join(BACKUP_FILE_NAME).is_file());

        let mut target = app_in(dir.path());
        add(&mut target, "Replaced", "z", "l");
        press(&mut target, &[KeyCode::Char('i'), KeyCode::Enter]);

        assert!(matches!(target.mode, Mode::Normal));
        assert_eq!(target.store.songs(), source.store.songs());
        assert_eq!(status_text(&target), "Import successful! 2 songs loaded.");
    }

    #[test]
    fn bad_import_file_keeps_songs_and_shows_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(BACKUP_FILE_NAME), "definitely not json").unwrap();
        let mut app = app_in(dir.path());
        add(&mut app, "Keep", "x", "l");

        press(&mut app, &[KeyCode::Char('i'), KeyCode::Enter]);

        match &app.mode {
            Mode::Importing(form) => assert!(form
                .error
                .as_deref()
                .is_some_and(|e| e.starts_with("Error importing file"))),
            _ => panic!("import prompt should stay open"),
        }
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.songs()[0].title, "Keep");
    }

    #[test]
    fn draws_header_cards_and_footer() {
        let mut app = app();
        add(&mut app, "Blackbird", "The Beatles", "https://youtu.be/bb");
        press(&mut app, &[KeyCode::Char('d')]);

        let screen = render(&app);

        assert!(screen.contains("Filter: All"));
        assert!(screen.contains("DELETE MODE"));
        assert!(screen.contains("Blackbird"));
        assert!(screen.contains("[YouTube]"));
        assert!(screen.contains("[-] Delete"));
    }

    #[test]
    fn draws_empty_state() {
        let screen = render(&app());
        assert!(screen.contains("No songs yet"));
    }

    #[test]
    fn quit_key_exits() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
