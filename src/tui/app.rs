//! Application state for the TUI.
//!
//! [`App`] wraps the [`Workbench`] session with everything that only matters
//! on screen: focus, editor cursor, rename prompt, toasts and the results
//! viewport. Key handling is synchronous; anything that needs the query
//! service is handed back to the runner as an [`AppAction`].

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value as Json;
use tracing::debug;

use super::text::EditorState;
use super::widgets::spinner::Spinner;
use super::widgets::table;
use super::Event;
use crate::config::ProgressConfig;
use crate::error::Result;
use crate::session::{Completion, Dispatch, TabId, Workbench};

/// How long a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Rows moved by PageUp/PageDown in the results panel.
const PAGE_ROWS: usize = 10;

/// Width change per `+`/`-` press.
const RESIZE_STEP: u16 = 2;

/// Which panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Results,
}

impl Focus {
    /// Toggles between the editor and the results.
    pub fn next(self) -> Self {
        match self {
            Self::Editor => Self::Results,
            Self::Results => Self::Editor,
        }
    }
}

/// What the runner should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    None,
    /// Submit the active tab's query.
    Execute,
}

/// Single-line text input used by the rename prompt.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current input text.
    pub text: String,
    /// Cursor position (char index).
    pub cursor: usize,
}

impl InputState {
    /// Creates an input pre-filled with `text`, cursor at the end.
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn insert(&mut self, c: char) {
        let offset = super::text::byte_offset(&self.text, self.cursor);
        self.text.insert(offset, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let offset = super::text::byte_offset(&self.text, self.cursor);
            self.text.remove(offset);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }
}

/// An open rename prompt.
#[derive(Debug)]
pub struct RenameState {
    pub tab: TabId,
    pub input: InputState,
}

/// A transient notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub is_error: bool,
    shown_at: Instant,
}

impl Toast {
    fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_DURATION
    }
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    pub focus: Focus,
    pub workbench: Workbench,
    /// Cursor and selection in the active tab's query.
    pub editor: EditorState,
    pub rename: Option<RenameState>,
    pub toast: Option<Toast>,
    /// Column highlighted in the results panel.
    pub selected_column: usize,
    /// First result row shown.
    pub scroll: usize,
    /// Query service description for the header.
    pub service_info: String,
    /// Present while an execution is running.
    pub spinner: Option<Spinner>,
}

impl App {
    /// Creates the app with one empty tab.
    pub fn new(service_info: impl Into<String>, progress: &ProgressConfig) -> Self {
        Self {
            running: true,
            focus: Focus::default(),
            workbench: Workbench::new(progress),
            editor: EditorState::default(),
            rename: None,
            toast: None,
            selected_column: 0,
            scroll: 0,
            service_info: service_info.into(),
            spinner: None,
        }
    }

    /// Query text of the active tab, empty when no tab is open.
    pub fn editor_text(&self) -> &str {
        self.workbench
            .tabs()
            .active()
            .map(|t| t.content.as_str())
            .unwrap_or("")
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.set_toast(message.into(), false);
    }

    pub fn show_error_toast(&mut self, message: impl Into<String>) {
        self.set_toast(message.into(), true);
    }

    fn set_toast(&mut self, message: String, is_error: bool) {
        self.toast = Some(Toast {
            message,
            is_error,
            shown_at: Instant::now(),
        });
    }

    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    /// Submits the active tab's query (or the editor selection).
    ///
    /// Rejections are shown as a toast and yield `None`.
    pub fn begin_execution(&mut self) -> Option<Dispatch> {
        let selection = self
            .workbench
            .tabs()
            .active()
            .and_then(|tab| self.editor.selected_text(&tab.content))
            .map(str::to_string);

        match self.workbench.submit(selection.as_deref()) {
            Ok(dispatch) => {
                self.spinner = Some(Spinner::executing());
                Some(dispatch)
            }
            Err(e) => {
                debug!(error = %e, "Execution rejected");
                self.show_error_toast(e.message());
                None
            }
        }
    }

    /// Stores the outcome of the running execution.
    pub fn finish_execution(&mut self, outcome: Result<Json>) -> Option<Completion> {
        self.spinner = None;
        let completion = self.workbench.complete(outcome)?;
        if self.workbench.tabs().active_id() == Some(completion.tab) {
            self.reset_results_view();
        }
        Some(completion)
    }

    /// Handles an event and returns what the runner should do next.
    pub fn handle_event(&mut self, event: Event) -> AppAction {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(_, _) | Event::Tick => AppAction::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if self.rename.is_some() {
            self.handle_rename_key(key);
            return AppAction::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.running = false;
            }
            KeyCode::Char('e') if ctrl => return AppAction::Execute,
            KeyCode::F(5) => return AppAction::Execute,
            KeyCode::Char('t') if ctrl => {
                self.workbench.tabs_mut().add_tab();
                self.on_tab_changed();
            }
            KeyCode::Char('w') if ctrl => self.close_active_tab(),
            KeyCode::Right if ctrl || alt => {
                self.workbench.tabs_mut().next_tab();
                self.on_tab_changed();
            }
            KeyCode::Left if ctrl || alt => {
                self.workbench.tabs_mut().previous_tab();
                self.on_tab_changed();
            }
            KeyCode::F(2) => self.start_rename(),
            KeyCode::Tab => {
                self.focus = self.focus.next();
            }
            _ => match self.focus {
                Focus::Editor => self.handle_editor_key(key),
                Focus::Results => self.handle_results_key(key),
            },
        }
        AppAction::None
    }

    fn close_active_tab(&mut self) {
        if let Some(id) = self.workbench.tabs().active_id() {
            self.workbench.tabs_mut().remove_tab(id);
            self.on_tab_changed();
        }
    }

    fn on_tab_changed(&mut self) {
        self.editor = EditorState::at_end(self.editor_text());
        self.reset_results_view();
    }

    fn reset_results_view(&mut self) {
        self.selected_column = 0;
        self.scroll = 0;
    }

    fn start_rename(&mut self) {
        if let Some(tab) = self.workbench.tabs().active() {
            self.rename = Some(RenameState {
                tab: tab.id,
                input: InputState::with_text(&tab.name),
            });
        }
    }

    fn handle_rename_key(&mut self, key: KeyEvent) {
        let Some(rename) = self.rename.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let name = rename.input.text.trim().to_string();
                let tab = rename.tab;
                self.rename = None;
                if !name.is_empty() {
                    self.workbench.tabs_mut().rename_tab(tab, name);
                }
            }
            KeyCode::Esc => self.rename = None,
            KeyCode::Backspace => rename.input.backspace(),
            KeyCode::Left => rename.input.move_left(),
            KeyCode::Right => rename.input.move_right(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                rename.input.insert(c)
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Some(id) = self.workbench.tabs().active_id() else {
            return;
        };
        let mut text = self.editor_text().to_string();
        self.editor.clamp(&text);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.editor.insert(&mut text, c)
            }
            KeyCode::Enter => self.editor.insert(&mut text, '\n'),
            KeyCode::Backspace if alt => self.editor.delete_word_backward(&mut text),
            KeyCode::Backspace => self.editor.backspace(&mut text),
            KeyCode::Delete => self.editor.delete(&mut text),
            KeyCode::Left => self.editor.move_left(shift),
            KeyCode::Right => self.editor.move_right(&text, shift),
            KeyCode::Up => self.editor.move_up(&text),
            KeyCode::Down => self.editor.move_down(&text),
            KeyCode::Home => self.editor.move_home(&text),
            KeyCode::End => self.editor.move_end(&text),
            KeyCode::Esc => self.editor.clear_selection(),
            _ => return,
        }

        if text != self.editor_text() {
            self.workbench.tabs_mut().update_content(id, text);
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let Some(tab) = self.workbench.tabs().active() else {
            return;
        };
        let Some(result) = tab.query_result.as_ref() else {
            return;
        };
        let column_count = result.columns.len();
        let row_count = result.row_count();
        let current_width = tab
            .column_width(self.selected_column)
            .unwrap_or_else(|| table::auto_column_width(result, self.selected_column));
        let id = tab.id;

        match key.code {
            KeyCode::Left => self.selected_column = self.selected_column.saturating_sub(1),
            KeyCode::Right => {
                if self.selected_column + 1 < column_count {
                    self.selected_column += 1;
                }
            }
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => {
                if self.scroll + 1 < row_count {
                    self.scroll += 1;
                }
            }
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(PAGE_ROWS),
            KeyCode::PageDown => {
                self.scroll = (self.scroll + PAGE_ROWS).min(row_count.saturating_sub(1));
            }
            KeyCode::Char('s') | KeyCode::Enter => {
                if let Some(sort) = self.workbench.tabs_mut().sort_active(self.selected_column) {
                    debug!(column = sort.column_index, direction = ?sort.direction, "Sorted");
                    self.scroll = 0;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') if column_count > 0 => {
                self.workbench.tabs_mut().set_column_width(
                    id,
                    self.selected_column,
                    current_width.saturating_add(RESIZE_STEP),
                );
            }
            KeyCode::Char('-') if column_count > 0 => {
                self.workbench.tabs_mut().set_column_width(
                    id,
                    self.selected_column,
                    current_width.saturating_sub(RESIZE_STEP),
                );
            }
            _ => {}
        }
    }
}
