//! Headless mode for scripted testing and automation.
//!
//! Runs the TUI without a terminal, executing scripted events and capturing
//! output for verification. Queries run to completion before the next event
//! is processed, so scripts never need to wait for results.

mod events;
mod output;

pub use events::{Assertion, Event, EventParser};
pub use crate::cli::OutputFormat;
pub use output::{render, screen_text, ResultSummary};

use crate::cli::Cli;
use crate::config::ProgressConfig;
use crate::error::{Result, WorkbenchError};
use crate::service::QueryService;
use crate::tui::app::{App, AppAction};
use crate::tui::ui;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Configuration for headless mode execution.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub width: u16,
    pub height: u16,
    pub output_format: OutputFormat,
    /// Whether to stop on first assertion failure.
    pub fail_fast: bool,
    /// Path to write output (None = stdout).
    pub output_file: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            output_format: OutputFormat::Text,
            fail_fast: false,
            output_file: None,
        }
    }
}

impl HeadlessConfig {
    /// Creates a HeadlessConfig from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (width, height) = cli.parse_screen_size().map_err(WorkbenchError::config)?;
        let output_format = cli.parse_output_format().map_err(WorkbenchError::config)?;

        Ok(Self {
            width,
            height,
            output_format,
            fail_fast: cli.fail_fast,
            output_file: cli.output_file.clone(),
        })
    }
}

/// Result of headless execution.
#[derive(Debug)]
pub struct HeadlessResult {
    /// Final screen content as text.
    pub screen: String,
    pub screen_lines: Vec<String>,
    pub events_executed: usize,
    pub duration: Duration,
    pub assertions_passed: usize,
    pub assertions_failed: usize,
    /// Application state at the end of the run.
    pub state: HeadlessState,
    /// The active tab's result at the end of the run.
    pub result: Option<ResultSummary>,
    /// Frame captures (frames output mode only).
    pub frames: Vec<Frame>,
}

/// Snapshot of application state, used by `assert:state:` and JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlessState {
    pub focus: String,
    pub tab_count: usize,
    /// Name of the active tab.
    pub active_tab: Option<String>,
    pub editor_text: String,
    pub is_running: bool,
    pub progress: u8,
    /// Whether the active tab holds a result (failed queries included).
    pub has_result: bool,
    pub row_count: usize,
    pub column_count: usize,
    /// Sorted column and direction, e.g. "name asc".
    pub sort: Option<String>,
    pub selected_column: usize,
    pub scroll: usize,
    pub toast: Option<String>,
    /// Whether the app is still running.
    pub running: bool,
}

impl HeadlessState {
    pub fn from_app(app: &App) -> Self {
        let tab = app.workbench.tabs().active();
        let result = tab.and_then(|t| t.query_result.as_ref());
        let sort = tab.and_then(|t| {
            let sort = t.sort?;
            let column = result?.columns.get(sort.column_index)?;
            let direction = match sort.direction {
                crate::result::SortDirection::Ascending => "asc",
                crate::result::SortDirection::Descending => "desc",
            };
            Some(format!("{} {direction}", column.name))
        });

        Self {
            focus: format!("{:?}", app.focus),
            tab_count: app.workbench.tabs().len(),
            active_tab: tab.map(|t| t.name.clone()),
            editor_text: app.editor_text().to_string(),
            is_running: app.workbench.is_running(),
            progress: app.workbench.progress(),
            has_result: result.is_some(),
            row_count: result.map_or(0, |r| r.row_count()),
            column_count: result.map_or(0, |r| r.columns.len()),
            sort,
            selected_column: app.selected_column,
            scroll: app.scroll,
            toast: app.toast.as_ref().map(|t| t.message.clone()),
            running: app.running,
        }
    }

    /// String value of a field by name; absent optional values read as "none".
    pub fn field(&self, name: &str) -> Option<String> {
        let optional = |value: &Option<String>| {
            Some(value.clone().unwrap_or_else(|| "none".to_string()))
        };
        match name {
            "focus" => Some(self.focus.clone()),
            "tab_count" => Some(self.tab_count.to_string()),
            "active_tab" => optional(&self.active_tab),
            "editor_text" => Some(self.editor_text.clone()),
            "is_running" => Some(self.is_running.to_string()),
            "progress" => Some(self.progress.to_string()),
            "has_result" => Some(self.has_result.to_string()),
            "row_count" => Some(self.row_count.to_string()),
            "column_count" => Some(self.column_count.to_string()),
            "sort" => optional(&self.sort),
            "selected_column" => Some(self.selected_column.to_string()),
            "scroll" => Some(self.scroll.to_string()),
            "toast" => optional(&self.toast),
            "running" => Some(self.running.to_string()),
            _ => None,
        }
    }
}

/// A captured frame (screen state after an event).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame number (0 = initial state).
    pub number: usize,
    /// Event that produced this frame (None for initial).
    pub event: Option<String>,
    pub screen: String,
}

/// Runs the TUI in headless mode.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    terminal: Terminal<TestBackend>,
    app: App,
    service: Arc<dyn QueryService>,
    events: Vec<Event>,
    frames: Vec<Frame>,
    start_time: Instant,
    assertions_passed: usize,
    assertions_failed: usize,
}

impl HeadlessRunner {
    pub fn new(
        config: HeadlessConfig,
        service: Arc<dyn QueryService>,
        progress: &ProgressConfig,
    ) -> Result<Self> {
        let backend = TestBackend::new(config.width, config.height);
        let terminal = Terminal::new(backend).map_err(|e| {
            WorkbenchError::internal(format!("Failed to create test terminal: {e}"))
        })?;

        let app = App::new(service.describe(), progress);

        Ok(Self {
            config,
            terminal,
            app,
            service,
            events: Vec::new(),
            frames: Vec::new(),
            start_time: Instant::now(),
            assertions_passed: 0,
            assertions_failed: 0,
        })
    }

    /// Loads events from a string (comma-separated or newline-separated).
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        self.events = EventParser::new().parse_all(input)?;
        Ok(())
    }

    /// Loads events from a script file ("-" reads stdin).
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = if path == "-" {
            use std::io::Read;
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| WorkbenchError::internal(format!("Failed to read stdin: {e}")))?;
            buffer
        } else {
            std::fs::read_to_string(path).map_err(|e| {
                WorkbenchError::internal(format!("Failed to read script file: {e}"))
            })?
        };

        self.load_events(&content)
    }

    /// Runs the loaded events and returns the result.
    pub async fn run(mut self) -> Result<HeadlessResult> {
        self.start_time = Instant::now();
        self.capture_frame(None)?;

        let events = std::mem::take(&mut self.events);
        let mut events_executed = 0;

        for event in events {
            let event_str = event.to_string();
            debug!(event = %event_str, "Headless event");

            match &event {
                Event::Key(key) => self.press(*key).await,
                Event::Type(text) => {
                    for c in text.chars() {
                        let code = if c == '\n' {
                            KeyCode::Enter
                        } else {
                            KeyCode::Char(c)
                        };
                        self.press(KeyEvent::new(code, KeyModifiers::NONE)).await;
                    }
                }
                Event::Wait(duration) => {
                    tokio::time::sleep(*duration).await;
                }
                Event::Resize(w, h) => {
                    self.terminal
                        .resize(Rect::new(0, 0, *w, *h))
                        .map_err(|e| WorkbenchError::internal(format!("Resize failed: {e}")))?;
                    self.app.handle_event(crate::tui::Event::Resize(*w, *h));
                }
                Event::Snapshot(_) => {
                    // Snapshots are captured as frames
                }
                Event::Assert(assertion) => {
                    self.render()?;
                    let screen = self.render_screen();
                    let state = HeadlessState::from_app(&self.app);
                    if assertion.check(&screen, &state) {
                        self.assertions_passed += 1;
                    } else {
                        info!(assertion = %event_str, "Assertion failed");
                        self.assertions_failed += 1;
                        if self.config.fail_fast {
                            events_executed += 1;
                            break;
                        }
                    }
                }
            }

            events_executed += 1;
            self.app.clear_expired_toast();
            self.render()?;

            if self.config.output_format == OutputFormat::Frames {
                self.capture_frame(Some(event_str))?;
            }

            if !self.app.running {
                break;
            }
        }

        self.render()?;
        let screen = self.render_screen();
        let screen_lines = screen.lines().map(String::from).collect();

        Ok(HeadlessResult {
            screen,
            screen_lines,
            events_executed,
            duration: self.start_time.elapsed(),
            assertions_passed: self.assertions_passed,
            assertions_failed: self.assertions_failed,
            state: HeadlessState::from_app(&self.app),
            result: ResultSummary::from_app(&self.app),
            frames: self.frames,
        })
    }

    /// Feeds one key to the app, running the query to completion when the
    /// key asks for execution.
    async fn press(&mut self, key: KeyEvent) {
        if self.app.handle_event(crate::tui::Event::Key(key)) != AppAction::Execute {
            return;
        }
        let Some(dispatch) = self.app.begin_execution() else {
            return;
        };
        let outcome = self.service.execute(&dispatch.query).await;
        self.app.finish_execution(outcome);
    }

    fn render(&mut self) -> Result<()> {
        self.terminal
            .draw(|frame| ui::render(frame, &self.app))
            .map_err(|e| WorkbenchError::internal(format!("Failed to render: {e}")))?;
        Ok(())
    }

    fn render_screen(&self) -> String {
        screen_text(self.terminal.backend().buffer())
    }

    fn capture_frame(&mut self, event: Option<String>) -> Result<()> {
        self.render()?;
        let screen = self.render_screen();
        let number = self.frames.len();
        self.frames.push(Frame {
            number,
            event,
            screen,
        });
        Ok(())
    }
}

/// Runs headless mode from CLI arguments. Returns the process exit code.
pub async fn run_headless(
    cli: &Cli,
    service: Arc<dyn QueryService>,
    progress: &ProgressConfig,
) -> Result<i32> {
    cli.validate_headless().map_err(WorkbenchError::config)?;

    let config = HeadlessConfig::from_cli(cli)?;
    let mut runner = HeadlessRunner::new(config.clone(), service, progress)?;

    if let Some(ref events_str) = cli.events {
        runner.load_events(events_str)?;
    } else if let Some(ref script_path) = cli.script {
        runner.load_script(script_path)?;
    }

    let result = runner.run().await?;
    let output_str = render(config.output_format, &result);

    if let Some(ref path) = config.output_file {
        std::fs::write(path, &output_str)
            .map_err(|e| WorkbenchError::internal(format!("Failed to write output file: {e}")))?;
    } else {
        print!("{output_str}");
    }

    Ok(if result.assertions_failed > 0 { 1 } else { 0 })
}
