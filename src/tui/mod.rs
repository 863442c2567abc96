//! Terminal User Interface for the workbench.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
pub mod headless;
pub mod text;
pub mod ui;
pub mod widgets;

pub use app::{App, AppAction};
pub use events::{Event, EventHandler};

use crate::config::ProgressConfig;
use crate::error::{Result, WorkbenchError};
use crate::service::QueryService;
use crate::session::ProgressTicker;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde_json::Value as Json;
use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info};

/// Messages sent from background tasks to the main loop.
#[derive(Debug)]
pub enum AsyncMessage {
    /// The query service answered (or failed).
    QueryFinished(Result<Json>),
    /// The progress timer fired.
    ProgressTick,
}

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| WorkbenchError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|e| {
            WorkbenchError::internal(format!("Failed to enter alternate screen: {e}"))
        })?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)
            .map_err(|e| WorkbenchError::internal(format!("Failed to create terminal: {e}")))?;

        Ok(terminal)
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| WorkbenchError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .map_err(|e| WorkbenchError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| WorkbenchError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the main event loop until the user quits.
    pub async fn run(
        &mut self,
        service: Arc<dyn QueryService>,
        progress: &ProgressConfig,
    ) -> Result<()> {
        // Restore the terminal before the default hook prints the panic.
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        let mut app = App::new(service.describe(), progress);
        let (tx, mut rx) = mpsc::channel::<AsyncMessage>(32);

        let result = self
            .run_event_loop(&mut app, service, progress, tx, &mut rx)
            .await;

        let _ = panic::take_hook();
        result
    }

    async fn run_event_loop(
        &mut self,
        app: &mut App,
        service: Arc<dyn QueryService>,
        progress: &ProgressConfig,
        tx: mpsc::Sender<AsyncMessage>,
        rx: &mut mpsc::Receiver<AsyncMessage>,
    ) -> Result<()> {
        // Terminal read in flight; kept until it completes.
        let mut input = None;

        loop {
            app.clear_expired_toast();

            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| WorkbenchError::internal(format!("Failed to draw: {e}")))?;

            if !app.running {
                break;
            }

            let handler = self.event_handler;
            let pending =
                input.get_or_insert_with(|| tokio::task::spawn_blocking(move || handler.next()));

            let joined = tokio::select! {
                joined = pending => Some(joined),
                Some(msg) = rx.recv() => {
                    Self::handle_async_message(msg, app);
                    None
                }
            };

            if let Some(joined) = joined {
                input = None;
                let event = joined
                    .map_err(|e| WorkbenchError::internal(format!("Event task failed: {e}")))??;
                if app.handle_event(event) == AppAction::Execute {
                    Self::dispatch(app, Arc::clone(&service), progress, &tx);
                }
            }
        }

        Ok(())
    }

    /// Starts an execution: the request and the progress timer both run as
    /// tasks that report back through `tx`.
    fn dispatch(
        app: &mut App,
        service: Arc<dyn QueryService>,
        progress: &ProgressConfig,
        tx: &mpsc::Sender<AsyncMessage>,
    ) {
        let Some(dispatch) = app.begin_execution() else {
            return;
        };
        info!(tab = %dispatch.tab, "Sending query to {}", service.describe());

        let result_tx = tx.clone();
        tokio::spawn(async move {
            let outcome = service.execute(&dispatch.query).await;
            if result_tx
                .send(AsyncMessage::QueryFinished(outcome))
                .await
                .is_err()
            {
                debug!("UI closed before the query finished");
            }
        });

        let tick_tx = tx.clone();
        let ticker = ProgressTicker::spawn(progress.interval(), move || {
            !matches!(
                tick_tx.try_send(AsyncMessage::ProgressTick),
                Err(TrySendError::Closed(_))
            )
        });
        app.workbench.attach_ticker(ticker);
    }

    fn handle_async_message(msg: AsyncMessage, app: &mut App) {
        match msg {
            AsyncMessage::QueryFinished(outcome) => {
                app.finish_execution(outcome);
            }
            AsyncMessage::ProgressTick => {
                app.workbench.tick_progress();
            }
        }
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the interactive TUI against `service`.
pub async fn run(service: Arc<dyn QueryService>, progress: &ProgressConfig) -> Result<()> {
    let mut tui = Tui::new()?;
    tui.run(service, progress).await
}
