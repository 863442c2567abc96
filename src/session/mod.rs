//! Workbench session: tabs plus the single execution pipeline.

pub mod executor;
pub mod progress;
pub mod tabs;

pub use executor::{Completion, Dispatch, ExecutionController, ExecutionState};
pub use progress::{Progress, ProgressTicker, PROGRESS_CEILING, PROGRESS_DONE};
pub use tabs::{Tab, TabId, TabManager, DEFAULT_TAB_NAME, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH};

use serde_json::Value as Json;
use tracing::debug;

use crate::config::ProgressConfig;
use crate::error::{Result, WorkbenchError};
use crate::service::QueryService;

/// A workbench session.
///
/// Tab switching, editing and sorting stay available while a query runs;
/// only a second submission is refused, because execution state is global.
pub struct Workbench {
    tabs: TabManager,
    executor: ExecutionController,
}

impl Workbench {
    /// Creates a session with one empty tab.
    pub fn new(progress: &ProgressConfig) -> Self {
        let mut tabs = TabManager::new();
        tabs.add_tab();
        Self {
            tabs,
            executor: ExecutionController::new(progress),
        }
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut TabManager {
        &mut self.tabs
    }

    pub fn executor(&self) -> &ExecutionController {
        &self.executor
    }

    /// Starts executing the active tab's query (or `selection`, if given).
    ///
    /// Fails with `Busy` while another execution runs and with `Validation`
    /// when there is nothing to execute; in both cases nothing is sent.
    pub fn submit(&mut self, selection: Option<&str>) -> Result<Dispatch> {
        if self.executor.is_running() {
            return Err(WorkbenchError::busy("A query is already running"));
        }
        let tab = self
            .tabs
            .active()
            .ok_or_else(|| WorkbenchError::validation("Open a tab to run a query"))?;

        let query = ExecutionController::prepare_query(&tab.content, selection)?;
        self.executor.begin(tab.id, query)
    }

    /// Hands the running execution's progress timer to the controller.
    pub fn attach_ticker(&mut self, ticker: ProgressTicker) {
        self.executor.attach_ticker(ticker);
    }

    /// Finishes the running execution and stores its result on its tab.
    pub fn complete(&mut self, outcome: Result<Json>) -> Option<Completion> {
        let completion = self.executor.finish(outcome)?;
        if self.tabs.get(completion.tab).is_none() {
            debug!(tab = %completion.tab, "Tab closed before its query finished");
        }
        self.tabs.set_result(
            completion.tab,
            completion.result.clone(),
            completion.elapsed,
        );
        Some(completion)
    }

    /// Submits and awaits one execution on the active tab.
    pub async fn run(
        &mut self,
        service: &dyn QueryService,
        selection: Option<&str>,
    ) -> Result<Completion> {
        let dispatch = self.submit(selection)?;
        let outcome = service.execute(&dispatch.query).await;
        self.complete(outcome)
            .ok_or_else(|| WorkbenchError::internal("execution finished while idle"))
    }

    pub fn tick_progress(&mut self) -> u8 {
        self.executor.tick()
    }

    pub fn progress(&self) -> u8 {
        self.executor.progress()
    }

    pub fn is_running(&self) -> bool {
        self.executor.is_running()
    }
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(&ProgressConfig::default())
    }
}
