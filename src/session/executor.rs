//! Query execution state machine.
//!
//! One execution at a time for the whole workbench:
//! `Idle -> Running -> (success | failure) -> Idle`. The controller never
//! touches tabs; it hands back a [`Completion`] that the caller stores
//! through the tab manager.

use std::time::{Duration, Instant};

use serde_json::Value as Json;
use tracing::{debug, info, warn};

use super::progress::{Progress, ProgressTicker};
use super::tabs::TabId;
use crate::config::ProgressConfig;
use crate::error::{Result, WorkbenchError};
use crate::result::{normalize_response, QueryResult};
use crate::service::QueryService;

/// Execution state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ExecutionState {
    #[default]
    Idle,
    Running(RunningExecution),
}

/// The execution currently in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningExecution {
    /// Tab the result will be written to.
    pub tab: TabId,
    pub query: String,
    pub started_at: Instant,
}

/// What to send to the query service for a started execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub tab: TabId,
    pub query: String,
}

/// Outcome of a finished execution, ready to be stored on its tab.
#[derive(Debug, Clone)]
pub struct Completion {
    pub tab: TabId,
    pub query: String,
    /// Normalized result, or the synthetic one-row error result.
    pub result: QueryResult,
    pub elapsed: Duration,
    /// Set when the execution failed.
    pub error: Option<WorkbenchError>,
}

impl Completion {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Owns the request lifecycle and the cosmetic progress value.
#[derive(Default)]
pub struct ExecutionController {
    state: ExecutionState,
    progress: Progress,
    max_step: u8,
    ticker: Option<ProgressTicker>,
}

impl ExecutionController {
    pub fn new(config: &ProgressConfig) -> Self {
        Self {
            max_step: config.max_step,
            ..Default::default()
        }
    }

    /// Chooses the text to execute.
    ///
    /// A non-empty selection is executed verbatim. Otherwise the content is
    /// split into `;`-separated statements, each trimmed, empty ones dropped,
    /// and the rest rejoined with `"; "`.
    pub fn prepare_query(content: &str, selection: Option<&str>) -> Result<String> {
        let query = match selection.filter(|s| !s.is_empty()) {
            Some(selected) => selected.to_string(),
            None => content
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        };

        if query.trim().is_empty() {
            return Err(WorkbenchError::validation("Please enter a query to execute"));
        }
        Ok(query)
    }

    /// Enters `Running` for `tab`. Fails with `Busy` if already running.
    pub fn begin(&mut self, tab: TabId, query: String) -> Result<Dispatch> {
        if let ExecutionState::Running(running) = &self.state {
            return Err(WorkbenchError::busy(format!(
                "A query is already running on tab {}",
                running.tab
            )));
        }

        info!(%tab, query = %query, "Dispatching query");
        self.progress.reset();
        self.state = ExecutionState::Running(RunningExecution {
            tab,
            query: query.clone(),
            started_at: Instant::now(),
        });
        Ok(Dispatch { tab, query })
    }

    /// Hands the progress timer to the controller so completion can stop it.
    pub fn attach_ticker(&mut self, ticker: ProgressTicker) {
        if let Some(previous) = self.ticker.replace(ticker) {
            previous.stop();
        }
    }

    /// Advances the simulated progress. Ignored while idle.
    pub fn tick(&mut self) -> u8 {
        if self.is_running() {
            self.progress.tick(&mut rand::rng(), self.max_step);
        }
        self.progress.value()
    }

    /// Finishes the running execution with the service outcome.
    ///
    /// Returns `None` when nothing is running. Failures (transport errors
    /// and payloads that fail normalization) become a synthetic error
    /// result; either way the elapsed time is recorded, progress is forced
    /// to 100 and the controller is idle again.
    pub fn finish(&mut self, outcome: Result<Json>) -> Option<Completion> {
        let ExecutionState::Running(running) = std::mem::take(&mut self.state) else {
            debug!("Ignoring completion while idle");
            return None;
        };

        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.progress.complete();
        let elapsed = running.started_at.elapsed();

        let normalized = outcome.and_then(|body| normalize_response(&body));
        let (result, error) = match normalized {
            Ok(result) => {
                info!(
                    tab = %running.tab,
                    rows = result.row_count(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Query completed"
                );
                (result, None)
            }
            Err(e) => {
                warn!(tab = %running.tab, error = %e, "Query failed");
                (QueryResult::error(e.to_string()), Some(e))
            }
        };

        Some(Completion {
            tab: running.tab,
            query: running.query,
            result,
            elapsed,
            error,
        })
    }

    /// Runs one execution to completion against `service`.
    pub async fn execute(
        &mut self,
        service: &dyn QueryService,
        tab: TabId,
        query: String,
    ) -> Result<Completion> {
        let dispatch = self.begin(tab, query)?;
        let outcome = service.execute(&dispatch.query).await;
        self.finish(outcome)
            .ok_or_else(|| WorkbenchError::internal("execution finished while idle"))
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ExecutionState::Running(_))
    }

    pub fn progress(&self) -> u8 {
        self.progress.value()
    }

    /// Time since the running execution started.
    pub fn elapsed(&self) -> Option<Duration> {
        match &self.state {
            ExecutionState::Running(running) => Some(running.started_at.elapsed()),
            ExecutionState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Column, Value};
    use crate::service::{FailingQueryService, MockQueryService};
    use crate::session::progress::PROGRESS_CEILING;
    use crate::session::TabManager;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn tab_id() -> TabId {
        TabManager::new().add_tab()
    }

    #[test]
    fn prepare_splits_and_rejoins_statements() {
        let query =
            ExecutionController::prepare_query("  SELECT 1 ;;\n SELECT 2;  ; ", None).unwrap();
        assert_eq!(query, "SELECT 1; SELECT 2");
    }

    #[test]
    fn prepare_prefers_selection_verbatim() {
        let query =
            ExecutionController::prepare_query("SELECT 1; SELECT 2", Some(" SELECT 2")).unwrap();
        assert_eq!(query, " SELECT 2");

        let query = ExecutionController::prepare_query("SELECT 1", Some("")).unwrap();
        assert_eq!(query, "SELECT 1");
    }

    #[test]
    fn prepare_rejects_blank_text() {
        for content in ["", "   ", " ; ;\n"] {
            let err = ExecutionController::prepare_query(content, None).unwrap_err();
            assert!(matches!(err, WorkbenchError::Validation(_)));
        }
    }

    #[test]
    fn begin_rejects_second_execution() {
        let mut controller = ExecutionController::default();
        let tab = tab_id();
        controller.begin(tab, "SELECT 1".into()).unwrap();
        assert!(controller.is_running());

        let err = controller.begin(tab, "SELECT 2".into()).unwrap_err();
        assert!(matches!(err, WorkbenchError::Busy(_)));
    }

    #[test]
    fn finish_success_normalizes_and_returns_to_idle() {
        let mut controller = ExecutionController::default();
        let tab = tab_id();
        controller.begin(tab, "SELECT 1".into()).unwrap();

        let completion = controller
            .finish(Ok(json!({"result": [["a"], [1]]})))
            .unwrap();

        assert!(completion.is_success());
        assert_eq!(completion.tab, tab);
        assert_eq!(completion.result.rows, vec![vec![Value::Int(1)]]);
        assert!(!controller.is_running());
        assert_eq!(controller.progress(), 100);
    }

    #[test]
    fn finish_transport_failure_yields_error_result() {
        let mut controller = ExecutionController::default();
        controller.begin(tab_id(), "SELECT 1".into()).unwrap();

        let completion = controller
            .finish(Err(WorkbenchError::transport("503 Service Unavailable")))
            .unwrap();

        assert!(!completion.is_success());
        assert_eq!(completion.result.columns, vec![Column::sentinel()]);
        assert_eq!(completion.result.rows.len(), 1);
        assert!(completion
            .result
            .error_message()
            .unwrap()
            .contains("503 Service Unavailable"));
        assert!(completion.elapsed >= Duration::ZERO);
        assert!(matches!(controller.state(), ExecutionState::Idle));
    }

    #[test]
    fn finish_malformed_payload_is_a_failure() {
        let mut controller = ExecutionController::default();

        for body in [json!({"result": []}), json!({"result": [1]}), json!({})] {
            controller.begin(tab_id(), "SELECT 1".into()).unwrap();
            let completion = controller.finish(Ok(body)).unwrap();
            assert!(matches!(
                completion.error,
                Some(WorkbenchError::MalformedResponse(_))
            ));
            assert!(completion.result.is_error());
        }
    }

    #[test]
    fn finish_while_idle_is_ignored() {
        let mut controller = ExecutionController::default();
        assert!(controller.finish(Ok(json!({"result": [["a"]]}))).is_none());
    }

    #[test]
    fn tick_only_moves_while_running() {
        let mut controller = ExecutionController::new(&ProgressConfig::default());
        assert_eq!(controller.tick(), 0);

        controller.begin(tab_id(), "SELECT 1".into()).unwrap();
        for _ in 0..100 {
            assert!(controller.tick() <= PROGRESS_CEILING);
        }
        controller.finish(Err(WorkbenchError::transport("x")));
        assert_eq!(controller.tick(), 100);
    }

    #[tokio::test]
    async fn finish_stops_the_ticker_on_failure() {
        let mut controller = ExecutionController::default();
        controller.begin(tab_id(), "SELECT 1".into()).unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        controller.attach_ticker(ProgressTicker::spawn(Duration::from_millis(2), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }));
        tokio::time::sleep(Duration::from_millis(20)).await;

        controller.finish(Err(WorkbenchError::transport("down")));
        tokio::time::sleep(Duration::from_millis(10)).await;
        let after = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), after);
    }

    #[tokio::test]
    async fn finish_stops_the_ticker_on_success() {
        let mut controller = ExecutionController::default();
        controller.begin(tab_id(), "SELECT 1".into()).unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        controller.attach_ticker(ProgressTicker::spawn(Duration::from_millis(2), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(count.load(Ordering::SeqCst) > 0);

        let completion = controller
            .finish(Ok(json!({"result": [["a"], [1]]})))
            .unwrap();
        assert!(completion.is_success());
        assert_eq!(controller.progress(), 100);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let after = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), after);
    }

    #[tokio::test]
    async fn execute_against_mock_service() {
        let mut controller = ExecutionController::default();
        let service = MockQueryService::new();
        let completion = controller
            .execute(&service, tab_id(), "SELECT * FROM containers".into())
            .await
            .unwrap();
        assert!(completion.is_success());
        assert_eq!(completion.result.columns.len(), 3);
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn execute_against_failing_service_records_time() {
        let mut controller = ExecutionController::default();
        let completion = controller
            .execute(&FailingQueryService::default(), tab_id(), "SELECT 1".into())
            .await
            .unwrap();
        assert!(completion.error.is_some());
        assert!(completion.result.is_error());
        assert!(!controller.is_running());
        assert_eq!(controller.progress(), 100);
    }
}
