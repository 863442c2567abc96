//! Workbench session tests: tabs, execution and results end to end.

use std::sync::Arc;
use std::time::Duration;

use query_workbench::config::ProgressConfig;
use query_workbench::error::WorkbenchError;
use query_workbench::result::SortDirection;
use query_workbench::service::{FailingQueryService, MockQueryService, QueryService};
use query_workbench::session::{Workbench, PROGRESS_DONE};
use serde_json::json;

fn workbench_with_query(query: &str) -> Workbench {
    let mut workbench = Workbench::new(&ProgressConfig::default());
    let id = workbench.tabs().active_id().unwrap();
    workbench.tabs_mut().update_content(id, query);
    workbench
}

#[tokio::test]
async fn test_run_stores_result_on_active_tab() {
    let service = MockQueryService::new();
    let mut workbench = workbench_with_query("SELECT * FROM services");

    let completion = workbench.run(&service, None).await.unwrap();
    assert!(completion.error.is_none());
    assert_eq!(service.received(), vec!["SELECT * FROM services"]);

    let tab = workbench.tabs().active().unwrap();
    assert_eq!(tab.query_result.as_ref().unwrap().row_count(), 3);
    assert!(tab.execution_time.is_some());
    assert!(!workbench.is_running());
    assert_eq!(workbench.progress(), PROGRESS_DONE);
}

#[tokio::test]
async fn test_selection_is_sent_instead_of_content() {
    let service = MockQueryService::new();
    let mut workbench = workbench_with_query("SELECT 1;\nSELECT 2;");

    workbench.run(&service, Some("SELECT 2;")).await.unwrap();
    assert_eq!(service.received(), vec!["SELECT 2;"]);
}

#[tokio::test]
async fn test_empty_query_is_not_sent() {
    let service = MockQueryService::new();
    let mut workbench = workbench_with_query("   \n ");

    let err = workbench.run(&service, None).await.unwrap_err();
    assert!(matches!(err, WorkbenchError::Validation(_)));
    assert!(service.received().is_empty());
    assert!(!workbench.is_running());
}

#[tokio::test]
async fn test_transport_failure_becomes_error_result() {
    let service = FailingQueryService::new("connection refused");
    let mut workbench = workbench_with_query("SELECT 1");

    let completion = workbench.run(&service, None).await.unwrap();
    assert!(matches!(completion.error, Some(WorkbenchError::Transport(_))));

    let result = workbench.tabs().active().unwrap().query_result.clone().unwrap();
    assert!(result.is_error());
    assert!(result
        .error_message()
        .is_some_and(|m| m.contains("connection refused")));
    assert!(!workbench.is_running());
}

#[tokio::test]
async fn test_second_submission_is_busy() {
    let mut workbench = workbench_with_query("SELECT 1");
    let dispatch = workbench.submit(None).unwrap();

    let err = workbench.submit(None).unwrap_err();
    assert!(matches!(err, WorkbenchError::Busy(_)));

    workbench.complete(Ok(json!({"result": [["n"], [1]]})));
    assert!(workbench.tabs().get(dispatch.tab).unwrap().query_result.is_some());
    assert!(workbench.submit(None).is_ok());
}

#[tokio::test]
async fn test_result_lands_on_dispatching_tab_after_switch() {
    let service: Arc<dyn QueryService> =
        Arc::new(MockQueryService::new().with_delay(Duration::from_millis(20)));
    let mut workbench = workbench_with_query("SELECT 1");
    let dispatch = workbench.submit(None).unwrap();

    let other = workbench.tabs_mut().add_tab();
    assert_eq!(workbench.tabs().active_id(), Some(other));

    let outcome = service.execute(&dispatch.query).await;
    workbench.complete(outcome);

    assert!(workbench.tabs().get(other).unwrap().query_result.is_none());
    assert!(workbench
        .tabs()
        .get(dispatch.tab)
        .unwrap()
        .query_result
        .is_some());
}

#[tokio::test]
async fn test_new_result_clears_sort() {
    let service = MockQueryService::new();
    let mut workbench = workbench_with_query("SELECT 1");
    workbench.run(&service, None).await.unwrap();

    let sort = workbench.tabs_mut().sort_active(1).unwrap();
    assert_eq!(sort.direction, SortDirection::Ascending);
    let result = workbench.tabs().active().unwrap().query_result.as_ref().unwrap();
    let names: Vec<_> = result
        .rows
        .iter()
        .map(|r| r[1].to_display_string())
        .collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);

    workbench.run(&service, None).await.unwrap();
    assert!(workbench.tabs().active().unwrap().sort.is_none());
}

#[test]
fn test_active_tab_survives_removal_in_any_order() {
    let mut workbench = Workbench::new(&ProgressConfig::default());
    let first = workbench.tabs().active_id().unwrap();
    let second = workbench.tabs_mut().add_tab();
    let third = workbench.tabs_mut().add_tab();

    workbench.tabs_mut().remove_tab(second);
    assert_eq!(workbench.tabs().active_id(), Some(third));

    workbench.tabs_mut().remove_tab(third);
    assert_eq!(workbench.tabs().active_id(), Some(first));

    workbench.tabs_mut().remove_tab(first);
    assert_eq!(workbench.tabs().active_id(), None);
    assert!(workbench.tabs().is_empty());

    let err = workbench.submit(None).unwrap_err();
    assert!(matches!(err, WorkbenchError::Validation(_)));
}
