//! End-to-end tests of headless mode against the mock service.

use super::common::{run_events, run_workbench};

#[test]
fn test_headless_basic_execution() {
    let (code, stdout, _) = run_events("key:esc", &[]);

    assert_eq!(code, 0, "Expected exit code 0");
    assert!(
        stdout.contains("Events: 1 executed"),
        "Should show events executed. stdout: {stdout}"
    );
    assert!(stdout.contains("Query Workbench"));
    assert!(stdout.contains("[service: mock]"));
}

#[test]
fn test_headless_type_event() {
    let (code, stdout, _) = run_events("type:SELECT 1", &["--output", "json"]);

    assert_eq!(code, 0);
    assert!(stdout.contains(r#""editor_text": "SELECT 1""#));
}

#[test]
fn test_execute_query_shows_rows() {
    let (code, stdout, _) = run_events(
        "type:SELECT id, name FROM services,key:ctrl+e,assert:contains:gamma,assert:state:row_count=3,assert:state:column_count=3",
        &["--output", "json"],
    );

    assert_eq!(code, 0, "All assertions should pass. stdout: {stdout}");
    assert!(stdout.contains(r#""passed": 3"#));
    assert!(stdout.contains("3 rows"));
}

#[test]
fn test_json_output_summarizes_result() {
    let (code, stdout, _) = run_events("type:SELECT 1,key:ctrl+e", &["--output", "json"]);

    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(parsed["result"]["tab"], "New Query");
    assert_eq!(parsed["result"]["row_count"], 3);
    assert!(parsed["result"]["execution_ms"].is_u64());
    assert!(parsed["result"]["error"].is_null());
}

#[test]
fn test_json_output_reports_query_error() {
    let (code, stdout, _) = run_events("type:SELECT error,key:ctrl+e", &["--output", "json"]);

    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let error = parsed["result"]["error"].as_str().expect("error message");
    assert!(error.contains("Mock error for"));
}

#[test]
fn test_sort_toggles_from_results_panel() {
    let (code, stdout, _) = run_events(
        "type:SELECT 1,key:f5,key:tab,key:right,key:s,assert:state:sort=name asc,key:s,assert:state:sort=name desc,key:left,key:s,assert:state:sort=id asc",
        &[],
    );

    assert_eq!(code, 0, "All assertions should pass. stdout: {stdout}");
    assert!(stdout.contains("sorted by id"));
}

#[test]
fn test_service_error_is_shown_in_tab() {
    let (code, stdout, _) = run_events(
        "type:SELECT error,key:ctrl+e,assert:contains:Query failed,assert:contains:Mock error for,assert:state:has_result=true",
        &[],
    );

    assert_eq!(code, 0, "All assertions should pass. stdout: {stdout}");
}

#[test]
fn test_malformed_response_fails_query() {
    let (code, stdout, _) = run_events(
        "type:malformed,key:ctrl+e,assert:contains:Query failed,assert:contains:result,assert:state:is_running=false",
        &[],
    );

    assert_eq!(code, 0, "All assertions should pass. stdout: {stdout}");
}

#[test]
fn test_empty_query_is_rejected() {
    let (code, stdout, _) = run_events(
        "key:ctrl+e,assert:state:has_result=false,assert:state:is_running=false",
        &["--output", "json"],
    );

    assert_eq!(code, 0, "All assertions should pass. stdout: {stdout}");
    assert!(!stdout.contains(r#""toast": null"#));
}

#[test]
fn test_tabs_keep_their_own_content() {
    let (code, stdout, _) = run_events(
        "type:SELECT 1,key:ctrl+t,type:SELECT 2,assert:state:tab_count=2,key:ctrl+left,assert:state:editor_text=SELECT 1,key:ctrl+right,assert:state:editor_text=SELECT 2",
        &[],
    );

    assert_eq!(code, 0, "All assertions should pass. stdout: {stdout}");
}

#[test]
fn test_results_stay_with_their_tab() {
    let (code, stdout, _) = run_events(
        "type:SELECT 1,key:ctrl+e,key:ctrl+t,assert:state:has_result=false,key:ctrl+left,assert:state:row_count=3",
        &[],
    );

    assert_eq!(code, 0, "All assertions should pass. stdout: {stdout}");
}

#[test]
fn test_rename_tab() {
    // Clear "New Query" before typing the new name.
    let clear = vec!["key:backspace"; "New Query".len()].join(",");
    let events = format!(
        "key:f2,{clear},type:Jobs,key:enter,assert:state:active_tab=Jobs,assert:contains:Jobs"
    );
    let (code, stdout, _) = run_events(&events, &[]);

    assert_eq!(code, 0, "All assertions should pass. stdout: {stdout}");
}

#[test]
fn test_close_last_tab() {
    let (code, stdout, _) = run_events(
        "key:ctrl+w,assert:state:tab_count=0,assert:contains:No tab open,key:ctrl+t,assert:state:tab_count=1",
        &[],
    );

    assert_eq!(code, 0, "All assertions should pass. stdout: {stdout}");
}

#[test]
fn test_headless_assertion_fail() {
    let (code, stdout, _) = run_events(
        "type:SELECT 1,assert:contains:goodbye",
        &["--output", "json"],
    );

    assert_eq!(code, 1, "Should exit with code 1 on assertion failure");
    assert!(stdout.contains(r#""passed": 0"#));
    assert!(stdout.contains(r#""failed": 1"#));
}

#[test]
fn test_headless_custom_size() {
    let (code, stdout, _) = run_events("key:esc", &["--size", "120x40", "--output", "json"]);

    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let lines = parsed["screen_lines"].as_array().expect("screen lines");
    assert!(lines.len() <= 40);
    assert!(lines
        .iter()
        .all(|l| l.as_str().map_or(0, |s| s.chars().count()) <= 120));
}

#[test]
fn test_headless_frames_output() {
    let (code, stdout, _) = run_events("type:SELECT 1,key:ctrl+e", &["--output", "frames"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("=== FRAME 0 (initial) ==="));
    assert!(stdout.contains("=== FRAME 2 (key:ctrl+e) ==="));
    assert!(stdout.contains("Total: 3 frames"));
}

#[test]
fn test_headless_requires_events() {
    let (code, _, _) = run_workbench(&["--headless", "--mock-service"]);
    assert_eq!(code, 1);
}

#[test]
fn test_invalid_event_fails() {
    let (code, _, _) = run_events("bogus:thing", &[]);
    assert_eq!(code, 1);
}
