//! Response normalization tests across the three payload shapes.

use pretty_assertions::assert_eq;
use query_workbench::error::WorkbenchError;
use query_workbench::result::{
    classify, normalize_response, sort_rows, ColumnCategory, ColumnType, SortDirection, Value,
};
use serde_json::json;

#[test]
fn test_plain_header_response() {
    let result = normalize_response(&json!({
        "result": [["id", "name"], [1, "alpha"], [2, null]]
    }))
    .unwrap();

    let names: Vec<_> = result.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name"]);
    assert_eq!(result.row_count(), 2);
    assert_eq!(result.rows[0][1], Value::String("alpha".to_string()));
    assert!(result.rows[1][1].is_null());
    assert!(!result.is_error());
}

#[test]
fn test_typed_header_response() {
    let result = normalize_response(&json!({
        "result": [
            [{"name": "count", "type": "count"}, {"name": "image", "type": "container"}],
            [3, "nginx"]
        ]
    }))
    .unwrap();

    assert_eq!(result.columns[0].column_type, ColumnType::Count);
    assert_eq!(
        classify(result.columns[0].column_type),
        Some(ColumnCategory::Aggregate)
    );
    assert_eq!(
        classify(result.columns[1].column_type),
        Some(ColumnCategory::Container)
    );
}

#[test]
fn test_sentinel_response_is_error() {
    let result = normalize_response(&json!({
        "result": [[""], ["syntax error near FROM"], ["ignored"]]
    }))
    .unwrap();

    assert!(result.is_error());
    assert_eq!(
        result.error_message().as_deref(),
        Some("syntax error near FROM")
    );
}

#[test]
fn test_missing_result_is_malformed() {
    let err = normalize_response(&json!({"rows": []})).unwrap_err();
    assert!(matches!(err, WorkbenchError::MalformedResponse(_)));

    let err = normalize_response(&json!({"result": [[1, 2]]})).unwrap_err();
    assert!(matches!(err, WorkbenchError::MalformedResponse(_)));
}

#[test]
fn test_ragged_rows_are_fitted_to_header() {
    let result = normalize_response(&json!({
        "result": [["a", "b"], [1], [1, 2, 3]]
    }))
    .unwrap();

    assert!(result.rows.iter().all(|row| row.len() == 2));
    assert!(result.rows[0][1].is_null());
}

#[test]
fn test_sorting_normalized_rows() {
    let mut result = normalize_response(&json!({
        "result": [["n", "name"], [10, "beta"], [9, "Alpha"], [100, "gamma"]]
    }))
    .unwrap();

    let column = |rows: &[Vec<Value>], i: usize| -> Vec<String> {
        rows.iter().map(|r| r[i].to_display_string()).collect()
    };

    sort_rows(&mut result.rows, 0, SortDirection::Ascending);
    assert_eq!(column(&result.rows, 0), vec!["9", "10", "100"]);

    sort_rows(&mut result.rows, 1, SortDirection::Descending);
    assert_eq!(column(&result.rows, 1), vec!["gamma", "beta", "Alpha"]);
}
