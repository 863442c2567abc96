//! Response normalization.
//!
//! The query service has answered in three different payload shapes over
//! time. All of them are an array of rows where the first row describes the
//! columns:
//!
//! 1. Sentinel: `[[""], ["explanation"]]` signals a server-side error.
//! 2. Typed header: `[[{"name": "id", "type": "number"}], [1], ...]`.
//! 3. Plain header: `[["id", "name"], [1, "x"], ...]`.
//!
//! The shapes are tried in that order and turned into a [`QueryResult`].

use serde_json::Value as Json;
use tracing::debug;

use super::types::{Column, QueryResult, Row, Value};
use crate::error::{Result, WorkbenchError};

/// Which payload convention produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Sentinel,
    TypedHeader,
    PlainHeader,
}

/// Normalizes a full response body of the form `{"result": [...]}`.
pub fn normalize_response(body: &Json) -> Result<QueryResult> {
    let rows = body
        .get("result")
        .ok_or_else(|| WorkbenchError::malformed("response has no `result` field"))?;
    normalize_rows(rows)
}

/// Normalizes the `result` array of a response.
pub fn normalize_rows(payload: &Json) -> Result<QueryResult> {
    let rows = payload
        .as_array()
        .ok_or_else(|| WorkbenchError::malformed("`result` is not an array"))?;

    let (header, data) = rows
        .split_first()
        .ok_or_else(|| WorkbenchError::malformed("`result` is empty"))?;

    let header = header
        .as_array()
        .ok_or_else(|| WorkbenchError::malformed("first row of `result` is not an array"))?;

    let shape = detect_shape(header)?;
    debug!(?shape, columns = header.len(), rows = data.len(), "Normalizing response");

    match shape {
        ResponseShape::Sentinel => Ok(sentinel_result(data.first())),
        ResponseShape::TypedHeader => {
            let columns = header.iter().map(typed_column).collect();
            build(columns, data)
        }
        ResponseShape::PlainHeader => {
            let columns = header
                .iter()
                .filter_map(Json::as_str)
                .map(Column::untyped)
                .collect();
            build(columns, data)
        }
    }
}

/// Determines which convention a header row follows.
pub fn detect_shape(header: &[Json]) -> Result<ResponseShape> {
    if let [Json::String(s)] = header {
        if s.is_empty() {
            return Ok(ResponseShape::Sentinel);
        }
    }

    if !header.is_empty() && header.iter().all(is_typed_column) {
        return Ok(ResponseShape::TypedHeader);
    }

    if !header.is_empty() && header.iter().all(Json::is_string) {
        return Ok(ResponseShape::PlainHeader);
    }

    Err(WorkbenchError::malformed(
        "header row is empty or neither column names nor {name, type} objects",
    ))
}

fn is_typed_column(cell: &Json) -> bool {
    cell.as_object()
        .is_some_and(|obj| obj.contains_key("name") && obj.contains_key("type"))
}

fn typed_column(cell: &Json) -> Column {
    let name = match cell.get("name") {
        Some(Json::String(s)) => s.clone(),
        Some(Json::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let declared = cell.get("type").and_then(Json::as_str).unwrap_or_default();
    Column::declared(name, declared)
}

/// Only the first explanatory row is kept, reduced to its first cell.
fn sentinel_result(explanation: Option<&Json>) -> QueryResult {
    let rows = match explanation {
        Some(Json::Array(cells)) => cells
            .first()
            .map(|cell| vec![vec![Value::from(cell)]])
            .unwrap_or_default(),
        Some(scalar) => vec![vec![Value::from(scalar)]],
        None => Vec::new(),
    };
    QueryResult::with_data(vec![Column::sentinel()], rows)
}

fn build(columns: Vec<Column>, data: &[Json]) -> Result<QueryResult> {
    let width = columns.len();
    let rows = data
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row.as_array().ok_or_else(|| {
                WorkbenchError::malformed(format!("row {} of `result` is not an array", i + 1))
            })?;
            Ok(to_row(cells, width))
        })
        .collect::<Result<Vec<Row>>>()?;

    Ok(QueryResult::with_data(columns, rows))
}

/// Rows are fitted to the header width: short rows are padded with NULL,
/// extra cells are dropped.
fn to_row(cells: &[Json], width: usize) -> Row {
    if cells.len() != width {
        debug!(expected = width, actual = cells.len(), "Fitting row to header width");
    }
    let mut row: Row = cells.iter().take(width).map(Value::from).collect();
    row.resize(width, Value::Null);
    row
}
