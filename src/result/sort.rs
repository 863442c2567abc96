//! Client-side sorting of result rows.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::types::{Row, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Arrow shown next to the sorted column's header.
    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// The active sort of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub column_index: usize,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(column_index: usize, direction: SortDirection) -> Self {
        Self {
            column_index,
            direction,
        }
    }
}

/// Computes the sort that a click on `column_index` produces.
///
/// Descending only when the current sort is this column ascending;
/// ascending in every other case.
pub fn next_sort(current: Option<SortConfig>, column_index: usize) -> SortConfig {
    let direction = match current {
        Some(SortConfig {
            column_index: c,
            direction: SortDirection::Ascending,
        }) if c == column_index => SortDirection::Descending,
        _ => SortDirection::Ascending,
    };
    SortConfig::new(column_index, direction)
}

/// How cells of one column are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareMode {
    Integer,
    Float,
    Text,
}

/// The mode is picked once per column so the ordering stays total: a column
/// is compared numerically when every non-NULL cell is a number.
fn compare_mode(rows: &[Row], column_index: usize) -> CompareMode {
    let mut mode = CompareMode::Integer;
    for cell in rows.iter().filter_map(|row| row.get(column_index)) {
        match cell {
            Value::Null => {}
            Value::Int(_) => {}
            Value::Float(_) => mode = CompareMode::Float,
            _ => return CompareMode::Text,
        }
    }
    mode
}

/// Reorders `rows` by the cells at `column_index`.
///
/// Numeric columns compare as numbers; a column holding anything else
/// compares every cell by its display string. NULL and missing cells sort
/// last in either direction.
pub fn sort_rows(rows: &mut [Row], column_index: usize, direction: SortDirection) {
    let mode = compare_mode(rows, column_index);
    rows.sort_by(|a, b| {
        let (a, b) = (present(a, column_index), present(b, column_index));
        match (a, b) {
            (Some(a), Some(b)) => {
                let ord = compare_cells(a, b, mode);
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            }
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    });
}

fn present(row: &Row, column_index: usize) -> Option<&Value> {
    row.get(column_index).filter(|v| !v.is_null())
}

fn compare_cells(a: &Value, b: &Value, mode: CompareMode) -> Ordering {
    match (mode, a, b) {
        (CompareMode::Integer, Value::Int(x), Value::Int(y)) => x.cmp(y),
        (CompareMode::Float, _, _) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => locale_cmp(&a.to_display_string(), &b.to_display_string()),
        },
        _ => locale_cmp(&a.to_display_string(), &b.to_display_string()),
    }
}

/// Case-insensitive comparison with a case-sensitive tie-break, so that
/// `apple < Banana < cherry` the way a user-facing collation orders them.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}
