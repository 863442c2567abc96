//! Result model for the workbench.
//!
//! Raw service payloads are normalized into a canonical [`QueryResult`],
//! columns are classified for display, and rows can be re-sorted locally.

pub mod classify;
pub mod normalize;
pub mod sort;
mod types;

pub use classify::{classify, ColumnCategory};
pub use normalize::{normalize_response, normalize_rows, ResponseShape};
pub use sort::{next_sort, sort_rows, SortConfig, SortDirection};
pub use types::{Column, ColumnType, QueryResult, Row, Value};
