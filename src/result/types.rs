//! Canonical result types for the workbench.
//!
//! Whatever payload shape the query service answers with, it ends up as a
//! [`QueryResult`]: an ordered list of [`Column`]s plus rows of [`Value`]s.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical, shape-independent result of a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column metadata for the result set.
    pub columns: Vec<Column>,

    /// Rows of data.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Creates a new empty query result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Creates the one-column result used to report a failed execution.
    ///
    /// The column has an empty name so it renders like a server-side
    /// sentinel error, and the single row carries the message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            columns: vec![Column::sentinel()],
            rows: vec![vec![Value::String(message.into())]],
        }
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true for the single empty-named column error shape.
    pub fn is_error(&self) -> bool {
        self.columns.len() == 1 && self.columns[0].is_sentinel()
    }

    /// Returns the first explanatory message of an error result.
    pub fn error_message(&self) -> Option<String> {
        if !self.is_error() {
            return None;
        }
        self.rows
            .first()
            .and_then(|row| row.first())
            .map(Value::to_display_string)
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name. Empty for the sentinel/error column.
    pub name: String,

    /// Recognized type tag.
    pub column_type: ColumnType,

    /// The upper-cased type string the service declared, kept even when it
    /// maps to [`ColumnType::Unknown`]. Empty when no type was declared.
    #[serde(default)]
    pub declared_type: String,
}

impl Column {
    /// Creates a column with the given name and type.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            declared_type: match column_type {
                ColumnType::Unknown => String::new(),
                other => other.as_str().to_string(),
            },
            column_type,
        }
    }

    /// Creates a column from a declared type string.
    ///
    /// The declaration is upper-cased and kept verbatim; the type tag is
    /// resolved through [`ColumnType::parse`], which never fails.
    pub fn declared(name: impl Into<String>, declared_type: &str) -> Self {
        let declared_type = declared_type.trim().to_uppercase();
        Self {
            name: name.into(),
            column_type: ColumnType::parse(&declared_type),
            declared_type,
        }
    }

    /// Creates an untyped column (plain-header shape).
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Unknown)
    }

    /// The empty-named column that marks an error result.
    pub fn sentinel() -> Self {
        Self::untyped("")
    }

    /// Returns true if this is the empty-named error column.
    pub fn is_sentinel(&self) -> bool {
        self.name.is_empty() && self.column_type == ColumnType::Unknown
    }
}

/// Closed set of column type tags the service can declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Number,
    Int,
    String,
    Boolean,
    Container,
    Metadata,
    RunCmd,
    Start,
    Stop,
    Pause,
    Unpause,
    Remove,
    Restart,
    Kill,
    Count,
    Sum,
    Length,
    #[default]
    Unknown,
}

impl ColumnType {
    /// Every tag, in declaration order.
    pub const ALL: [ColumnType; 18] = [
        Self::Number,
        Self::Int,
        Self::String,
        Self::Boolean,
        Self::Container,
        Self::Metadata,
        Self::RunCmd,
        Self::Start,
        Self::Stop,
        Self::Pause,
        Self::Unpause,
        Self::Remove,
        Self::Restart,
        Self::Kill,
        Self::Count,
        Self::Sum,
        Self::Length,
        Self::Unknown,
    ];

    /// Maps a type string to a tag. Total: anything unrecognized is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "NUMBER" => Self::Number,
            "INT" => Self::Int,
            "STRING" => Self::String,
            "BOOLEAN" => Self::Boolean,
            "CONTAINER" => Self::Container,
            "METADATA" => Self::Metadata,
            "RUN_CMD" => Self::RunCmd,
            "START" => Self::Start,
            "STOP" => Self::Stop,
            "PAUSE" => Self::Pause,
            "UNPAUSE" => Self::Unpause,
            "REMOVE" => Self::Remove,
            "RESTART" => Self::Restart,
            "KILL" => Self::Kill,
            "COUNT" => Self::Count,
            "SUM" => Self::Sum,
            "LENGTH" => Self::Length,
            _ => Self::Unknown,
        }
    }

    /// Returns the canonical upper-case spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::Int => "INT",
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
            Self::Container => "CONTAINER",
            Self::Metadata => "METADATA",
            Self::RunCmd => "RUN_CMD",
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Pause => "PAUSE",
            Self::Unpause => "UNPAUSE",
            Self::Remove => "REMOVE",
            Self::Restart => "RESTART",
            Self::Kill => "KILL",
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Length => "LENGTH",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// A single cell value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum Value {
    /// JSON `null`.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Integer that fits in i64.
    Int(i64),

    /// Any other number.
    Float(f64),

    /// Text value.
    String(String),

    /// Nested arrays and objects, kept as-is.
    Json(serde_json::Value),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the numeric value if the cell holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns true if the cell holds a number.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Converts the value to its display string.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Json(j) => j.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::Json(other.clone()),
        }
    }
}

// Conversion implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
