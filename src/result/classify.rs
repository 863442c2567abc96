//! Column type classification.
//!
//! Maps a column's type tag to the display category the result table uses
//! to pick an affordance (glyph, alignment). Unknown tags get no affordance.

use super::types::ColumnType;

/// Display category for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnCategory {
    Numeric,
    Text,
    Boolean,
    Container,
    Metadata,
    Action,
    Aggregate,
}

impl ColumnCategory {
    /// Short glyph rendered before the column name.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Numeric => "#",
            Self::Text => "a",
            Self::Boolean => "?",
            Self::Container => "▣",
            Self::Metadata => "≡",
            Self::Action => "▶",
            Self::Aggregate => "Σ",
        }
    }

    /// Whether cells of this category are right-aligned.
    pub fn right_aligned(&self) -> bool {
        matches!(self, Self::Numeric | Self::Aggregate)
    }
}

/// Classifies a column type tag.
pub fn classify(column_type: ColumnType) -> Option<ColumnCategory> {
    use ColumnType::*;

    match column_type {
        Number | Int => Some(ColumnCategory::Numeric),
        String => Some(ColumnCategory::Text),
        Boolean => Some(ColumnCategory::Boolean),
        Container => Some(ColumnCategory::Container),
        Metadata => Some(ColumnCategory::Metadata),
        RunCmd | Start | Stop | Pause | Unpause | Remove | Restart | Kill => {
            Some(ColumnCategory::Action)
        }
        Count | Sum | Length => Some(ColumnCategory::Aggregate),
        Unknown => None,
    }
}
