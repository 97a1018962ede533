//! Pagination types
//!
//! How a stream decides it has more pages is configuration data: a cursor
//! path plus one of two completion predicates.

use crate::error::Result;
use crate::extract::validate_path;
use serde::{Deserialize, Serialize};

/// Signal that a response is the last page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletionPredicate {
    /// Finished when the cursor path yields no value
    CursorAbsent,
    /// Finished when the named field is falsy or missing
    Flag {
        /// JSONPath of the continuation flag (e.g. `$.hasMore`)
        field: String,
    },
}

/// Per-stream pagination settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// JSONPath of the next-page cursor (e.g. `$.nextPageUrl`)
    pub cursor_path: String,
    /// Completion predicate
    pub completion: CompletionPredicate,
}

impl PaginationConfig {
    /// Paginate until the cursor disappears
    pub fn cursor(cursor_path: impl Into<String>) -> Self {
        Self {
            cursor_path: cursor_path.into(),
            completion: CompletionPredicate::CursorAbsent,
        }
    }

    /// Paginate while a boolean flag holds
    pub fn flag(cursor_path: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            cursor_path: cursor_path.into(),
            completion: CompletionPredicate::Flag {
                field: field.into(),
            },
        }
    }

    /// Check that every path parses
    pub fn validate(&self) -> Result<()> {
        validate_path(&self.cursor_path)?;
        if let CompletionPredicate::Flag { field } = &self.completion {
            validate_path(field)?;
        }
        Ok(())
    }
}

/// Paginator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginatorState {
    /// More pages may follow
    #[default]
    Active,
    /// Terminal; no further requests
    Finished,
}
