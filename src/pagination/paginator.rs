//! Cursor paginator
//!
//! One `Paginator` lives for exactly one partition (or one date window). It
//! never looks ahead: the decision to stop is made from the most recent
//! response alone.

use super::types::{CompletionPredicate, PaginationConfig, PaginatorState};
use crate::error::{Error, Result};
use crate::extract::{first_match, is_truthy};
use serde_json::Value;
use tracing::debug;

/// Tracks the continuation cursor for one partition
#[derive(Debug, Clone)]
pub struct Paginator {
    config: PaginationConfig,
    state: PaginatorState,
    cursor: Option<String>,
    pages: u64,
}

impl Paginator {
    /// Create a paginator positioned before the first page
    pub fn new(config: PaginationConfig) -> Self {
        Self {
            config,
            state: PaginatorState::Active,
            cursor: None,
            pages: 0,
        }
    }

    /// Whether the last response ended pagination
    pub fn is_finished(&self) -> bool {
        self.state == PaginatorState::Finished
    }

    /// Current lifecycle state
    pub fn state(&self) -> PaginatorState {
        self.state
    }

    /// Cursor for the next request; `None` before the first page
    pub fn current_cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Number of responses processed
    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Consume one response and decide whether another page follows
    ///
    /// A cursor equal to the immediately previous one fails with
    /// [`Error::PaginationLoop`]. Only that single repeat is detected: a
    /// longer cycle such as `A -> B -> A` is followed until the server ends it.
    pub fn advance(&mut self, body: &Value) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        self.pages += 1;

        let next = self.extract_cursor(body)?;
        let more = match &self.config.completion {
            CompletionPredicate::CursorAbsent => next.is_some(),
            CompletionPredicate::Flag { field } => {
                let flag = first_match(body, field)?;
                let more = flag.as_ref().is_some_and(is_truthy);
                if more && next.is_none() {
                    return Err(Error::malformed(
                        self.config.cursor_path.clone(),
                        format!("'{field}' reports more pages but no cursor is present"),
                    ));
                }
                more
            }
        };

        if !more {
            debug!(pages = self.pages, "Pagination finished");
            self.state = PaginatorState::Finished;
            return Ok(());
        }

        // `more` implies a cursor for both predicates
        let Some(next) = next else {
            self.state = PaginatorState::Finished;
            return Ok(());
        };
        if self.cursor.as_deref() == Some(next.as_str()) {
            return Err(Error::PaginationLoop { cursor: next });
        }

        debug!(cursor = %next, "Next page");
        self.cursor = Some(next);
        Ok(())
    }

    /// Cursor as a string; null and empty count as absent
    fn extract_cursor(&self, body: &Value) -> Result<Option<String>> {
        let cursor = match first_match(body, &self.config.cursor_path)? {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(_) | Value::Array(_) | Value::Object(_)) => {
                return Err(Error::malformed(
                    self.config.cursor_path.clone(),
                    "cursor is not a string",
                ))
            }
            Some(Value::Null) | None => return Ok(None),
        };
        Ok((!cursor.is_empty()).then_some(cursor))
    }
}
