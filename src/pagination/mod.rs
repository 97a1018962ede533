//! Pagination module
//!
//! # Overview
//!
//! Seller API responses publish an opaque cursor (`nextPageUrl`, `nextUrl`)
//! for the following page. A [`Paginator`] extracts it from each response
//! and finishes when the stream's [`CompletionPredicate`] holds:
//!
//! - `CursorAbsent`: the cursor path yields nothing
//! - `Flag`: a boolean such as `hasMore` is falsy
//!
//! A cursor equal to the previous one is reported as a pagination loop.

mod paginator;
mod types;

pub use paginator::Paginator;
pub use types::{CompletionPredicate, PaginationConfig, PaginatorState};
