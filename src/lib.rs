// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-flipkart
//!
//! Extracts shipments and returns from the Flipkart seller API.
//!
//! ## Features
//!
//! - **OAuth client credentials**: one cached token shared by every stream
//! - **Partitioned sync**: shipments per state, returns per source
//! - **Cursor pagination**: lazy, so a consumer that stops early stops the requests
//! - **Date windows**: the delivered partition is split into hourly windows
//! - **Singer output**: `SCHEMA` and `RECORD` messages as JSON lines
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use tap_flipkart::{streams, SyncLoop, TapConfig};
//!
//! #[tokio::main]
//! async fn main() -> tap_flipkart::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let sync = SyncLoop::from_config(&config)?;
//!
//!     let mut records = sync.stream_records(&streams::returns());
//!     while let Some(record) = records.next().await {
//!         println!("{}", serde_json::to_string(&record?)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 CLI: about / check / discover / sync          │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬───────────┬──────┴──────┬────────────┬───────────┐
//! │  Auth    │   HTTP    │  Paginate   │ Partition  │  Output   │
//! ├──────────┼───────────┼─────────────┼────────────┼───────────┤
//! │ OAuth2   │ GET/POST  │ Cursor      │ States     │ SCHEMA    │
//! │ Token    │ Retry     │ Flag        │ Sources    │ RECORD    │
//! │ cache    │ Rate limit│ Loop check  │ Windows    │           │
//! └──────────┴───────────┴─────────────┴────────────┴───────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap settings
pub mod config;

/// OAuth token provider
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// JSONPath record and value extraction
pub mod extract;

/// Cursor pagination
pub mod pagination;

/// Partition catalog, date windows and post-processing
pub mod partition;

/// Request counters
pub mod metrics;

/// Stream definitions
pub mod streams;

/// Partitioned sync loop
pub mod sync;

/// Singer message output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::TokenProvider;
pub use config::TapConfig;
pub use error::{Error, Result};
pub use output::{Emitter, Message};
pub use streams::StreamDefinition;
pub use sync::{SyncLoop, SyncStats};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
