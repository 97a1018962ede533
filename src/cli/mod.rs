//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Commands
//!
//! - `about` - Print the settings schema
//! - `check` - Verify the credentials against the token endpoint
//! - `discover` - Print the stream catalog
//! - `sync` - Emit `SCHEMA` and `RECORD` messages on stdout

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::{catalog, sync_streams, Runner};
