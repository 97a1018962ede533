//! Output module
//!
//! Writes Singer-style messages as JSON lines.
//!
//! # Overview
//!
//! - `SCHEMA` once per stream, carrying the JSON Schema and key properties
//! - `RECORD` per post-processed record, stamped with the extraction time
//!
//! Only data messages go to the writer; logs and metrics go through
//! `tracing` to stderr.

mod messages;
mod writer;

pub use messages::Message;
pub use writer::Emitter;

#[cfg(test)]
mod tests;
