//! Sync types

use crate::error::Result;
use crate::types::Record;
use futures::Stream;
use std::collections::BTreeMap;
use std::pin::Pin;

/// Lazy sequence of post-processed records
pub type RecordStream = Pin<Box<dyn Stream<Item = Result<Record>> + Send>>;

/// Counters for one stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Records emitted
    pub records: u64,
    /// Partitions that failed
    pub errors: u64,
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Per-stream counters, by stream name
    pub streams: BTreeMap<String, StreamStats>,
    /// HTTP requests issued for records
    pub requests: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one emitted record
    pub fn add_record(&mut self, stream: &str) {
        self.streams.entry(stream.to_string()).or_default().records += 1;
    }

    /// Count one failed partition
    pub fn add_error(&mut self, stream: &str) {
        self.streams.entry(stream.to_string()).or_default().errors += 1;
    }

    /// Total records across streams
    pub fn total_records(&self) -> u64 {
        self.streams.values().map(|s| s.records).sum()
    }

    /// Total partition failures across streams
    pub fn total_errors(&self) -> u64 {
        self.streams.values().map(|s| s.errors).sum()
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
