//! Stream definitions
//!
//! A stream is plain data: where to send the first request, how records and
//! cursors are found in the response, which partitions to iterate and how to
//! post-process each record. One generic sync loop drives every stream.

use crate::error::{Error, Result};
use crate::extract::RecordExtractor;
use crate::pagination::PaginationConfig;
use crate::partition::{
    annotate_return, annotate_shipment, return_partitions, shipment_partitions,
    PartitionContext, PostProcessor,
};
use crate::types::Method;
use serde_json::Value;

/// Shape of the first request of a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// `POST` with the partition's shipment filter as JSON body
    FilterBody,
    /// `GET` with the partition's return source as `source` query parameter
    SourceQuery,
}

impl RequestShape {
    /// HTTP method of the first request
    pub fn method(&self) -> Method {
        match self {
            Self::FilterBody => Method::POST,
            Self::SourceQuery => Method::GET,
        }
    }
}

/// Everything the sync loop needs to know about one stream
#[derive(Clone)]
pub struct StreamDefinition {
    /// Stream name
    pub name: &'static str,
    /// Resource path relative to the API base URL
    pub path: &'static str,
    /// First-request shape
    pub shape: RequestShape,
    /// JSONPath selecting records
    pub records_path: &'static str,
    /// Cursor path and completion predicate
    pub pagination: PaginationConfig,
    /// Primary key fields
    pub primary_keys: &'static [&'static str],
    /// Partition catalog
    pub partitions: fn() -> Vec<PartitionContext>,
    /// Per-record hook
    pub post_process: PostProcessor,
    /// JSON Schema source
    schema: &'static str,
}

impl StreamDefinition {
    /// Parsed JSON Schema
    pub fn schema(&self) -> Result<Value> {
        serde_json::from_str(self.schema)
            .map_err(|e| Error::config(format!("Invalid schema for stream '{}': {e}", self.name)))
    }

    /// Record extractor for this stream's records path
    pub fn extractor(&self) -> Result<RecordExtractor> {
        RecordExtractor::new(self.records_path)
    }

    /// Check the paths and schema
    pub fn validate(&self) -> Result<()> {
        self.extractor()?;
        self.pagination.validate()?;
        self.schema()?;
        Ok(())
    }
}

impl std::fmt::Debug for StreamDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamDefinition")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("shape", &self.shape)
            .field("records_path", &self.records_path)
            .field("pagination", &self.pagination)
            .field("primary_keys", &self.primary_keys)
            .finish_non_exhaustive()
    }
}

/// Shipments across every shipment state
pub fn shipments() -> StreamDefinition {
    StreamDefinition {
        name: "shipments",
        path: "/v3/shipments/filter",
        shape: RequestShape::FilterBody,
        records_path: "$.shipments[*]",
        pagination: PaginationConfig::flag("$.nextPageUrl", "$.hasMore"),
        primary_keys: &["shipmentId"],
        partitions: shipment_partitions,
        post_process: annotate_shipment,
        schema: include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/schemas/shipments.json")),
    }
}

/// Returns from every return source
pub fn returns() -> StreamDefinition {
    StreamDefinition {
        name: "returns",
        path: "/v2/returns",
        shape: RequestShape::SourceQuery,
        records_path: "$.returnItems[*]",
        pagination: PaginationConfig::cursor("$.nextUrl"),
        primary_keys: &["returnId"],
        partitions: return_partitions,
        post_process: annotate_return,
        schema: include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/schemas/returns.json")),
    }
}

/// Every stream, in sync order
pub fn all() -> Vec<StreamDefinition> {
    vec![shipments(), returns()]
}

/// Look up a stream by name
pub fn find(name: &str) -> Result<StreamDefinition> {
    all()
        .into_iter()
        .find(|s| s.name == name.trim())
        .ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
}

/// Resolve a comma-separated selection; empty means every stream
pub fn select(selection: Option<&str>) -> Result<Vec<StreamDefinition>> {
    match selection {
        None => Ok(all()),
        Some(list) if list.trim().is_empty() => Ok(all()),
        Some(list) => list
            .split(',')
            .filter(|name| !name.trim().is_empty())
            .map(find)
            .collect(),
    }
}
