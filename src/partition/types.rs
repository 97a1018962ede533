//! Partition context types
//!
//! A partition context is the immutable filter that identifies one slice of
//! a stream. It shapes the first request of every pagination run and is
//! carried into post-processing.

use super::windows::DateWindow;
use crate::error::Result;
use crate::types::Record;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Shipment state that is synced in date windows
pub const WINDOWED_STATE: &str = "DELIVERED";

/// Shipment lifecycle group understood by the filter endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShipmentType {
    PreDispatch,
    PostDispatch,
    Cancelled,
}

impl ShipmentType {
    /// Wire name (`preDispatch`, `postDispatch`, `cancelled`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreDispatch => "preDispatch",
            Self::PostDispatch => "postDispatch",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ShipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter criteria for one shipments partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentFilter {
    pub states: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ShipmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_type: Option<String>,
}

impl ShipmentFilter {
    /// Filter on a single state
    pub fn new(state: impl Into<String>, kind: ShipmentType) -> Self {
        Self {
            states: vec![state.into()],
            kind,
            cancellation_type: None,
        }
    }

    /// Restrict cancelled shipments to one cancellation type
    #[must_use]
    pub fn with_cancellation_type(mut self, cancellation_type: impl Into<String>) -> Self {
        self.cancellation_type = Some(cancellation_type.into());
        self
    }

    /// States joined with commas
    pub fn states_label(&self) -> String {
        self.states.join(",")
    }

    /// Body for `POST /v3/shipments/filter`
    pub fn request_body(&self, page_size: u32, window: Option<&DateWindow>) -> Value {
        let mut filter = Map::new();
        filter.insert("states".to_string(), json!(self.states));
        filter.insert("type".to_string(), json!(self.kind.as_str()));
        if let Some(cancellation_type) = &self.cancellation_type {
            filter.insert("cancellationType".to_string(), json!(cancellation_type));
        }
        if let Some(window) = window {
            filter.insert("orderDate".to_string(), window.to_json());
        }

        json!({
            "filter": filter,
            "pagination": {"pageSize": page_size},
            "sort": {"field": "orderDate", "order": "asc"}
        })
    }
}

/// One slice of a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartitionContext {
    /// Shipments matching a state filter
    Shipment(ShipmentFilter),
    /// Returns from one source
    Return {
        /// `courier_return` or `customer_return`
        source: String,
    },
}

impl PartitionContext {
    /// Shipments partition on a single state
    pub fn shipment(state: impl Into<String>, kind: ShipmentType) -> Self {
        Self::Shipment(ShipmentFilter::new(state, kind))
    }

    /// Returns partition for a source
    pub fn returns(source: impl Into<String>) -> Self {
        Self::Return {
            source: source.into(),
        }
    }

    /// Stable identifier used in logs and metric tags
    pub fn id(&self) -> String {
        match self {
            Self::Shipment(filter) => match &filter.cancellation_type {
                Some(ct) => format!("{}:{}:{ct}", filter.kind, filter.states_label()),
                None => format!("{}:{}", filter.kind, filter.states_label()),
            },
            Self::Return { source } => source.clone(),
        }
    }

    /// Context as the JSON mapping reported in metrics
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Whether this partition is synced in date windows
    pub fn needs_date_windows(&self) -> bool {
        match self {
            Self::Shipment(filter) => filter
                .states
                .iter()
                .any(|s| s.eq_ignore_ascii_case(WINDOWED_STATE)),
            Self::Return { .. } => false,
        }
    }

    /// Shipment filter, if this is a shipments partition
    pub fn shipment_filter(&self) -> Option<&ShipmentFilter> {
        match self {
            Self::Shipment(filter) => Some(filter),
            Self::Return { .. } => None,
        }
    }

    /// Return source, if this is a returns partition
    pub fn return_source(&self) -> Option<&str> {
        match self {
            Self::Return { source } => Some(source),
            Self::Shipment(_) => None,
        }
    }
}

impl std::fmt::Display for PartitionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}

/// Per-record hook run after extraction
///
/// `Ok(None)` drops the record; an error fails the whole partition.
pub type PostProcessor = fn(Record, &PartitionContext) -> Result<Option<Record>>;
