//! Record post-processing
//!
//! Denormalizes the partition context onto every record it produced.

use super::types::PartitionContext;
use crate::error::{Error, Result};
use crate::types::Record;
use serde_json::Value;

/// Add `shipment_status_*` fields from a shipments partition
pub fn annotate_shipment(mut record: Record, context: &PartitionContext) -> Result<Option<Record>> {
    let Some(filter) = context.shipment_filter() else {
        return Err(Error::partition_record(
            "shipments",
            context.id(),
            "shipment record under a non-shipment partition",
        ));
    };

    record.insert(
        "shipment_status_state".to_string(),
        Value::String(filter.states_label()),
    );
    record.insert(
        "shipment_status_type".to_string(),
        Value::String(filter.kind.as_str().to_string()),
    );
    record.insert(
        "shipment_status_cancellation_type".to_string(),
        filter
            .cancellation_type
            .clone()
            .map_or(Value::Null, Value::String),
    );
    Ok(Some(record))
}

/// Add `return_source` from a returns partition
pub fn annotate_return(mut record: Record, context: &PartitionContext) -> Result<Option<Record>> {
    let Some(source) = context.return_source() else {
        return Err(Error::partition_record(
            "returns",
            context.id(),
            "return record under a non-return partition",
        ));
    };

    record.insert("return_source".to_string(), Value::String(source.to_string()));
    Ok(Some(record))
}
