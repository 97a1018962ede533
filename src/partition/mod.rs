//! Partition module
//!
//! # Overview
//!
//! Every stream is split into a static, ordered list of partitions:
//! - shipments: one filter per shipment state (`preDispatch`,
//!   `postDispatch`, `cancelled`)
//! - returns: one partition per return source
//!
//! The `DELIVERED` partition is additionally cut into hourly date windows
//! when a start date is configured. Post-processors copy the partition
//! fields onto each record.

mod catalog;
mod postprocess;
mod types;
mod windows;

pub use catalog::{
    return_partitions, select_partitions, shipment_partitions, CANCELLED_STATE,
    POST_DISPATCH_STATES, PRE_DISPATCH_STATES, RETURN_SOURCES, SELLER_CANCELLATION,
};
pub use postprocess::{annotate_return, annotate_shipment};
pub use types::{PartitionContext, PostProcessor, ShipmentFilter, ShipmentType, WINDOWED_STATE};
pub use windows::{
    date_windows, format_timestamp, plan_windows, DateWindow, LOOKBACK_SECS, WINDOW_FORMAT,
    WINDOW_SECS,
};
