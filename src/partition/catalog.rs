//! Static partition catalogs
//!
//! Each stream iterates its partitions in the order listed here.

use super::types::{PartitionContext, ShipmentFilter, ShipmentType};
use crate::config::StateSelections;

/// States fetched through the `preDispatch` filter
pub const PRE_DISPATCH_STATES: &[&str] = &[
    "APPROVED",
    "PACKING_IN_PROGRESS",
    "PACKED",
    "FORM_FAILED",
    "READY_TO_DISPATCH",
];

/// States fetched through the `postDispatch` filter
pub const POST_DISPATCH_STATES: &[&str] = &["PICKUP_COMPLETE", "SHIPPED", "DELIVERED"];

/// State reported for cancelled shipments
pub const CANCELLED_STATE: &str = "CANCELLED";

/// The only cancellation type the filter endpoint honours
pub const SELLER_CANCELLATION: &str = "sellerCancellation";

/// Sources for the returns stream
pub const RETURN_SOURCES: &[&str] = &["courier_return", "customer_return"];

/// One partition per shipment state
pub fn shipment_partitions() -> Vec<PartitionContext> {
    let pre = PRE_DISPATCH_STATES
        .iter()
        .map(|state| PartitionContext::shipment(*state, ShipmentType::PreDispatch));
    let post = POST_DISPATCH_STATES
        .iter()
        .map(|state| PartitionContext::shipment(*state, ShipmentType::PostDispatch));
    let cancelled = PartitionContext::Shipment(
        ShipmentFilter::new(CANCELLED_STATE, ShipmentType::Cancelled)
            .with_cancellation_type(SELLER_CANCELLATION),
    );

    pre.chain(post).chain(std::iter::once(cancelled)).collect()
}

/// One partition per return source
pub fn return_partitions() -> Vec<PartitionContext> {
    RETURN_SOURCES
        .iter()
        .map(|source| PartitionContext::returns(*source))
        .collect()
}

/// Apply include/exclude lists to shipment partitions
///
/// Returns partitions pass through untouched; order is preserved.
pub fn select_partitions(
    partitions: Vec<PartitionContext>,
    selections: &StateSelections,
) -> Vec<PartitionContext> {
    partitions
        .into_iter()
        .filter(|partition| match partition.shipment_filter() {
            Some(filter) => filter.states.iter().all(|state| selections.allows(state)),
            None => true,
        })
        .collect()
}
