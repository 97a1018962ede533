//! Request building for the sync loop

use crate::error::{Error, Result};
use crate::http::RequestDescriptor;
use crate::partition::{DateWindow, PartitionContext};
use crate::streams::{RequestShape, StreamDefinition};

/// First request of a pagination run, shaped by the partition
pub fn first_request(
    stream: &StreamDefinition,
    partition: &PartitionContext,
    base_url: &str,
    page_size: u32,
    window: Option<&DateWindow>,
) -> Result<RequestDescriptor> {
    let url = format!("{base_url}{}", stream.path);

    match stream.shape {
        RequestShape::FilterBody => {
            let filter = partition.shipment_filter().ok_or_else(|| {
                Error::partition_record(
                    stream.name,
                    partition.id(),
                    "partition carries no shipment filter",
                )
            })?;
            Ok(RequestDescriptor::post(
                url,
                filter.request_body(page_size, window),
            ))
        }
        RequestShape::SourceQuery => {
            let source = partition.return_source().ok_or_else(|| {
                Error::partition_record(stream.name, partition.id(), "partition carries no source")
            })?;
            Ok(RequestDescriptor::get(url).query("source", source))
        }
    }
}

/// Follow-up request: `GET` base URL + cursor, no body
pub fn continuation_request(base_url: &str, cursor: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("{base_url}{cursor}"))
}
