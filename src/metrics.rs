//! Request metrics
//!
//! A [`RequestCounter`] covers one pagination run. Increments are coalesced
//! and reported once, as a Singer-style `http_request_count` METRIC log
//! line, when the run finishes or the counter is dropped early.

use serde_json::{json, Value};
use tracing::info;

/// Metric name reported for HTTP requests
pub const HTTP_REQUEST_COUNT: &str = "http_request_count";

/// Counts requests for one stream, endpoint and partition
#[derive(Debug)]
pub struct RequestCounter {
    stream: String,
    endpoint: String,
    context: Value,
    count: u64,
    reported: bool,
}

impl RequestCounter {
    /// Start counting
    pub fn new(stream: impl Into<String>, endpoint: impl Into<String>, context: Value) -> Self {
        Self {
            stream: stream.into(),
            endpoint: endpoint.into(),
            context,
            count: 0,
            reported: false,
        }
    }

    /// Record one request
    pub fn increment(&mut self) {
        self.count += 1;
    }

    /// Requests counted so far
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The metric point in Singer shape
    pub fn to_json(&self) -> Value {
        json!({
            "type": "counter",
            "metric": HTTP_REQUEST_COUNT,
            "value": self.count,
            "tags": {
                "stream": self.stream,
                "endpoint": self.endpoint,
                "context": self.context,
            }
        })
    }

    /// Report the total and stop counting
    pub fn finish(mut self) -> u64 {
        self.report();
        self.count
    }

    fn report(&mut self) {
        if self.reported {
            return;
        }
        self.reported = true;
        info!(target: "tap_flipkart::metrics", "METRIC: {}", self.to_json());
    }
}

impl Drop for RequestCounter {
    fn drop(&mut self) {
        self.report();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counter_shape() {
        let mut counter = RequestCounter::new(
            "shipments",
            "/v3/shipments/filter",
            json!({"states": ["SHIPPED"], "type": "postDispatch"}),
        );
        counter.increment();
        counter.increment();

        assert_eq!(
            counter.to_json(),
            json!({
                "type": "counter",
                "metric": "http_request_count",
                "value": 2,
                "tags": {
                    "stream": "shipments",
                    "endpoint": "/v3/shipments/filter",
                    "context": {"states": ["SHIPPED"], "type": "postDispatch"}
                }
            })
        );
    }

    #[test]
    fn test_finish_returns_total() {
        let mut counter = RequestCounter::new("returns", "/v2/returns", json!({"source": "x"}));
        for _ in 0..3 {
            counter.increment();
        }
        assert_eq!(counter.finish(), 3);
    }

    #[test]
    fn test_report_is_idempotent() {
        let mut counter = RequestCounter::new("returns", "/v2/returns", Value::Null);
        counter.report();
        assert!(counter.reported);
        counter.report();
        drop(counter);
    }
}
