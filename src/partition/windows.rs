//! Date windows for the windowed shipments partition
//!
//! `[start, end)` is cut into consecutive windows of a fixed width, the last
//! one clipped to `end`.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

/// How far `start_date` must lie in the past before windowing kicks in
pub const LOOKBACK_SECS: i64 = 3600;

/// Width of each window
pub const WINDOW_SECS: i64 = 3600;

/// Timestamp format expected by the `orderDate` filter
pub const WINDOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Half-open time range `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// `{"from": ..., "to": ...}` as sent in `filter.orderDate`
    pub fn to_json(&self) -> Value {
        json!({
            "from": format_timestamp(self.from),
            "to": format_timestamp(self.to),
        })
    }

    /// Window width
    pub fn width(&self) -> Duration {
        self.to - self.from
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{}",
            format_timestamp(self.from),
            format_timestamp(self.to)
        )
    }
}

/// Format a timestamp as ISO-8601 UTC with microseconds
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format(WINDOW_FORMAT).to_string()
}

/// Split `[start, end)` into chronological windows of `step`
///
/// Returns nothing for an empty range or a non-positive step.
pub fn date_windows(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Vec<DateWindow> {
    if step <= Duration::zero() {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut current = start;
    while current < end {
        let next = current + step;
        let window_end = if next > end { end } else { next };
        windows.push(DateWindow::new(current, window_end));
        current = next;
    }
    windows
}

/// Windows to sync for a windowed partition
///
/// `None` means run once without a date filter: either no start date is
/// configured or it lies within the lookback period.
pub fn plan_windows(start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Vec<DateWindow>> {
    let start = start?;
    if start >= now - Duration::seconds(LOOKBACK_SECS) {
        return None;
    }
    Some(date_windows(start, now, Duration::seconds(WINDOW_SECS)))
}
