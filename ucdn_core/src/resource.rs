use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A CDN domain reported on by the exporter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MonitoredResource {
    /// Opaque UCloud domain id, e.g. `ucdn-xxxxxx`
    pub resource_id: String,

    /// Emitted as the metric label value
    pub display_name: String,
}

impl MonitoredResource {
    pub fn new(resource_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            display_name: display_name.into(),
        }
    }

    pub fn description(&self) -> String {
        format!("{} ({})", self.display_name, self.resource_id)
    }
}

/// Reporting window queried on every scrape.
///
/// `delay_seconds` shifts the window back from "now" to skip samples the
/// upstream has not finished aggregating yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportWindow {
    pub range_seconds: i64,
    pub delay_seconds: i64,
}

impl ReportWindow {
    pub fn new(range_seconds: i64, delay_seconds: i64) -> Self {
        Self {
            range_seconds,
            delay_seconds,
        }
    }

    /// Unix-second bounds `(begin, end)` of the window relative to `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> (i64, i64) {
        let end = now.timestamp().saturating_sub(self.delay_seconds);
        (end.saturating_sub(self.range_seconds), end)
    }
}
