//! Samples returned by the UCDN statistics actions.
//!
//! Field names follow the API's PascalCase JSON so the types deserialize
//! straight out of a response body.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HitRatePoint {
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub request_hit_rate: f64,
    #[serde(default)]
    pub flow_hit_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BandwidthPoint {
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub cdn_bandwidth: f64,
}

/// Per-class status code breakdown. Only `total` feeds the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpCodeCounts {
    #[serde(default)]
    pub total: u64,
}

impl HttpCodeCounts {
    pub fn new(total: u64) -> Self {
        Self { total }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpCodePoint {
    #[serde(rename = "Time", default)]
    pub time: i64,
    #[serde(rename = "Http1XX", default)]
    pub http_1xx: HttpCodeCounts,
    #[serde(rename = "Http2XX", default)]
    pub http_2xx: HttpCodeCounts,
    #[serde(rename = "Http3XX", default)]
    pub http_3xx: HttpCodeCounts,
    #[serde(rename = "Http4XX", default)]
    pub http_4xx: HttpCodeCounts,
    #[serde(rename = "Http5XX", default)]
    pub http_5xx: HttpCodeCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestNumPoint {
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub cdn_request: f64,
}

/// Pre-aggregated 95th percentile bandwidth for the whole window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bandwidth95 {
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub cdn_bandwidth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_code_point_from_api_json() {
        let json = r#"{
            "Time": 1700000000,
            "Http1XX": {"Total": 0},
            "Http2XX": {"Total": 120, "Http200": 118},
            "Http4XX": {"Total": 7, "Http404": 7},
            "Http5XX": {"Total": 2}
        }"#;

        let point: HttpCodePoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.time, 1_700_000_000);
        assert_eq!(point.http_2xx.total, 120);
        assert_eq!(point.http_3xx, HttpCodeCounts::default());
        assert_eq!(point.http_4xx.total, 7);
        assert_eq!(point.http_5xx.total, 2);
    }

    #[test]
    fn test_hit_rate_point_from_api_json() {
        let json = r#"{"Time": 1700000300, "RequestHitRate": 91.5, "FlowHitRate": 97.25}"#;
        let point: HitRatePoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.request_hit_rate, 91.5);
        assert_eq!(point.flow_hit_rate, 97.25);
    }
}
