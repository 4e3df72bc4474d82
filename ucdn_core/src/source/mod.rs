pub mod sign;
pub mod ucloud;

use crate::{
    error::Result,
    points::{Bandwidth95, BandwidthPoint, HitRatePoint, HttpCodePoint, RequestNumPoint},
    resource::{MonitoredResource, ReportWindow},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use sign::sign_params;
pub use ucloud::{UcdnClient, UcdnClientConfig, DEFAULT_BASE_URL};

/// Arguments shared by every statistics fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatQuery {
    pub resource_id: String,
    pub project_id: String,
    pub window: ReportWindow,
}

impl StatQuery {
    pub fn new(resource: &MonitoredResource, project_id: impl Into<String>, window: ReportWindow) -> Self {
        Self {
            resource_id: resource.resource_id.clone(),
            project_id: project_id.into(),
            window,
        }
    }
}

/// Source of CDN statistics, one operation per statistic kind
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Request and flow hit rate samples over the window
    async fn fetch_hit_rate(&self, query: &StatQuery) -> Result<Vec<HitRatePoint>>;

    /// Edge bandwidth samples (Mbps)
    async fn fetch_bandwidth(&self, query: &StatQuery) -> Result<Vec<BandwidthPoint>>;

    /// Origin status code breakdown samples
    async fn fetch_origin_http_codes(&self, query: &StatQuery) -> Result<Vec<HttpCodePoint>>;

    /// Origin request count samples
    async fn fetch_origin_requests(&self, query: &StatQuery) -> Result<Vec<RequestNumPoint>>;

    /// 95th percentile bandwidth, already aggregated upstream
    async fn fetch_bandwidth_95(&self, query: &StatQuery) -> Result<Bandwidth95>;
}

pub type DynDataSource = Arc<dyn DataSource>;
