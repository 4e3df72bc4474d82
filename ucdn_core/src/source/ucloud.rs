use crate::{
    error::{ExporterError, Result},
    points::{Bandwidth95, BandwidthPoint, HitRatePoint, HttpCodePoint, RequestNumPoint},
    resource::MonitoredResource,
    source::{sign::sign_params, DataSource, StatQuery},
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.ucloud.cn";

// 5 minute granularity for the series actions
const SERIES_GRANULARITY: &str = "0";
const DOMAIN_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct UcdnClientConfig {
    pub base_url: String,
    pub public_key: String,
    pub private_key: String,
    pub timeout: Duration,
}

impl Default for UcdnClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            public_key: String::new(),
            private_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Signed client for the UCloud CDN management API.
pub struct UcdnClient {
    http: reqwest::Client,
    config: UcdnClientConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    ret_code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HitRateResponse {
    #[serde(default)]
    hit_rate_list: Vec<HitRatePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BandwidthResponse {
    #[serde(default)]
    bandwidth_list: Vec<BandwidthPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HttpCodeResponse {
    #[serde(default)]
    http_code_detail: Vec<HttpCodePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RequestNumResponse {
    #[serde(default)]
    request_list: Vec<RequestNumPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DomainInfo {
    domain_id: String,
    domain: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DomainListResponse {
    #[serde(default)]
    domain_list: Vec<DomainInfo>,
}

impl UcdnClient {
    pub fn new(config: UcdnClientConfig) -> Result<Self> {
        if config.public_key.is_empty() || config.private_key.is_empty() {
            return Err(ExporterError::InvalidConfig(
                "UCloud public and private keys are required".to_string(),
            ));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Every accelerated domain of the project, paging through the listing.
    pub async fn list_domains(&self, project_id: &str) -> Result<Vec<MonitoredResource>> {
        let mut resources = Vec::new();
        let mut offset = 0;

        loop {
            let mut params = BTreeMap::new();
            if !project_id.is_empty() {
                params.insert("ProjectId".to_string(), project_id.to_string());
            }
            params.insert("Offset".to_string(), offset.to_string());
            params.insert("Limit".to_string(), DOMAIN_PAGE_SIZE.to_string());

            let page: DomainListResponse = self.call("DescribeNewUcdnDomain", params).await?;
            let fetched = page.domain_list.len();
            resources.extend(
                page.domain_list
                    .into_iter()
                    .map(|d| MonitoredResource::new(d.domain_id, d.domain)),
            );

            if fetched < DOMAIN_PAGE_SIZE {
                break;
            }
            offset += fetched;
        }

        debug!(count = resources.len(), "Discovered UCDN domains");
        Ok(resources)
    }

    fn stat_params(query: &StatQuery, with_granularity: bool) -> BTreeMap<String, String> {
        let (begin, end) = query.window.bounds(Utc::now());

        let mut params = BTreeMap::new();
        if !query.project_id.is_empty() {
            params.insert("ProjectId".to_string(), query.project_id.clone());
        }
        params.insert("DomainId.0".to_string(), query.resource_id.clone());
        params.insert("BeginTime".to_string(), begin.to_string());
        params.insert("EndTime".to_string(), end.to_string());
        if with_granularity {
            params.insert("Type".to_string(), SERIES_GRANULARITY.to_string());
        }
        params
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        mut params: BTreeMap<String, String>,
    ) -> Result<T> {
        params.insert("Action".to_string(), action.to_string());
        params.insert("PublicKey".to_string(), self.config.public_key.clone());
        let signature = sign_params(&params, &self.config.private_key);
        params.insert("Signature".to_string(), signature);

        debug!(action, "Calling UCDN API");

        let response = self
            .http
            .post(&self.config.base_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Fetch {
                action: action.to_string(),
                message: format!("unexpected HTTP status {}", status),
            });
        }

        let body: serde_json::Value = response.json().await?;
        let envelope: Envelope = serde_json::from_value(body.clone())?;
        if envelope.ret_code != 0 {
            return Err(ExporterError::Api {
                action: action.to_string(),
                code: envelope.ret_code,
                message: envelope.message,
            });
        }

        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl DataSource for UcdnClient {
    async fn fetch_hit_rate(&self, query: &StatQuery) -> Result<Vec<HitRatePoint>> {
        let response: HitRateResponse = self
            .call("GetUcdnDomainHitRate", Self::stat_params(query, true))
            .await?;
        Ok(response.hit_rate_list)
    }

    async fn fetch_bandwidth(&self, query: &StatQuery) -> Result<Vec<BandwidthPoint>> {
        let response: BandwidthResponse = self
            .call("GetNewUcdnDomainBandwidth", Self::stat_params(query, true))
            .await?;
        Ok(response.bandwidth_list)
    }

    async fn fetch_origin_http_codes(&self, query: &StatQuery) -> Result<Vec<HttpCodePoint>> {
        let response: HttpCodeResponse = self
            .call("GetUcdnDomainOriginHttpCode", Self::stat_params(query, true))
            .await?;
        Ok(response.http_code_detail)
    }

    async fn fetch_origin_requests(&self, query: &StatQuery) -> Result<Vec<RequestNumPoint>> {
        let response: RequestNumResponse = self
            .call("GetUcdnDomainOriginRequestNum", Self::stat_params(query, true))
            .await?;
        Ok(response.request_list)
    }

    async fn fetch_bandwidth_95(&self, query: &StatQuery) -> Result<Bandwidth95> {
        self.call("GetUcdn95BandwidthV2", Self::stat_params(query, false))
            .await
    }
}
