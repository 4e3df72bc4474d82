use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use ucdn_core::{source::DEFAULT_BASE_URL, MonitoredResource, ReportWindow, UcdnClientConfig};

/// Route served next to the metrics path; the two must differ.
pub const HEALTH_PATH: &str = "/health";

/// Upper bound for window range and delay.
pub const MAX_WINDOW_SPAN: Duration = Duration::from_secs(90 * 24 * 3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
    pub project_id: String,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub domains: Vec<DomainConfig>,
    #[serde(default = "default_discover_domains")]
    pub discover_domains: bool,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(with = "ucdn_core::duration", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            private_key: String::new(),
            base_url: default_base_url(),
        }
    }
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.public_key.is_empty() && !self.private_key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(with = "ucdn_core::duration", default = "default_range")]
    pub range: Duration,
    #[serde(with = "ucdn_core::duration", default = "default_delay")]
    pub delay: Duration,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            range: default_range(),
            delay: default_delay(),
        }
    }
}

impl WindowConfig {
    pub fn to_report_window(&self) -> ReportWindow {
        let seconds = |d: Duration| i64::try_from(d.as_secs()).unwrap_or(i64::MAX);
        ReportWindow::new(seconds(self.range), seconds(self.delay))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainConfig {
    pub id: String,
    pub name: String,
}

impl DomainConfig {
    pub fn to_resource(&self) -> MonitoredResource {
        MonitoredResource::new(self.id.clone(), self.name.clone())
    }
}

/// TOML files nest everything under an `[exporter]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfigFile {
    pub exporter: ExporterConfig,
}

fn default_listen_address() -> String {
    "0.0.0.0:9140".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_discover_domains() -> bool {
    true
}

fn default_concurrency() -> usize {
    1
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_range() -> Duration {
    Duration::from_secs(600)
}

fn default_delay() -> Duration {
    Duration::from_secs(300)
}

impl ExporterConfig {
    pub fn builder() -> ExporterConfigBuilder {
        ExporterConfigBuilder::default()
    }

    pub fn resources(&self) -> Vec<MonitoredResource> {
        self.domains.iter().map(DomainConfig::to_resource).collect()
    }

    pub fn report_window(&self) -> ReportWindow {
        self.window.to_report_window()
    }

    pub fn client_config(&self) -> UcdnClientConfig {
        UcdnClientConfig {
            base_url: self.credentials.base_url.clone(),
            public_key: self.credentials.public_key.clone(),
            private_key: self.credentials.private_key.clone(),
            timeout: self.request_timeout,
        }
    }

    /// Replace file credentials with values taken from the command line or
    /// environment, when present.
    pub fn override_credentials(&mut self, public_key: Option<String>, private_key: Option<String>) {
        if let Some(key) = public_key.filter(|k| !k.is_empty()) {
            self.credentials.public_key = key;
        }
        if let Some(key) = private_key.filter(|k| !k.is_empty()) {
            self.credentials.private_key = key;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.project_id.is_empty() {
            return Err("project_id cannot be empty".to_string());
        }

        self.listen_address
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid listen_address '{}': {}", self.listen_address, e))?;

        if !self.metrics_path.starts_with('/') || self.metrics_path.len() < 2 {
            return Err(format!(
                "metrics_path '{}' must start with '/' and name a route",
                self.metrics_path
            ));
        }

        if self.metrics_path == HEALTH_PATH || self.metrics_path.contains([':', '*']) {
            return Err(format!(
                "metrics_path '{}' collides with another route",
                self.metrics_path
            ));
        }

        if self.window.range.as_secs() == 0 {
            return Err("window range must be at least one second".to_string());
        }

        for (field, span) in [("range", self.window.range), ("delay", self.window.delay)] {
            if span > MAX_WINDOW_SPAN {
                return Err(format!(
                    "window {} {} exceeds the maximum of {}",
                    field,
                    humantime::format_duration(span),
                    humantime::format_duration(MAX_WINDOW_SPAN)
                ));
            }
        }

        if self.concurrency == 0 {
            return Err("concurrency must be >= 1".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request_timeout must be > 0".to_string());
        }

        if self.domains.is_empty() && !self.discover_domains {
            return Err("No domains configured and domain discovery is disabled".to_string());
        }

        let mut seen = HashSet::new();
        for (i, domain) in self.domains.iter().enumerate() {
            if domain.id.is_empty() || domain.name.is_empty() {
                return Err(format!("Domain {} must have both an id and a name", i));
            }
            if !seen.insert(domain.id.as_str()) {
                return Err(format!("Domain id '{}' is listed more than once", domain.id));
            }
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct ExporterConfigBuilder {
    listen_address: Option<String>,
    metrics_path: Option<String>,
    project_id: Option<String>,
    credentials: Credentials,
    window: WindowConfig,
    domains: Vec<DomainConfig>,
    discover_domains: Option<bool>,
    concurrency: Option<usize>,
    request_timeout: Option<Duration>,
}

impl ExporterConfigBuilder {
    pub fn listen_address(mut self, address: impl Into<String>) -> Self {
        self.listen_address = Some(address.into());
        self
    }

    pub fn metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn credentials(mut self, public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        self.credentials.public_key = public_key.into();
        self.credentials.private_key = private_key.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.credentials.base_url = base_url.into();
        self
    }

    pub fn window(mut self, range: Duration, delay: Duration) -> Self {
        self.window = WindowConfig { range, delay };
        self
    }

    pub fn add_domain(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.domains.push(DomainConfig {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn discover_domains(mut self, discover: bool) -> Self {
        self.discover_domains = Some(discover);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ExporterConfig {
        ExporterConfig {
            listen_address: self.listen_address.unwrap_or_else(default_listen_address),
            metrics_path: self.metrics_path.unwrap_or_else(default_metrics_path),
            project_id: self.project_id.unwrap_or_default(),
            credentials: self.credentials,
            window: self.window,
            domains: self.domains,
            discover_domains: self.discover_domains.unwrap_or_else(default_discover_domains),
            concurrency: self.concurrency.unwrap_or_else(default_concurrency),
            request_timeout: self.request_timeout.unwrap_or_else(default_request_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ExporterConfig::builder()
            .project_id("org-abc")
            .window(Duration::from_secs(3600), Duration::from_secs(300))
            .add_domain("ucdn-d1", "example.com")
            .build();

        assert_eq!(config.listen_address, "0.0.0.0:9140");
        assert_eq!(config.metrics_path, "/metrics");
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.report_window(), ReportWindow::new(3600, 300));
        assert_eq!(
            config.resources(),
            vec![MonitoredResource::new("ucdn-d1", "example.com")]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(ExporterConfig::builder().build().validate().is_err());

        let no_domains = ExporterConfig::builder()
            .project_id("org-abc")
            .discover_domains(false)
            .build();
        assert!(no_domains.validate().is_err());

        let zero_range = ExporterConfig::builder()
            .project_id("org-abc")
            .window(Duration::ZERO, Duration::from_secs(300))
            .build();
        assert!(zero_range.validate().is_err());

        let duplicate = ExporterConfig::builder()
            .project_id("org-abc")
            .add_domain("ucdn-d1", "a.example.com")
            .add_domain("ucdn-d1", "b.example.com")
            .build();
        assert!(duplicate.validate().unwrap_err().contains("ucdn-d1"));

        let bad_listen = ExporterConfig::builder()
            .project_id("org-abc")
            .listen_address("not-an-address")
            .build();
        assert!(bad_listen.validate().is_err());

        let bad_path = ExporterConfig::builder()
            .project_id("org-abc")
            .metrics_path("stats")
            .build();
        assert!(bad_path.validate().is_err());

        let no_workers = ExporterConfig::builder()
            .project_id("org-abc")
            .concurrency(0)
            .build();
        assert!(no_workers.validate().is_err());
    }

    #[test]
    fn test_metrics_path_cannot_shadow_other_routes() {
        for path in [HEALTH_PATH, "/", "/:domain", "/metrics/*rest"] {
            let config = ExporterConfig::builder()
                .project_id("org-abc")
                .metrics_path(path)
                .build();
            assert!(config.validate().is_err(), "{} should be rejected", path);
        }

        let custom = ExporterConfig::builder()
            .project_id("org-abc")
            .metrics_path("/probe/metrics")
            .build();
        assert!(custom.validate().is_ok());
    }

    #[test]
    fn test_window_span_is_bounded() {
        let huge = ExporterConfig::builder()
            .project_id("org-abc")
            .window(Duration::from_secs(u64::MAX), Duration::from_secs(300))
            .build();
        assert!(huge.validate().unwrap_err().contains("window range"));

        let late = ExporterConfig::builder()
            .project_id("org-abc")
            .window(Duration::from_secs(600), MAX_WINDOW_SPAN + Duration::from_secs(1))
            .build();
        assert!(late.validate().unwrap_err().contains("window delay"));

        let edge = ExporterConfig::builder()
            .project_id("org-abc")
            .window(MAX_WINDOW_SPAN, MAX_WINDOW_SPAN)
            .build();
        assert!(edge.validate().is_ok());
        assert_eq!(edge.report_window().range_seconds, 90 * 24 * 3600);
    }

    #[test]
    fn test_report_window_saturates() {
        let window = WindowConfig {
            range: Duration::from_secs(u64::MAX),
            delay: Duration::ZERO,
        };
        assert_eq!(window.to_report_window().range_seconds, i64::MAX);
    }

    #[test]
    fn test_override_credentials() {
        let mut config = ExporterConfig::builder()
            .project_id("org-abc")
            .credentials("file-public", "file-private")
            .build();

        config.override_credentials(Some("env-public".to_string()), Some(String::new()));
        assert_eq!(config.credentials.public_key, "env-public");
        assert_eq!(config.credentials.private_key, "file-private");
        assert!(config.credentials.is_complete());

        let client = config.client_config();
        assert_eq!(client.public_key, "env-public");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }
}
