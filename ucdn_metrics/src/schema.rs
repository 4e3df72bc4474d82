//! Fixed catalog of exported metrics.
//!
//! The catalog is built once when the exporter starts and shared read-only by
//! every scrape; only observation values change between scrapes.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NAMESPACE: &str = "uCloud";
pub const SUBSYSTEM: &str = "cdn";

/// Single label carried by every metric: the domain's display name.
pub const RESOURCE_LABEL: &str = "instanceId";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricId {
    RequestHitRate,
    FlowHitRate,
    Bandwidth,
    OriginHttp4xx,
    Bandwidth95,
    OriginHttp5xx,
    ResourceRequest,
}

impl MetricId {
    pub const ALL: [MetricId; 7] = [
        MetricId::RequestHitRate,
        MetricId::FlowHitRate,
        MetricId::Bandwidth,
        MetricId::OriginHttp4xx,
        MetricId::Bandwidth95,
        MetricId::OriginHttp5xx,
        MetricId::ResourceRequest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetricId::RequestHitRate => "request_hit_rate",
            MetricId::FlowHitRate => "flow_hit_rate",
            MetricId::Bandwidth => "band_width",
            MetricId::OriginHttp4xx => "http_code_4XX",
            MetricId::Bandwidth95 => "95_band_width",
            MetricId::OriginHttp5xx => "http_code_5XX",
            MetricId::ResourceRequest => "resource_request",
        }
    }

    /// HELP text; kept identical to what existing dashboards already scrape.
    pub fn help(self) -> &'static str {
        match self {
            MetricId::RequestHitRate => "总请求命中率(%)",
            MetricId::FlowHitRate => "总流量命中率(%)",
            MetricId::Bandwidth => "域名带宽(Mbps)",
            MetricId::OriginHttp4xx => "http4XX请求数(Count)",
            MetricId::Bandwidth95 => "95带宽数据(Mbps)",
            MetricId::OriginHttp5xx => "http5XX请求数(Count)",
            MetricId::ResourceRequest => "cdn回源请求数",
        }
    }

    fn index(self) -> usize {
        match self {
            MetricId::RequestHitRate => 0,
            MetricId::FlowHitRate => 1,
            MetricId::Bandwidth => 2,
            MetricId::OriginHttp4xx => 3,
            MetricId::Bandwidth95 => 4,
            MetricId::OriginHttp5xx => 5,
            MetricId::ResourceRequest => 6,
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub fq_name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

/// Join the non-empty name parts with `_`.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

pub fn define_metric(
    namespace: &str,
    subsystem: &str,
    name: &str,
    help: &str,
    label_names: &[&str],
) -> MetricDescriptor {
    MetricDescriptor {
        fq_name: build_fq_name(namespace, subsystem, name),
        help: help.to_string(),
        label_names: label_names.iter().map(|l| l.to_string()).collect(),
    }
}

pub struct SchemaRegistry {
    descriptors: Vec<MetricDescriptor>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::with_namespace(NAMESPACE)
    }

    pub fn with_namespace(namespace: &str) -> Self {
        let descriptors = MetricId::ALL
            .iter()
            .map(|id| define_metric(namespace, SUBSYSTEM, id.name(), id.help(), &[RESOURCE_LABEL]))
            .collect();

        Self { descriptors }
    }

    /// The whole catalog, in declaration order.
    pub fn descriptors(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, id: MetricId) -> &MetricDescriptor {
        &self.descriptors[id.index()]
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fq_name() {
        assert_eq!(build_fq_name("uCloud", "cdn", "band_width"), "uCloud_cdn_band_width");
        assert_eq!(build_fq_name("", "cdn", "band_width"), "cdn_band_width");
        assert_eq!(build_fq_name("uCloud", "", "band_width"), "uCloud_band_width");
        assert_eq!(build_fq_name("uCloud", "cdn", ""), "");
    }

    #[test]
    fn test_catalog() {
        let registry = SchemaRegistry::new();
        assert_eq!(registry.len(), 7);

        let names: Vec<&str> = registry
            .descriptors()
            .iter()
            .map(|d| d.fq_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "uCloud_cdn_request_hit_rate",
                "uCloud_cdn_flow_hit_rate",
                "uCloud_cdn_band_width",
                "uCloud_cdn_http_code_4XX",
                "uCloud_cdn_95_band_width",
                "uCloud_cdn_http_code_5XX",
                "uCloud_cdn_resource_request",
            ]
        );

        for descriptor in registry.descriptors() {
            assert_eq!(descriptor.label_names, vec![RESOURCE_LABEL.to_string()]);
        }
    }

    #[test]
    fn test_help_text() {
        let registry = SchemaRegistry::new();
        assert_eq!(registry.descriptor(MetricId::RequestHitRate).help, "总请求命中率(%)");
        assert_eq!(registry.descriptor(MetricId::Bandwidth95).help, "95带宽数据(Mbps)");
        assert_eq!(registry.descriptor(MetricId::ResourceRequest).help, "cdn回源请求数");
    }

    #[test]
    fn test_descriptor_lookup_matches_id() {
        let registry = SchemaRegistry::new();
        for id in MetricId::ALL {
            assert!(registry.descriptor(id).fq_name.ends_with(id.name()));
        }
    }

    #[test]
    fn test_catalog_is_stable() {
        let a = SchemaRegistry::new();
        let b = SchemaRegistry::new();
        assert_eq!(a.descriptors(), b.descriptors());
        assert_eq!(a.descriptors(), a.descriptors());
    }
}
