use crate::{
    aggregator::ScrapeReport,
    schema::{build_fq_name, MetricDescriptor, NAMESPACE, SUBSYSTEM},
    sink::{check_labels, MetricSink},
};
use ::prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use ucdn_core::{ExporterError, Result};

pub const CONTENT_TYPE: &str = ::prometheus::TEXT_FORMAT;

fn sink_error(e: ::prometheus::Error) -> ExporterError {
    ExporterError::Sink(e.to_string())
}

/// Exporter health gauges published next to the catalog.
struct SelfMetrics {
    scrape_duration: Gauge,
    scrape_errors: Gauge,
    empty_series: Gauge,
    resources: Gauge,
}

impl SelfMetrics {
    fn register(registry: &Registry, namespace: &str) -> Result<Self> {
        let gauge = |name: &str, help: &str| -> Result<Gauge> {
            let fq_name = build_fq_name(namespace, SUBSYSTEM, &format!("exporter_{}", name));
            let gauge = Gauge::with_opts(Opts::new(fq_name, help)).map_err(sink_error)?;
            registry.register(Box::new(gauge.clone())).map_err(sink_error)?;
            Ok(gauge)
        };

        Ok(Self {
            scrape_duration: gauge("scrape_duration_seconds", "Duration of the last scrape in seconds")?,
            scrape_errors: gauge("scrape_errors", "Resources that failed during the last scrape")?,
            empty_series: gauge("empty_series", "Series without data points in the last scrape")?,
            resources: gauge("resources", "Resources covered by the last scrape")?,
        })
    }
}

/// Sink backed by a fresh `prometheus::Registry`, one per scrape.
pub struct PrometheusSink {
    registry: Registry,
    gauges: HashMap<String, GaugeVec>,
    self_metrics: SelfMetrics,
}

impl PrometheusSink {
    pub fn new() -> Result<Self> {
        Self::with_namespace(NAMESPACE)
    }

    pub fn with_namespace(namespace: &str) -> Result<Self> {
        let registry = Registry::new();
        let self_metrics = SelfMetrics::register(&registry, namespace)?;

        #[cfg(target_os = "linux")]
        registry
            .register(Box::new(
                ::prometheus::process_collector::ProcessCollector::for_self(),
            ))
            .map_err(sink_error)?;

        Ok(Self {
            registry,
            gauges: HashMap::new(),
            self_metrics,
        })
    }

    pub fn record_report(&self, report: &ScrapeReport) {
        self.self_metrics
            .scrape_duration
            .set(report.duration.as_secs_f64());
        self.self_metrics
            .scrape_errors
            .set(report.resources_failed as f64);
        self.self_metrics
            .empty_series
            .set(report.empty_series as f64);
        self.self_metrics
            .resources
            .set(report.resources_total as f64);
    }

    /// Prometheus text exposition of everything recorded so far.
    pub fn encode(&self) -> Result<String> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(sink_error)?;
        String::from_utf8(buffer).map_err(|e| ExporterError::Sink(e.to_string()))
    }
}

impl MetricSink for PrometheusSink {
    fn describe(&mut self, descriptors: &[MetricDescriptor]) -> Result<()> {
        for descriptor in descriptors {
            if self.gauges.contains_key(&descriptor.fq_name) {
                continue;
            }

            let labels: Vec<&str> = descriptor.label_names.iter().map(String::as_str).collect();
            let gauge = GaugeVec::new(Opts::new(descriptor.fq_name.clone(), descriptor.help.clone()), &labels)
                .map_err(sink_error)?;
            self.registry
                .register(Box::new(gauge.clone()))
                .map_err(sink_error)?;
            self.gauges.insert(descriptor.fq_name.clone(), gauge);
        }
        Ok(())
    }

    fn observe_resource(&mut self, label_values: &[&str], values: &[(&MetricDescriptor, f64)]) -> Result<()> {
        // Resolve everything before the first write so a bad batch leaves no
        // series behind.
        let mut targets = Vec::with_capacity(values.len());
        for (descriptor, value) in values {
            check_labels(descriptor, label_values)?;
            let gauge = self.gauges.get(&descriptor.fq_name).ok_or_else(|| {
                ExporterError::Sink(format!("{} was observed before being described", descriptor.fq_name))
            })?;
            targets.push((gauge, *value));
        }

        for (gauge, value) in targets {
            gauge
                .get_metric_with_label_values(label_values)
                .map_err(sink_error)?
                .set(value);
        }
        Ok(())
    }
}
