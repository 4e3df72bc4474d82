use crate::{
    reduce::{integer_mean, mean_rounded, pass_through, Reduced},
    schema::{MetricId, SchemaRegistry},
    sink::MetricSink,
};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use ucdn_core::{DynDataSource, MonitoredResource, ReportWindow, Result, StatQuery};

/// Reduced values of one resource, in catalog order.
#[derive(Debug)]
pub struct ResourceSnapshot {
    pub resource: MonitoredResource,
    pub outcome: Result<Vec<(MetricId, Reduced)>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceError {
    pub resource_id: String,
    pub display_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeOutcome {
    Complete,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub resources_total: usize,
    pub resources_failed: usize,
    pub observations: usize,
    pub empty_series: usize,
    pub errors: Vec<ResourceError>,
    #[serde(with = "ucdn_core::duration")]
    pub duration: Duration,
}

impl ScrapeReport {
    fn new(resources_total: usize) -> Self {
        Self {
            resources_total,
            resources_failed: 0,
            observations: 0,
            empty_series: 0,
            errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn outcome(&self) -> ScrapeOutcome {
        if self.resources_failed == 0 {
            ScrapeOutcome::Complete
        } else if self.resources_failed < self.resources_total {
            ScrapeOutcome::Partial
        } else {
            ScrapeOutcome::Failed
        }
    }

    fn record_failure(&mut self, resource: &MonitoredResource, message: String) {
        self.resources_failed += 1;
        self.errors.push(ResourceError {
            resource_id: resource.resource_id.clone(),
            display_name: resource.display_name.clone(),
            message,
        });
    }
}

/// Fetches, reduces and emits the catalog for every monitored resource.
pub struct ScrapeAggregator {
    schema: Arc<SchemaRegistry>,
    source: DynDataSource,
    resources: Vec<MonitoredResource>,
    project_id: String,
    window: ReportWindow,
    concurrency: usize,
}

impl ScrapeAggregator {
    pub fn new(
        schema: Arc<SchemaRegistry>,
        source: DynDataSource,
        resources: Vec<MonitoredResource>,
        project_id: impl Into<String>,
        window: ReportWindow,
    ) -> Self {
        Self {
            schema,
            source,
            resources,
            project_id: project_id.into(),
            window,
            concurrency: 1,
        }
    }

    /// Number of resources fetched at the same time. `1` keeps the scrape
    /// strictly sequential.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn resources(&self) -> &[MonitoredResource] {
        &self.resources
    }

    /// One full fetch-reduce-emit cycle.
    ///
    /// Resource failures are recorded in the report and never stop the other
    /// resources; only a sink that rejects the catalog fails the scrape.
    pub async fn scrape<S>(&self, sink: &mut S) -> Result<ScrapeReport>
    where
        S: MetricSink + ?Sized,
    {
        let start = Instant::now();
        info!("Starting scrape of {} resources", self.resources.len());

        let snapshots = self.collect().await;

        sink.describe(self.schema.descriptors())?;
        let mut report = self.emit(snapshots, sink);
        report.duration = start.elapsed();

        info!(
            "Scrape finished in {:?}: {} observations, {} failed resources, {} empty series",
            report.duration, report.observations, report.resources_failed, report.empty_series
        );

        Ok(report)
    }

    pub async fn collect(&self) -> Vec<ResourceSnapshot> {
        // Boxed up front: the scrape future must stay `Send`.
        let pending: Vec<BoxFuture<'_, ResourceSnapshot>> = self
            .resources
            .iter()
            .map(|resource| self.collect_resource(resource).boxed())
            .collect();

        stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await
    }

    pub fn emit<S>(&self, snapshots: Vec<ResourceSnapshot>, sink: &mut S) -> ScrapeReport
    where
        S: MetricSink + ?Sized,
    {
        let mut report = ScrapeReport::new(snapshots.len());

        for snapshot in snapshots {
            let resource = snapshot.resource;
            let values = match snapshot.outcome {
                Ok(values) => values,
                Err(e) => {
                    if e.is_fetch() {
                        warn!("Skipping {}, upstream fetch failed: {}", resource.description(), e);
                    } else {
                        error!("Skipping {}, reduction failed: {}", resource.description(), e);
                    }
                    report.record_failure(&resource, e.to_string());
                    continue;
                }
            };

            let mut batch = Vec::with_capacity(values.len());
            for (id, reduced) in values {
                let descriptor = self.schema.descriptor(id);
                match reduced {
                    Reduced::Value(value) => batch.push((descriptor, value)),
                    Reduced::NoData => {
                        warn!(
                            "No data points for {} on {}, observation omitted",
                            descriptor.fq_name,
                            resource.description()
                        );
                        report.empty_series += 1;
                    }
                }
            }

            match sink.observe_resource(&[resource.display_name.as_str()], &batch) {
                Ok(()) => report.observations += batch.len(),
                Err(e) => {
                    warn!("Sink rejected {}: {}", resource.description(), e);
                    report.record_failure(&resource, e.to_string());
                }
            }
        }

        report
    }

    async fn collect_resource(&self, resource: &MonitoredResource) -> ResourceSnapshot {
        debug!("Collecting {}", resource.description());
        ResourceSnapshot {
            resource: resource.clone(),
            outcome: self.reduce_resource(resource).await,
        }
    }

    async fn reduce_resource(&self, resource: &MonitoredResource) -> Result<Vec<(MetricId, Reduced)>> {
        let query = StatQuery::new(resource, self.project_id.clone(), self.window);
        let name = |id: MetricId| self.schema.descriptor(id).fq_name.as_str();

        let hit_rate = self.source.fetch_hit_rate(&query).await?;
        let request_hit_rate = mean_rounded(
            name(MetricId::RequestHitRate),
            hit_rate.iter().map(|p| p.request_hit_rate),
        )?;
        let flow_hit_rate = mean_rounded(
            name(MetricId::FlowHitRate),
            hit_rate.iter().map(|p| p.flow_hit_rate),
        )?;

        let bandwidth = self.source.fetch_bandwidth(&query).await?;
        let bandwidth = mean_rounded(
            name(MetricId::Bandwidth),
            bandwidth.iter().map(|p| p.cdn_bandwidth),
        )?;

        let codes = self.source.fetch_origin_http_codes(&query).await?;
        let http_4xx = integer_mean(
            name(MetricId::OriginHttp4xx),
            codes.iter().map(|p| p.http_4xx.total),
        )?;
        let http_5xx = integer_mean(
            name(MetricId::OriginHttp5xx),
            codes.iter().map(|p| p.http_5xx.total),
        )?;

        let requests = self.source.fetch_origin_requests(&query).await?;
        let requests = mean_rounded(
            name(MetricId::ResourceRequest),
            requests.iter().map(|p| p.cdn_request),
        )?;

        let p95 = self.source.fetch_bandwidth_95(&query).await?;
        let p95 = pass_through(name(MetricId::Bandwidth95), p95.cdn_bandwidth)?;

        Ok(vec![
            (MetricId::RequestHitRate, request_hit_rate),
            (MetricId::FlowHitRate, flow_hit_rate),
            (MetricId::Bandwidth, bandwidth),
            (MetricId::OriginHttp4xx, http_4xx),
            (MetricId::Bandwidth95, p95),
            (MetricId::OriginHttp5xx, http_5xx),
            (MetricId::ResourceRequest, requests),
        ])
    }
}
