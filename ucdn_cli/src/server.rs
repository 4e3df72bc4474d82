use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use ucdn_config::HEALTH_PATH;
use ucdn_metrics::{
    exporters::prometheus::CONTENT_TYPE, PrometheusSink, ScrapeAggregator, ScrapeOutcome, ScrapeReport,
};

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<ScrapeAggregator>,
    start_time: Instant,
    metrics_path: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
    resources: usize,
}

impl AppState {
    pub fn new(aggregator: ScrapeAggregator, metrics_path: impl Into<String>) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            start_time: Instant::now(),
            metrics_path: metrics_path.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let metrics_path = state.metrics_path.clone();
    Router::new()
        .route("/", get(landing))
        .route(HEALTH_PATH, get(health_check))
        .route(&metrics_path, get(metrics))
        .with_state(state)
}

pub async fn run(state: AppState, addr: &str) -> anyhow::Result<()> {
    let metrics_path = state.metrics_path.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving UCDN metrics on http://{}{}", listener.local_addr()?, metrics_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// One scrape into a fresh Prometheus registry, rendered as text.
pub async fn scrape_text(aggregator: &ScrapeAggregator) -> ucdn_core::Result<(ScrapeReport, String)> {
    let mut sink = PrometheusSink::new()?;
    let report = aggregator.scrape(&mut sink).await?;
    sink.record_report(&report);
    Ok((report, sink.encode()?))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match scrape_text(&state.aggregator).await {
        Ok((report, _)) if report.outcome() == ScrapeOutcome::Failed => {
            error!("Scrape failed for all {} resources", report.resources_total);
            let diagnostic = report
                .errors
                .iter()
                .map(|e| format!("{} ({}): {}", e.display_name, e.resource_id, e.message))
                .collect::<Vec<_>>()
                .join("\n");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("scrape failed for every resource\n{}\n", diagnostic),
            )
                .into_response()
        }
        Ok((_, body)) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!("Scrape failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("scrape failed: {}\n", e)).into_response()
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        resources: state.aggregator.resources().len(),
    })
}

async fn landing(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html><head><title>UCDN Exporter</title></head>\
         <body><h1>UCDN Exporter</h1><p><a href=\"{0}\">{0}</a></p></body></html>",
        state.metrics_path
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use ucdn_core::{
        Bandwidth95, BandwidthPoint, DataSource, ExporterError, HitRatePoint, HttpCodePoint,
        MonitoredResource, ReportWindow, RequestNumPoint, Result, StatQuery,
    };
    use ucdn_metrics::SchemaRegistry;

    /// Serves data for `d1` only.
    struct OneDomainSource;

    fn check(query: &StatQuery) -> Result<()> {
        if query.resource_id == "d1" {
            Ok(())
        } else {
            Err(ExporterError::Fetch {
                action: "GetUcdnDomainHitRate".to_string(),
                message: "timed out".to_string(),
            })
        }
    }

    #[async_trait]
    impl DataSource for OneDomainSource {
        async fn fetch_hit_rate(&self, query: &StatQuery) -> Result<Vec<HitRatePoint>> {
            check(query)?;
            Ok(vec![
                HitRatePoint { time: 0, request_hit_rate: 90.0, flow_hit_rate: 95.0 },
                HitRatePoint { time: 1, request_hit_rate: 92.0, flow_hit_rate: 97.0 },
            ])
        }

        async fn fetch_bandwidth(&self, query: &StatQuery) -> Result<Vec<BandwidthPoint>> {
            check(query)?;
            Ok(vec![BandwidthPoint { time: 0, cdn_bandwidth: 12.5 }])
        }

        async fn fetch_origin_http_codes(&self, query: &StatQuery) -> Result<Vec<HttpCodePoint>> {
            check(query)?;
            Ok(vec![HttpCodePoint::default()])
        }

        async fn fetch_origin_requests(&self, query: &StatQuery) -> Result<Vec<RequestNumPoint>> {
            check(query)?;
            Ok(Vec::new())
        }

        async fn fetch_bandwidth_95(&self, query: &StatQuery) -> Result<Bandwidth95> {
            check(query)?;
            Ok(Bandwidth95 { time: 0, cdn_bandwidth: 30.0 })
        }
    }

    fn app(resources: Vec<MonitoredResource>) -> Router {
        let aggregator = ScrapeAggregator::new(
            Arc::new(SchemaRegistry::new()),
            Arc::new(OneDomainSource),
            resources,
            "org-test",
            ReportWindow::new(3600, 300),
        );
        router(AppState::new(aggregator, "/metrics"))
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = app(vec![MonitoredResource::new("d1", "example.com")]);
        let (status, body) = fetch(app, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("uCloud_cdn_request_hit_rate{instanceId=\"example.com\"} 91"));
        assert!(body.contains("uCloud_cdn_flow_hit_rate{instanceId=\"example.com\"} 96"));
        assert!(body.contains("uCloud_cdn_95_band_width{instanceId=\"example.com\"} 30"));
        assert!(!body.contains("uCloud_cdn_resource_request{"));
        assert!(body.contains("uCloud_cdn_exporter_empty_series 1"));
    }

    #[tokio::test]
    async fn test_partial_scrape_still_succeeds() {
        let app = app(vec![
            MonitoredResource::new("d1", "example.com"),
            MonitoredResource::new("d2", "slow.example.com"),
        ]);
        let (status, body) = fetch(app, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("uCloud_cdn_exporter_scrape_errors 1"));
        assert!(!body.contains("slow.example.com"));
    }

    #[tokio::test]
    async fn test_failed_scrape_is_unavailable() {
        let app = app(vec![MonitoredResource::new("d2", "slow.example.com")]);
        let (status, body) = fetch(app, "/metrics").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("slow.example.com (d2): Fetch failed"));
    }

    #[tokio::test]
    async fn test_health_and_landing() {
        let router = app(vec![MonitoredResource::new("d1", "example.com")]);

        let (status, body) = fetch(router.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"status\":\"healthy\""));
        assert!(body.contains("\"resources\":1"));

        let (status, body) = fetch(router, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href=\"/metrics\""));
    }
}
