pub mod metrics;
pub mod scrape;
pub mod serve;
pub mod validate;

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use ucdn_config::{parse_config_from_file, ExporterConfig};
use ucdn_core::UcdnClient;
use ucdn_metrics::{ScrapeAggregator, SchemaRegistry};

#[derive(Args, Debug, Default)]
pub struct CredentialArgs {
    /// UCloud API public key
    #[arg(long, env = "UCLOUD_PUBLIC_KEY", hide_env_values = true)]
    pub public_key: Option<String>,

    /// UCloud API private key
    #[arg(long, env = "UCLOUD_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
}

/// Parse the config file and merge command line / environment credentials.
pub async fn load_config(path: &Path, credentials: CredentialArgs) -> Result<ExporterConfig> {
    let mut config = parse_config_from_file(path)
        .await
        .with_context(|| format!("Failed to load config {}", path.display()))?;

    config.override_credentials(credentials.public_key, credentials.private_key);
    if !config.credentials.is_complete() {
        anyhow::bail!(
            "UCloud credentials missing: set them in the config file, pass --public-key/--private-key, \
             or export UCLOUD_PUBLIC_KEY/UCLOUD_PRIVATE_KEY"
        );
    }

    Ok(config)
}

/// Client, resource list and aggregator for a loaded config. Domains are
/// discovered once here when the config lists none.
pub async fn build_aggregator(config: &ExporterConfig) -> Result<ScrapeAggregator> {
    let client = UcdnClient::new(config.client_config())?;

    let mut resources = config.resources();
    if resources.is_empty() && config.discover_domains {
        info!("No domains configured, discovering domains of project {}", config.project_id);
        resources = client
            .list_domains(&config.project_id)
            .await
            .context("Domain discovery failed")?;

        if resources.is_empty() {
            warn!("Project {} has no CDN domains, scrapes will be empty", config.project_id);
        }
    }

    info!("Monitoring {} domains", resources.len());

    Ok(ScrapeAggregator::new(
        Arc::new(SchemaRegistry::new()),
        Arc::new(client),
        resources,
        config.project_id.clone(),
        config.report_window(),
    )
    .with_concurrency(config.concurrency))
}
