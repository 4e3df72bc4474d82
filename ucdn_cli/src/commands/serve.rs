use super::{build_aggregator, load_config, CredentialArgs};
use crate::server::{self, AppState};
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

pub async fn execute(config_file: PathBuf, listen: Option<String>, credentials: CredentialArgs) -> Result<()> {
    let config = load_config(&config_file, credentials).await?;
    let listen_address = listen.unwrap_or_else(|| config.listen_address.clone());

    info!(
        "Project {}, window {:?} delayed by {:?}",
        config.project_id, config.window.range, config.window.delay
    );

    let aggregator = build_aggregator(&config).await?;
    let state = AppState::new(aggregator, config.metrics_path.clone());

    server::run(state, &listen_address).await
}
