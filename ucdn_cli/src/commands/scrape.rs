use super::{build_aggregator, load_config, CredentialArgs};
use crate::server::scrape_text;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};
use ucdn_metrics::{JsonExporter, MemorySink, ScrapeOutcome, ScrapeReport};

pub async fn execute(config_file: PathBuf, format: String, credentials: CredentialArgs) -> Result<()> {
    let config = load_config(&config_file, credentials).await?;
    let aggregator = build_aggregator(&config).await?;

    let report = match format.as_str() {
        "json" => {
            let mut sink = MemorySink::new();
            let report = aggregator.scrape(&mut sink).await?;
            println!("{}", JsonExporter::to_string(sink.observations(), &report)?);
            report
        }
        "text" => {
            let (report, text) = scrape_text(&aggregator).await?;
            print!("{}", text);
            report
        }
        other => anyhow::bail!("Unsupported output format: {} (use text or json)", other),
    };

    summarize(&report);

    if report.outcome() == ScrapeOutcome::Failed {
        anyhow::bail!("Scrape failed for all {} domains", report.resources_total);
    }
    Ok(())
}

fn summarize(report: &ScrapeReport) {
    for error in &report.errors {
        warn!("{} ({}): {}", error.display_name, error.resource_id, error.message);
    }

    if report.outcome() == ScrapeOutcome::Complete {
        info!(
            "Scraped {} domains in {:?}: {} observations, {} empty series",
            report.resources_total,
            report.duration,
            report.observations,
            report.empty_series
        );
    } else {
        warn!(
            "{} of {} domains failed",
            report.resources_failed, report.resources_total
        );
    }
}
