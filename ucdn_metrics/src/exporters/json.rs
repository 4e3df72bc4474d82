use crate::{aggregator::ScrapeReport, sink::ReducedObservation};
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSnapshot {
    pub observations: Vec<ReducedObservation>,
    pub report: ScrapeReport,
}

pub struct JsonExporter;

impl JsonExporter {
    pub fn to_string(observations: &[ReducedObservation], report: &ScrapeReport) -> Result<String> {
        let snapshot = ScrapeSnapshot {
            observations: observations.to_vec(),
            report: report.clone(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}
