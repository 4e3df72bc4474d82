use crate::config::{ExporterConfig, ExporterConfigFile};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::debug;

/// On-disk encodings, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            other => Err(anyhow!(
                "Unsupported config extension {:?}, expected .yaml, .yml, .toml or .json",
                other.unwrap_or("")
            )),
        }
    }

    /// Deserialize and validate. TOML keeps everything under `[exporter]`.
    fn parse(self, content: &str) -> Result<ExporterConfig> {
        let config = match self {
            Self::Yaml => serde_yaml::from_str::<ExporterConfig>(content)?,
            Self::Toml => toml::from_str::<ExporterConfigFile>(content)?.exporter,
            Self::Json => serde_json::from_str::<ExporterConfig>(content)?,
        };

        config
            .validate()
            .map_err(|reason| anyhow!("Invalid exporter config: {}", reason))?;
        Ok(config)
    }
}

pub async fn parse_config_from_file(path: impl AsRef<Path>) -> Result<ExporterConfig> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;

    debug!(?format, "Parsing configuration from {}", path.display());
    format.parse(&contents)
}
