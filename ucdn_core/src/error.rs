use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Fetch failed for {action}: {message}")]
    Fetch { action: String, message: String },

    #[error("UCloud API error in {action} (RetCode {code}): {message}")]
    Api {
        action: String,
        code: i64,
        message: String,
    },

    #[error("Non-finite value while reducing {metric}")]
    NonFinite { metric: String },

    #[error("Integer overflow while reducing {metric}")]
    Overflow { metric: String },

    #[error("Label mismatch for {metric}: expected {expected} label values, got {actual}")]
    LabelMismatch {
        metric: String,
        expected: usize,
        actual: usize,
    },

    #[error("Metric sink error: {0}")]
    Sink(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExporterError {
    /// Whether the error came from talking to the upstream API.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            ExporterError::Fetch { .. } | ExporterError::Api { .. } | ExporterError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_classification() {
        let api = ExporterError::Api {
            action: "GetUcdnDomainHitRate".to_string(),
            code: 171,
            message: "Signature VerifyAC Error".to_string(),
        };
        assert!(api.is_fetch());
        assert!(api.to_string().contains("RetCode 171"));

        let reduce = ExporterError::NonFinite {
            metric: "uCloud_cdn_band_width".to_string(),
        };
        assert!(!reduce.is_fetch());
    }
}
