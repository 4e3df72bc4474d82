//! Serde adapter for human readable durations (`10m`, `1h 30m`, `250ms`).
//!
//! Use as `#[serde(with = "ucdn_core::duration")]`.

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*duration))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(text.trim())
        .map_err(|e| D::Error::custom(format!("invalid duration '{}': {}", text, e)))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Timeout {
        #[serde(with = "crate::duration")]
        after: Duration,
    }

    #[test]
    fn test_duration_serde() {
        let parsed: Timeout = serde_json::from_str(r#"{"after": "1h 30m"}"#).unwrap();
        assert_eq!(parsed.after, Duration::from_secs(5400));

        let text = serde_json::to_string(&Timeout { after: Duration::from_millis(1500) }).unwrap();
        assert_eq!(text, r#"{"after":"1s 500ms"}"#);
    }

    #[test]
    fn test_invalid_duration_names_input() {
        let err = serde_json::from_str::<Timeout>(r#"{"after": "soon"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid duration 'soon'"));
    }
}
