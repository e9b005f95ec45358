use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REPORT_SIZE: usize = 1000;
pub const DEFAULT_ERR_LIMIT: f64 = 1.0;

/// Run configuration
///
/// Read from a JSON object whose keys override the defaults. Keys this crate
/// does not know about are kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of URLs in the report
    #[serde(rename = "REPORT_SIZE")]
    pub report_size: usize,

    #[serde(rename = "REPORT_DIR")]
    pub report_dir: PathBuf,

    #[serde(rename = "LOG_DIR")]
    pub log_dir: PathBuf,

    /// Maximum percentage of unparseable lines
    #[serde(rename = "ERR_LIMIT")]
    pub err_limit: f64,

    /// HTML template replacing the bundled one
    #[serde(rename = "REPORT_TEMPLATE", skip_serializing_if = "Option::is_none")]
    pub report_template: Option<PathBuf>,

    /// Write diagnostics to this file instead of stderr
    #[serde(rename = "LOG_FILE", skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_size: DEFAULT_REPORT_SIZE,
            report_dir: PathBuf::from("./reports"),
            log_dir: PathBuf::from("./log"),
            err_limit: DEFAULT_ERR_LIMIT,
            report_template: None,
            log_file: None,
            extra: Map::new(),
        }
    }
}

impl Config {
    /// Load a config file and merge it onto the defaults
    ///
    /// An empty file means "no overrides". A missing file, malformed JSON, a
    /// non-object document or a known key of the wrong type is an error.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Loading config from: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigFileInvalid(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::parse(&content).map_err(|e| match e {
            Error::ConfigFileInvalid(msg) => {
                Error::ConfigFileInvalid(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config overrides from a JSON string
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_json::from_str(content)
            .map_err(|e| Error::ConfigFileInvalid(e.to_string()))?;

        if !config.err_limit.is_finite() || config.err_limit < 0.0 {
            return Err(Error::ConfigFileInvalid(format!(
                "ERR_LIMIT must be a non-negative percentage, got {}",
                config.err_limit
            )));
        }

        if !config.extra.is_empty() {
            tracing::debug!(
                "Keeping unrecognized config keys: {}",
                config.extra.keys().cloned().collect::<Vec<_>>().join(", ")
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.report_size, 1000);
        assert_eq!(config.report_dir, PathBuf::from("./reports"));
        assert_eq!(config.log_dir, PathBuf::from("./log"));
        assert_eq!(config.err_limit, 1.0);
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::parse(r#"{"REPORT_SIZE": 10, "LOG_DIR": "/var/log/nginx"}"#).unwrap();
        assert_eq!(config.report_size, 10);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/nginx"));
        assert_eq!(config.report_dir, PathBuf::from("./reports"));
        assert_eq!(config.err_limit, 1.0);
    }

    #[test]
    fn test_integer_err_limit() {
        let config = Config::parse(r#"{"ERR_LIMIT": 5}"#).unwrap();
        assert_eq!(config.err_limit, 5.0);
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let config = Config::parse(r#"{"REPORT_SIZE": 3, "OWNER": "ops", "RETRIES": [1, 2]}"#)
            .unwrap();
        assert_eq!(config.extra["OWNER"], "ops");
        assert_eq!(config.extra["RETRIES"], serde_json::json!([1, 2]));
        assert!(!config.extra.contains_key("REPORT_SIZE"));
    }

    #[test]
    fn test_empty_content_uses_defaults() {
        assert_eq!(Config::parse("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_documents() {
        for content in [
            "{not json",
            "[1, 2, 3]",
            r#"{"REPORT_SIZE": "ten"}"#,
            r#"{"REPORT_SIZE": -1}"#,
            r#"{"ERR_LIMIT": -0.5}"#,
        ] {
            assert!(
                matches!(Config::parse(content), Err(Error::ConfigFileInvalid(_))),
                "{} should be rejected",
                content
            );
        }
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"REPORT_DIR": "/srv/reports"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.report_dir, PathBuf::from("/srv/reports"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigFileInvalid(_)));
    }
}
