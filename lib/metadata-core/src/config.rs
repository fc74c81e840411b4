//! YAML description of an application's exported services

use crate::{MetadataError, MetadataInfo, Result, ServiceInfo, ServiceUrl};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "METADATA_REPORT_CONFIG";

/// Config file used when neither an argument nor the environment names one
pub const DEFAULT_CONFIG_PATH: &str = "metadata-report.yaml";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Application name
    pub app: String,

    /// Revision already published for these services; treated as reported
    #[serde(default)]
    pub revision: String,

    /// Seconds between rescans; absent or zero runs once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,

    /// Exported service URLs
    #[serde(default)]
    pub services: Vec<String>,
}

impl ReportConfig {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: ReportConfig = serde_yaml::from_str(raw)?;
        if config.app.trim().is_empty() {
            return Err(MetadataError::Config("app must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Interval between rescans, if periodic
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Build metadata from the configured services, skipping unparsable URLs.
    /// A configured revision is marked reported so it is served as is.
    pub fn build_metadata(&self) -> MetadataInfo {
        let mut metadata = MetadataInfo::with_app(self.app.clone());

        for raw in &self.services {
            match ServiceUrl::parse(raw) {
                Ok(url) => metadata.add_service(Some(ServiceInfo::from_url(&url))),
                Err(e) => warn!("Skipping service {}: {}", raw, e),
            }
        }

        if !self.revision.is_empty() {
            metadata.revision = self.revision.clone();
            metadata.mark_reported();
        }

        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
app: user-center
interval_secs: 30
services:
  - "dubbo://127.0.0.1:20000/com.x.Foo?interface=com.x.Foo&methods=bar%2C"
  - "tri://127.0.0.1:50051/com.x.Baz?methods=qux%2C"
  - "::not a url::"
"#;

    #[test]
    fn test_from_yaml() {
        let config = ReportConfig::from_yaml(CONFIG).unwrap();
        assert_eq!(config.app, "user-center");
        assert_eq!(config.revision, "");
        assert_eq!(config.interval(), Some(Duration::from_secs(30)));
        assert_eq!(config.services.len(), 3);
    }

    #[test]
    fn test_zero_interval_runs_once() {
        let config = ReportConfig::from_yaml("app: a\ninterval_secs: 0\n").unwrap();
        assert_eq!(config.interval(), None);
        let config = ReportConfig::from_yaml("app: a\n").unwrap();
        assert_eq!(config.interval(), None);
    }

    #[test]
    fn test_empty_app_rejected() {
        let err = ReportConfig::from_yaml("app: \"\"\n").unwrap_err();
        assert!(matches!(err, MetadataError::Config(_)));
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let err = ReportConfig::from_yaml("app: [unclosed").unwrap_err();
        assert!(matches!(err, MetadataError::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ReportConfig::load("/nonexistent/metadata-report.yaml").unwrap_err();
        assert!(matches!(err, MetadataError::Io(_)));
    }

    #[test]
    fn test_configured_revision_is_reported() {
        let config = ReportConfig::from_yaml(
            "app: a\nrevision: \"12345\"\nservices:\n  - \"dubbo://127.0.0.1:20000/com.x.Foo?methods=bar%2C\"\n",
        )
        .unwrap();
        let mut metadata = config.build_metadata();
        assert!(metadata.has_reported());
        assert_eq!(metadata.cal_and_get_revision(), "12345");
    }

    #[test]
    fn test_missing_revision_is_calculated() {
        let config = ReportConfig::from_yaml(CONFIG).unwrap();
        let mut metadata = config.build_metadata();
        assert!(!metadata.has_reported());
        assert_ne!(metadata.cal_and_get_revision(), "");
    }

    #[test]
    fn test_build_metadata_skips_invalid_urls() {
        let config = ReportConfig::from_yaml(CONFIG).unwrap();
        let metadata = config.build_metadata();
        assert_eq!(metadata.app, "user-center");
        assert_eq!(metadata.service_count(), 2);
        assert!(metadata.get_service("com.x.Foo:dubbo").is_some());
        assert!(metadata.get_service("com.x.Baz:tri").is_some());
    }
}
