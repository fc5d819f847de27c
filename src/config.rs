use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for an audit run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Maximum number of pages processed concurrently
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Timeout for the non-following link status request
    #[serde(default = "default_link_timeout_secs")]
    pub link_timeout_secs: u64,

    /// Timeout for every other request (sitemaps, pages, image HEADs)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Stop the website crawl after this many pages (no cap when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,

    /// How deep nested sitemap indexes are followed
    #[serde(default = "default_max_sitemap_depth")]
    pub max_sitemap_depth: usize,

    /// Images with a declared size above this many bytes are reported
    #[serde(default = "default_oversized_image_bytes")]
    pub oversized_image_bytes: u64,

    /// Titles shorter than this many characters are reported
    #[serde(default = "default_short_title_chars")]
    pub short_title_chars: usize,

    /// Descriptions shorter than this many characters are reported
    #[serde(default = "default_short_description_chars")]
    pub short_description_chars: usize,

    /// Regex patterns a discovered URL must match (any of them)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns that drop a discovered URL
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_link_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("seo-crawl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_sitemap_depth() -> usize {
    8
}

fn default_oversized_image_bytes() -> u64 {
    100 * 1024
}

fn default_short_title_chars() -> usize {
    30
}

fn default_short_description_chars() -> usize {
    50
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            link_timeout_secs: default_link_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            max_pages: None,
            max_sitemap_depth: default_max_sitemap_depth(),
            oversized_image_bytes: default_oversized_image_bytes(),
            short_title_chars: default_short_title_chars(),
            short_description_chars: default_short_description_chars(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl AuditConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(AuditError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.link_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(AuditError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn link_timeout(&self) -> Duration {
        Duration::from_secs(self.link_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = AuditConfig::from_json("{}").unwrap();
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.link_timeout_secs, 5);
        assert_eq!(config.oversized_image_bytes, 102_400);
        assert_eq!(config.short_title_chars, 30);
        assert_eq!(config.short_description_chars, 50);
        assert!(config.max_pages.is_none());
        assert!(config.user_agent.starts_with("seo-crawl/"));
    }

    #[test]
    fn test_overrides() {
        let config =
            AuditConfig::from_json(r#"{"max_concurrency": 8, "max_pages": 200}"#).unwrap();
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.max_pages, Some(200));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let err = AuditConfig::from_json(r#"{"max_concurrency": 0}"#).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }
}
