pub mod config;
pub mod crawlers;
pub mod duplicates;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod parsers;
pub mod pipeline;
pub mod results;
pub mod sitemap;
pub mod status;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AuditConfig;
pub use error::AuditError;
pub use results::RunResult;
pub use status::{LinkStatus, LinkStatusCache};

use std::sync::Arc;

/// What an audit starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A sitemap or sitemap index URL
    Sitemap(String),
    /// The root URL of a site to crawl
    Website(String),
}

impl Target {
    pub fn url(&self) -> &str {
        match self {
            Target::Sitemap(url) | Target::Website(url) => url,
        }
    }
}

/// Main builder for an audit run
pub struct Audit {
    target: Target,
    config: AuditConfig,
    link_cache: Option<Arc<LinkStatusCache>>,
}

impl Audit {
    /// Create a new Audit builder for the given target
    pub fn new(target: Target) -> Self {
        Self {
            target,
            config: AuditConfig::default(),
            link_cache: None,
        }
    }

    /// Set the maximum number of pages processed concurrently
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Stop the website crawl after this many pages
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = Some(max_pages);
        self
    }

    pub fn with_config(mut self, config: AuditConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self, AuditError> {
        let config = AuditConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self, AuditError> {
        let config = AuditConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    /// Share a link status cache with other runs.
    ///
    /// Without one, every run starts from an empty cache.
    pub fn with_link_cache(mut self, cache: Arc<LinkStatusCache>) -> Self {
        self.link_cache = Some(cache);
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run the audit to completion
    pub async fn run(self) -> Result<RunResult, AuditError> {
        let cache = self.link_cache.unwrap_or_default();
        pipeline::process_url(&self.target, &self.config, cache).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_config() {
        let audit = Audit::new(Target::Website("https://example.com".to_string()))
            .with_config_str(r#"{"max_concurrency": 8, "short_title_chars": 40}"#)
            .unwrap()
            .with_max_pages(25);

        assert_eq!(audit.config().max_concurrency, 8);
        assert_eq!(audit.config().short_title_chars, 40);
        assert_eq!(audit.config().max_pages, Some(25));
        assert_eq!(audit.config().short_description_chars, 50);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Audit::new(Target::Sitemap("https://example.com/sitemap.xml".to_string()))
            .with_config_str(r#"{"max_concurrency": 0}"#);
        assert!(matches!(result, Err(AuditError::Config(_))));
    }

    #[tokio::test]
    async fn test_zero_concurrency_fails_the_run() {
        let result = Audit::new(Target::Website("https://example.com".to_string()))
            .with_max_concurrency(0)
            .run()
            .await;
        assert!(matches!(result, Err(AuditError::Config(_))));
    }

    #[test]
    fn test_target_url() {
        let target = Target::Sitemap("https://example.com/sitemap.xml".to_string());
        assert_eq!(target.url(), "https://example.com/sitemap.xml");
    }
}
