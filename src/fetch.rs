use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, redirect};

/// The two HTTP clients an audit needs
#[derive(Debug, Clone)]
pub struct HttpClients {
    /// Follows redirects; used for sitemaps, crawling, page bodies and image HEADs
    pub pages: Client,
    /// Never follows redirects; used for link status classification
    pub links: Client,
}

impl HttpClients {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        let pages = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .redirect(redirect::Policy::limited(10))
            .build()?;

        let links = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.link_timeout())
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { pages, links })
    }
}

/// GET a URL and return its body, treating non-2xx statuses as errors
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AuditError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

/// HEAD a URL and read its declared `Content-Length`
pub async fn content_length(client: &Client, url: &str) -> Result<Option<u64>> {
    let response = client.head(url).send().await?;
    let length = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    Ok(length)
}
