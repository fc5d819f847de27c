use crate::filter::normalize_url;
use reqwest::Client;
use reqwest::header::LOCATION;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use url::Url;

/// Outcome of requesting a page without following redirects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LinkStatus {
    Ok,
    Redirect(u16),
    NotFound,
    Broken,
}

impl LinkStatus {
    /// Only `Ok` pages go on to extraction
    pub fn is_ok(&self) -> bool {
        matches!(self, LinkStatus::Ok)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Ok => write!(f, "200_ok"),
            LinkStatus::Redirect(code) => write!(f, "redirect_{code}"),
            LinkStatus::NotFound => write!(f, "404"),
            LinkStatus::Broken => write!(f, "broken"),
        }
    }
}

impl FromStr for LinkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "200_ok" => Ok(LinkStatus::Ok),
            "404" => Ok(LinkStatus::NotFound),
            "broken" => Ok(LinkStatus::Broken),
            other => other
                .strip_prefix("redirect_")
                .and_then(|code| code.parse().ok())
                .map(LinkStatus::Redirect)
                .ok_or_else(|| format!("unknown link status '{other}'")),
        }
    }
}

impl From<LinkStatus> for String {
    fn from(status: LinkStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for LinkStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Classify a non-following response for the (normalized) URL that was requested.
///
/// A 301/302 whose target only differs by a trailing slash (or fragment)
/// points at the same resource and counts as `Ok`.
pub fn classify_response(requested: &str, status: u16, location: Option<&str>) -> LinkStatus {
    match status {
        301 | 302 => {
            let target = location.unwrap_or_default().trim();
            if target.is_empty() {
                return LinkStatus::Redirect(status);
            }
            let target = Url::parse(requested)
                .and_then(|base| base.join(target))
                .map(|resolved| resolved.to_string())
                .unwrap_or_else(|_| target.to_string());

            if normalize_url(&target, false) == requested || normalize_url(&target, true) == requested {
                LinkStatus::Ok
            } else {
                LinkStatus::Redirect(status)
            }
        }
        200 => LinkStatus::Ok,
        404 => LinkStatus::NotFound,
        _ => LinkStatus::Broken,
    }
}

/// Memoized link statuses keyed by normalized URL.
///
/// Each key owns a `OnceCell`, so concurrent lookups of the same URL share a
/// single in-flight request. Entries never expire; the owner decides how long
/// the cache lives (one per run, or shared across runs).
#[derive(Debug, Default)]
pub struct LinkStatusCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<LinkStatus>>>>,
}

impl LinkStatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached status of a URL, if it has been resolved
    pub fn get(&self, url: &str) -> Option<LinkStatus> {
        let key = normalize_url(url, false);
        self.lock().get(&key).and_then(|cell| cell.get().copied())
    }

    /// Number of resolved URLs
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every cached status
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn slot(&self, key: &str) -> Arc<OnceCell<LinkStatus>> {
        Arc::clone(self.lock().entry(key.to_string()).or_default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<OnceCell<LinkStatus>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolves link statuses through a shared [`LinkStatusCache`]
#[derive(Debug, Clone)]
pub struct LinkStatusResolver {
    client: Client,
    cache: Arc<LinkStatusCache>,
}

impl LinkStatusResolver {
    /// `client` must not follow redirects
    pub fn new(client: Client, cache: Arc<LinkStatusCache>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &Arc<LinkStatusCache> {
        &self.cache
    }

    /// Status of a URL; requested at most once per normalized URL for the cache's lifetime
    pub async fn resolve(&self, url: &str) -> LinkStatus {
        let key = normalize_url(url, false);
        let slot = self.cache.slot(&key);
        if let Some(status) = slot.get() {
            ::log::trace!("Link status cache hit for {}: {}", key, status);
            return *status;
        }

        *slot.get_or_init(|| self.request(&key)).await
    }

    async fn request(&self, url: &str) -> LinkStatus {
        let status = match self.client.get(url).send().await {
            Ok(response) => {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok());
                classify_response(url, response.status().as_u16(), location)
            }
            Err(e) => {
                ::log::debug!("Link check failed for {}: {}", url, e);
                LinkStatus::Broken
            }
        };

        ::log::debug!("Link status {} -> {}", url, status);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use crate::fetch::HttpClients;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver() -> LinkStatusResolver {
        let clients = HttpClients::new(&AuditConfig::default()).unwrap();
        LinkStatusResolver::new(clients.links, Arc::new(LinkStatusCache::new()))
    }

    #[test]
    fn test_classify_plain_statuses() {
        let url = "https://example.com/a";
        assert_eq!(classify_response(url, 200, None), LinkStatus::Ok);
        assert_eq!(classify_response(url, 404, None), LinkStatus::NotFound);
        assert_eq!(classify_response(url, 500, None), LinkStatus::Broken);
        assert_eq!(classify_response(url, 410, None), LinkStatus::Broken);
        assert_eq!(classify_response(url, 307, None), LinkStatus::Broken);
    }

    #[test]
    fn test_slash_only_redirect_is_ok() {
        let url = "https://example.com/a";
        assert_eq!(
            classify_response(url, 301, Some("https://example.com/a/")),
            LinkStatus::Ok
        );
        assert_eq!(classify_response(url, 302, Some("/a/")), LinkStatus::Ok);
        assert_eq!(
            classify_response(url, 301, Some("https://example.com/b")),
            LinkStatus::Redirect(301)
        );
        assert_eq!(classify_response(url, 302, None), LinkStatus::Redirect(302));
    }

    #[test]
    fn test_status_labels_round_trip_through_strings() {
        for status in [
            LinkStatus::Ok,
            LinkStatus::Redirect(302),
            LinkStatus::NotFound,
            LinkStatus::Broken,
        ] {
            assert_eq!(status.to_string().parse::<LinkStatus>().unwrap(), status);
        }
        assert!("teapot".parse::<LinkStatus>().is_err());
    }

    #[tokio::test]
    async fn test_resolve_classifies_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/moved"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", "https://elsewhere.example/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slash"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/slash/"))
            .mount(&server)
            .await;

        let resolver = resolver();
        let base = server.uri();
        assert_eq!(resolver.resolve(&format!("{base}/ok")).await, LinkStatus::Ok);
        assert_eq!(resolver.resolve(&format!("{base}/missing")).await, LinkStatus::NotFound);
        assert_eq!(
            resolver.resolve(&format!("{base}/moved")).await,
            LinkStatus::Redirect(301)
        );
        assert_eq!(resolver.resolve(&format!("{base}/slash")).await, LinkStatus::Ok);
    }

    #[tokio::test]
    async fn test_transport_error_is_broken() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("http://127.0.0.1:1/nothing").await, LinkStatus::Broken);
    }

    #[tokio::test]
    async fn test_resolve_requests_each_normalized_url_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = resolver();
        let base = server.uri();
        assert_eq!(resolver.resolve(&format!("{base}/page")).await, LinkStatus::Ok);
        assert_eq!(resolver.resolve(&format!("{base}/page/")).await, LinkStatus::Ok);
        assert_eq!(resolver.resolve(&format!("{base}/page#reviews")).await, LinkStatus::Ok);

        assert_eq!(resolver.cache().len(), 1);
        assert_eq!(resolver.cache().get(&format!("{base}/page/")), Some(LinkStatus::Ok));
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = resolver();
        let url = format!("{}/slow", server.uri());
        let lookups = (0..8).map(|_| resolver.resolve(&url));
        let statuses = futures::future::join_all(lookups).await;

        assert!(statuses.iter().all(|status| *status == LinkStatus::NotFound));
    }

    #[tokio::test]
    async fn test_shared_cache_skips_second_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shared"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(LinkStatusCache::new());
        let clients = HttpClients::new(&AuditConfig::default()).unwrap();
        let first = LinkStatusResolver::new(clients.links.clone(), Arc::clone(&cache));
        let second = LinkStatusResolver::new(clients.links, Arc::clone(&cache));

        let url = format!("{}/shared", server.uri());
        assert_eq!(first.resolve(&url).await, LinkStatus::Ok);
        assert_eq!(second.resolve(&url).await, LinkStatus::Ok);

        cache.clear();
        assert!(cache.is_empty());
    }
}
