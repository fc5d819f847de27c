use crate::fetch::fetch_text;
use crate::filter::normalize_url;
use crate::parsers::html::extract_links;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Limits for a website crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Stop after this many pages have been fetched (no cap when `None`)
    pub max_pages: Option<usize>,
}

impl CrawlOptions {
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Breadth-first crawl of every page reachable from `root_url` under the same prefix.
///
/// Returns the normalized URLs of the pages that were fetched successfully, in
/// visit order. A link is followed only when its normalized form starts with
/// the normalized root, so the scope is a plain string prefix: `/shop` also
/// admits `/shop-old`. Relative links are resolved against the URL taken off
/// the queue, not the URL a redirect ended at. Every URL is fetched at most
/// once; a failed fetch is logged and never retried.
pub async fn crawl_website(client: &Client, root_url: &str, options: &CrawlOptions) -> Vec<String> {
    let root = normalize_url(root_url, false);
    ::log::info!("Starting web crawl for: {}", root);

    let mut discovered: HashSet<String> = HashSet::from([root.clone()]);
    let mut frontier: VecDeque<String> = VecDeque::from([root.clone()]);
    let mut visited: Vec<String> = Vec::new();

    while let Some(url) = frontier.pop_front() {
        if options.max_pages.is_some_and(|max| visited.len() >= max) {
            ::log::info!(
                "Reached the page limit of {} with {} URLs still queued",
                visited.len(),
                frontier.len() + 1
            );
            break;
        }

        let body = match fetch_text(client, &url).await {
            Ok(body) => body,
            Err(e) => {
                ::log::warn!("Failed to crawl {}: {}", url, e);
                continue;
            }
        };
        visited.push(url.clone());

        let Ok(base) = Url::parse(&url) else {
            ::log::warn!("Cannot resolve links of {}", url);
            continue;
        };
        let queued = queue_links(&base, &body, &root, &mut discovered, &mut frontier);
        ::log::debug!("Queued {} new links from {}", queued, url);
    }

    ::log::info!("Web crawl of {} visited {} pages", root, visited.len());
    visited
}

/// Resolve the anchors of a page and queue the in-scope ones not seen before
fn queue_links(
    base: &Url,
    html: &str,
    root: &str,
    discovered: &mut HashSet<String>,
    frontier: &mut VecDeque<String>,
) -> usize {
    let mut queued = 0;
    for link in extract_links(html) {
        let Ok(resolved) = base.join(&link) else {
            ::log::trace!("Ignoring unresolvable link {} on {}", link, base);
            continue;
        };

        let normalized = normalize_url(resolved.as_str(), false);
        if !normalized.starts_with(root) {
            continue;
        }
        if discovered.insert(normalized.clone()) {
            ::log::trace!("Queuing link for crawling: {}", normalized);
            frontier.push_back(normalized);
            queued += 1;
        }
    }
    queued
}
