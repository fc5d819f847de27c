//! Sitemap discovery.
//!
//! Reads sitemap indexes and leaf sitemaps, following nested indexes down to
//! the page URLs they list. A node that cannot be fetched or parsed is logged
//! and contributes nothing; it never fails the surrounding discovery.

use crate::error::Result;
use crate::fetch::fetch_text;
use crate::filter::is_tag_page;
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};

/// `<loc>` values with these endings are not followed or listed
const EXCLUDED_EXTENSIONS: [&str; 9] = [
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".css", ".js", ".pdf", ".zip",
];

/// The `<loc>` values of one sitemap document, grouped by their parent element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// `<sitemap><loc>` values (child sitemaps of an index)
    pub sitemaps: Vec<String>,
    /// `<url><loc>` values (pages of a leaf sitemap)
    pub urls: Vec<String>,
    /// Every `<loc>` in the document, namespaced ones such as `image:loc` included
    pub locs: Vec<String>,
}

impl SitemapDocument {
    pub fn is_index(&self) -> bool {
        !self.sitemaps.is_empty()
    }
}

/// Pages and tag pages found below a sitemap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDiscovery {
    pub pages: Vec<String>,
    pub tag_pages: Vec<String>,
}

/// Parse sitemap XML into its `<loc>` values
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = SitemapDocument::default();
    let mut elements: Vec<String> = Vec::new();
    let mut loc_text: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "loc" {
                    loc_text = Some(String::new());
                }
                elements.push(name);
            }
            Event::Text(e) => {
                if let Some(text) = loc_text.as_mut() {
                    text.push_str(&e.unescape().map_err(quick_xml::Error::from)?);
                }
            }
            Event::CData(e) => {
                if let Some(text) = loc_text.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let name = elements.pop().unwrap_or_default();
                if name == "loc" {
                    let loc = loc_text.take().unwrap_or_default().trim().to_string();
                    if !loc.is_empty() {
                        match elements.last().map(String::as_str) {
                            Some("sitemap") => document.sitemaps.push(loc.clone()),
                            Some("url") => document.urls.push(loc.clone()),
                            _ => {}
                        }
                        document.locs.push(loc);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(document)
}

fn is_excluded(url: &str) -> bool {
    EXCLUDED_EXTENSIONS.iter().any(|ext| url.ends_with(ext))
}

fn without_excluded(urls: Vec<String>) -> Vec<String> {
    urls.into_iter().filter(|url| !is_excluded(url)).collect()
}

/// Fetches sitemap documents over HTTP
#[derive(Debug, Clone)]
pub struct SitemapReader {
    client: Client,
    max_depth: usize,
}

impl SitemapReader {
    pub fn new(client: Client, max_depth: usize) -> Self {
        Self { client, max_depth }
    }

    /// Child sitemaps of an index, or the page URLs of a leaf sitemap
    pub async fn fetch_sitemap_index(&self, url: &str) -> Vec<String> {
        let Some(document) = self.fetch_document(url).await else {
            return Vec::new();
        };

        if document.is_index() {
            without_excluded(document.sitemaps)
        } else {
            without_excluded(document.urls)
        }
    }

    /// Every `<loc>` of a sitemap, unfiltered
    pub async fn fetch_leaf_urls(&self, url: &str) -> Vec<String> {
        self.fetch_document(url)
            .await
            .map(|document| document.locs)
            .unwrap_or_default()
    }

    /// Tag pages listed anywhere below a sitemap
    pub async fn fetch_tag_pages(&self, url: &str) -> Vec<String> {
        let tag_pages = self.discover(url).await.tag_pages;
        if tag_pages.is_empty() {
            ::log::info!("No tag pages found below {}", url);
        }
        tag_pages
    }

    /// Walk a sitemap tree, collecting page URLs from its leaves and tag pages from every node.
    ///
    /// Each sitemap is fetched at most once, so cyclic trees terminate; indexes
    /// nested deeper than the configured depth are not followed.
    pub async fn discover(&self, url: &str) -> SitemapDiscovery {
        let mut discovery = SitemapDiscovery::default();
        let mut visited = HashSet::new();
        let mut pending = VecDeque::from([(url.to_string(), 0usize)]);

        while let Some((sitemap_url, depth)) = pending.pop_front() {
            if !visited.insert(sitemap_url.clone()) {
                ::log::debug!("Skipping already read sitemap: {}", sitemap_url);
                continue;
            }

            let Some(document) = self.fetch_document(&sitemap_url).await else {
                continue;
            };

            discovery
                .tag_pages
                .extend(document.urls.iter().filter(|url| is_tag_page(url)).cloned());

            if document.is_index() {
                if depth >= self.max_depth {
                    ::log::warn!(
                        "Sitemap index {} is nested deeper than {}; not following its children",
                        sitemap_url,
                        self.max_depth
                    );
                    continue;
                }
                let children = without_excluded(document.sitemaps);
                ::log::debug!("Sitemap index {} lists {} sitemaps", sitemap_url, children.len());
                pending.extend(children.into_iter().map(|child| (child, depth + 1)));
            } else {
                ::log::debug!("Sitemap {} lists {} locations", sitemap_url, document.locs.len());
                discovery.pages.extend(document.locs);
            }
        }

        ::log::info!(
            "Sitemap discovery from {} found {} pages and {} tag pages",
            url,
            discovery.pages.len(),
            discovery.tag_pages.len()
        );
        discovery
    }

    async fn fetch_document(&self, url: &str) -> Option<SitemapDocument> {
        let result = match fetch_text(&self.client, url).await {
            Ok(xml) => parse_sitemap(&xml),
            Err(e) => Err(e),
        };

        match result {
            Ok(document) => Some(document),
            Err(e) => {
                ::log::warn!("Error reading sitemap {}: {}", url, e);
                None
            }
        }
    }
}
