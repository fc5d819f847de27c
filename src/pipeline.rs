//! The audit pipeline.
//!
//! A run moves through explicit [`Stage`]s: discover URLs (sitemap tree or
//! website crawl), filter and normalize them, resolve each URL's status and
//! extract the pages that answered `200`, then aggregate the per-page
//! outcomes into one [`RunResult`].
//!
//! Failures of a single sitemap node, page or image are logged and dropped
//! inside their stage. Only errors that make the whole run meaningless
//! (invalid input, client construction, a crashed worker) are returned.

use crate::Target;
use crate::config::AuditConfig;
use crate::crawlers::{CrawlOptions, crawl_website};
use crate::duplicates::DuplicateIndex;
use crate::error::{AuditError, Result};
use crate::extract::{PageExtraction, PageExtractor};
use crate::fetch::HttpClients;
use crate::filter::{UrlFilter, is_tag_page};
use crate::parsers::text::is_blank_or_sentinel;
use crate::results::{
    DescriptionRow, HeadingLevel, HeadingRecord, NOT_AVAILABLE, PageRecord, PageStatusRow,
    RunResult, TitleRow,
};
use crate::sitemap::{SitemapDiscovery, SitemapReader};
use crate::status::{LinkStatus, LinkStatusCache, LinkStatusResolver};
use futures::StreamExt;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Stages of an audit run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovering,
    Filtering,
    Processing,
    Aggregating,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discovering => "discovering",
            Stage::Filtering => "filtering",
            Stage::Processing => "processing",
            Stage::Aggregating => "aggregating",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// URLs found by the discovery stage, before filtering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub pages: Vec<String>,
    pub tag_pages: Vec<String>,
}

impl From<SitemapDiscovery> for Discovery {
    fn from(discovery: SitemapDiscovery) -> Self {
        Self {
            pages: discovery.pages,
            tag_pages: discovery.tag_pages,
        }
    }
}

/// The URLs a run will process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkSet {
    /// Normalized page and tag page URLs, deduplicated
    pub urls: BTreeSet<String>,
    /// Normalized tag page URLs, in discovery order
    pub tag_pages: Vec<String>,
}

/// What happened to one URL of the work set
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// The status was not `200_ok`; nothing was extracted
    Skipped { page_url: String, status: LinkStatus },
    /// The status was `200_ok` but the page body could not be fetched
    Unreadable { page_url: String },
    Extracted {
        page_url: String,
        extraction: PageExtraction,
    },
}

/// Run a complete audit of `target`.
///
/// `cache` decides which link statuses are already known; pass a shared cache
/// to reuse classifications across runs.
pub async fn process_url(
    target: &Target,
    config: &AuditConfig,
    cache: Arc<LinkStatusCache>,
) -> Result<RunResult> {
    config.validate()?;
    let input_url = target.url();
    Url::parse(input_url).map_err(|_| AuditError::InvalidUrl(input_url.to_string()))?;

    let clients = HttpClients::new(config)?;
    let filter = UrlFilter::new(&config.include_patterns, &config.exclude_patterns)
        .map_err(|e| AuditError::Config(e.to_string()))?;

    enter(Stage::Discovering, input_url);
    let discovery = discover(target, &clients, config).await;

    enter(Stage::Filtering, input_url);
    let work_set = filter_urls(&filter, &discovery);
    ::log::info!(
        "{} of {} discovered URLs will be audited",
        work_set.urls.len(),
        discovery.pages.len() + discovery.tag_pages.len()
    );

    enter(Stage::Processing, input_url);
    let resolver = LinkStatusResolver::new(clients.links.clone(), cache);
    let extractor = PageExtractor::new(clients.pages.clone(), config.oversized_image_bytes);
    let outcomes = process_pages(&work_set, &resolver, &extractor, config.max_concurrency).await?;

    enter(Stage::Aggregating, input_url);
    let mut builder = RunBuilder::new(input_url, config, work_set.tag_pages);
    for outcome in outcomes {
        builder.record(outcome);
    }
    let result = builder.finish();

    enter(Stage::Done, input_url);
    Ok(result)
}

fn enter(stage: Stage, input_url: &str) {
    ::log::info!("Audit of {}: {}", input_url, stage);
}

/// Find candidate pages and tag pages for a target
pub async fn discover(target: &Target, clients: &HttpClients, config: &AuditConfig) -> Discovery {
    match target {
        Target::Sitemap(url) => SitemapReader::new(clients.pages.clone(), config.max_sitemap_depth)
            .discover(url)
            .await
            .into(),
        Target::Website(url) => {
            let options = CrawlOptions::default().with_max_pages(config.max_pages);
            let pages = crawl_website(&clients.pages, url, &options).await;
            let tag_pages = pages.iter().filter(|url| is_tag_page(url)).cloned().collect();
            Discovery { pages, tag_pages }
        }
    }
}

/// Drop URLs not worth auditing, normalize the rest and merge pages with tag pages
pub fn filter_urls(filter: &UrlFilter, discovery: &Discovery) -> WorkSet {
    let pages = filter.apply(&discovery.pages);

    let mut seen = HashSet::new();
    let tag_pages: Vec<String> = filter
        .apply(&discovery.tag_pages)
        .into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect();

    let urls = pages.into_iter().chain(tag_pages.iter().cloned()).collect();
    WorkSet { urls, tag_pages }
}

/// Resolve and extract every URL of the work set, at most `max_concurrency` at a time.
///
/// Outcomes come back in work-set order.
pub async fn process_pages(
    work_set: &WorkSet,
    resolver: &LinkStatusResolver,
    extractor: &PageExtractor,
    max_concurrency: usize,
) -> Result<Vec<PageOutcome>> {
    let results: Vec<_> = futures::stream::iter(work_set.urls.iter().cloned())
        .map(|page_url| {
            let resolver = resolver.clone();
            let extractor = extractor.clone();
            tokio::spawn(async move { process_page(page_url, &resolver, &extractor).await })
        })
        .buffered(max_concurrency.max(1))
        .collect()
        .await;

    results
        .into_iter()
        .map(|joined| joined.map_err(|e| AuditError::Task(e.to_string())))
        .collect()
}

/// Check a URL's status and extract it when the status is `200_ok`
pub async fn process_page(
    page_url: String,
    resolver: &LinkStatusResolver,
    extractor: &PageExtractor,
) -> PageOutcome {
    let status = resolver.resolve(&page_url).await;
    if !status.is_ok() {
        ::log::debug!("Not extracting {} ({})", page_url, status);
        return PageOutcome::Skipped { page_url, status };
    }

    match extractor.extract(&page_url).await {
        Ok(extraction) => {
            ::log::debug!("Extracted {}", page_url);
            PageOutcome::Extracted {
                page_url,
                extraction,
            }
        }
        Err(e) => {
            ::log::warn!("Error extracting {}: {}", page_url, e);
            PageOutcome::Unreadable { page_url }
        }
    }
}

/// Folds page outcomes into the report tables
struct RunBuilder {
    input_url: String,
    short_title_chars: usize,
    short_description_chars: usize,
    titles: DuplicateIndex,
    descriptions: DuplicateIndex,
    result: RunResult,
}

impl RunBuilder {
    fn new(input_url: &str, config: &AuditConfig, tag_pages: Vec<String>) -> Self {
        Self {
            input_url: input_url.to_string(),
            short_title_chars: config.short_title_chars,
            short_description_chars: config.short_description_chars,
            titles: DuplicateIndex::new(),
            descriptions: DuplicateIndex::new(),
            result: RunResult {
                tag_pages,
                ..RunResult::default()
            },
        }
    }

    fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Skipped { page_url, status } => {
                self.result.page_status.push(PageStatusRow { page_url, status });
            }
            PageOutcome::Unreadable { page_url } => {
                self.result.page_status.push(PageStatusRow {
                    page_url,
                    status: LinkStatus::Ok,
                });
            }
            PageOutcome::Extracted {
                page_url,
                extraction,
            } => self.record_extraction(page_url, extraction),
        }
    }

    fn record_extraction(&mut self, page_url: String, extraction: PageExtraction) {
        self.result.page_status.push(PageStatusRow {
            page_url: page_url.clone(),
            status: LinkStatus::Ok,
        });

        let title = self.record_title(&page_url, extraction.meta.title);
        let description = self.record_description(&page_url, extraction.meta.description);
        self.result.meta_data.push(PageRecord {
            input_url: self.input_url.clone(),
            page_url: page_url.clone(),
            title,
            description,
            lang: extraction.meta.lang,
        });

        let headings = extraction.headings;
        self.result.headers_h1.extend(
            headings
                .h1
                .into_iter()
                .map(|text| HeadingRecord::new(HeadingLevel::H1, page_url.as_str(), text)),
        );
        self.result.headers_h2.extend(
            headings
                .h2
                .into_iter()
                .map(|text| HeadingRecord::new(HeadingLevel::H2, page_url.as_str(), text)),
        );

        self.result.images_missing_alt.extend(extraction.missing_alt);
        self.result.images_over_100kb.extend(extraction.oversized);
    }

    fn record_title(&mut self, page_url: &str, title: String) -> String {
        if is_blank_or_sentinel(&title, NOT_AVAILABLE) {
            self.result.meta_titles_missing.push(TitleRow {
                page_url: page_url.to_string(),
                title: NOT_AVAILABLE.to_string(),
            });
            return NOT_AVAILABLE.to_string();
        }

        let row = TitleRow {
            page_url: page_url.to_string(),
            title: title.clone(),
        };
        if title.chars().count() < self.short_title_chars {
            self.result.meta_titles_below_30.push(row.clone());
        }
        self.titles.insert(&title, page_url);
        self.result.meta_titles_all.push(row);
        title
    }

    fn record_description(&mut self, page_url: &str, description: String) -> String {
        if is_blank_or_sentinel(&description, NOT_AVAILABLE) {
            self.result.meta_descriptions_missing.push(DescriptionRow {
                page_url: page_url.to_string(),
                description: NOT_AVAILABLE.to_string(),
            });
            return NOT_AVAILABLE.to_string();
        }

        let row = DescriptionRow {
            page_url: page_url.to_string(),
            description: description.clone(),
        };
        if description.chars().count() < self.short_description_chars {
            self.result.meta_descriptions_below_50.push(row.clone());
        }
        self.descriptions.insert(&description, page_url);
        self.result.meta_descriptions_all.push(row);
        description
    }

    fn finish(mut self) -> RunResult {
        self.result.meta_titles_duplicate = self
            .titles
            .duplicates()
            .into_iter()
            .map(|(title, page_url)| TitleRow { page_url, title })
            .collect();
        self.result.meta_descriptions_duplicate = self
            .descriptions
            .duplicates()
            .into_iter()
            .map(|(description, page_url)| DescriptionRow {
                page_url,
                description,
            })
            .collect();

        ::log::info!(
            "Aggregated {} pages: {} duplicate title rows, {} duplicate description rows",
            self.result.meta_data.len(),
            self.result.meta_titles_duplicate.len(),
            self.result.meta_descriptions_duplicate.len()
        );
        self.result
    }
}
