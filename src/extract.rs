use crate::error::Result;
use crate::fetch::{content_length, fetch_text};
use crate::parsers::html::{self, Headings, ImageTag, PageMeta};
use crate::results::{MissingAltImage, OversizedImage};
use reqwest::Client;

/// What one page contributes to the report
#[derive(Debug, Clone, PartialEq)]
pub struct PageExtraction {
    pub meta: PageMeta,
    pub headings: Headings,
    pub missing_alt: Vec<MissingAltImage>,
    pub oversized: Vec<OversizedImage>,
}

/// Fetches a page once and extracts its SEO signals
#[derive(Debug, Clone)]
pub struct PageExtractor {
    client: Client,
    oversized_image_bytes: u64,
}

impl PageExtractor {
    pub fn new(client: Client, oversized_image_bytes: u64) -> Self {
        Self {
            client,
            oversized_image_bytes,
        }
    }

    /// Extract meta, headings and image findings of a page already known to be reachable.
    ///
    /// Fails only when the page body cannot be fetched; image checks never fail the page.
    pub async fn extract(&self, page_url: &str) -> Result<PageExtraction> {
        let html = fetch_text(&self.client, page_url).await?;
        let page = html::parse_page(&html);
        let (missing_alt, oversized) = self.find_image_issues(page_url, &page.images).await;

        Ok(PageExtraction {
            meta: page.meta,
            headings: page.headings,
            missing_alt,
            oversized,
        })
    }

    /// Title, description and language of a page, `N/A` on any failure
    pub async fn extract_meta(&self, page_url: &str) -> PageMeta {
        match fetch_text(&self.client, page_url).await {
            Ok(html) => html::extract_meta(&html),
            Err(e) => {
                ::log::warn!("Error reading meta data of {}: {}", page_url, e);
                PageMeta::not_available()
            }
        }
    }

    /// Images without alt text, and absolute-URL images whose declared size is too large.
    ///
    /// Relative sources are not size-checked. A failed HEAD skips that image.
    pub async fn find_image_issues(
        &self,
        page_url: &str,
        images: &[ImageTag],
    ) -> (Vec<MissingAltImage>, Vec<OversizedImage>) {
        let mut missing_alt = Vec::new();
        let mut oversized = Vec::new();

        for image in images {
            if image.is_missing_alt() {
                missing_alt.push(MissingAltImage {
                    page_url: page_url.to_string(),
                    image_url: image.src.clone().unwrap_or_default(),
                });
            }

            let Some(src) = image.sized_source() else {
                continue;
            };
            match content_length(&self.client, src).await {
                Ok(Some(bytes)) if bytes > self.oversized_image_bytes => {
                    oversized.push(OversizedImage {
                        page_url: page_url.to_string(),
                        image_url: src.to_string(),
                        bytes,
                    });
                }
                Ok(_) => {}
                Err(e) => ::log::debug!("Skipping size check of {}: {}", src, e),
            }
        }

        (missing_alt, oversized)
    }
}
