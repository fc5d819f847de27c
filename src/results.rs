use crate::status::LinkStatus;
use serde::{Deserialize, Serialize};

/// Sentinel for a meta value the page does not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel heading text for a page without headings of a level
pub const MISSING_HEADING: &str = "Missing";

/// Meta information recorded once per audited page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(rename = "Input URL")]
    pub input_url: String,
    #[serde(rename = "Page URL")]
    pub page_url: String,
    #[serde(rename = "Meta Title")]
    pub title: String,
    #[serde(rename = "Meta Description")]
    pub description: String,
    #[serde(rename = "Language")]
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRow {
    #[serde(rename = "Page URL")]
    pub page_url: String,
    #[serde(rename = "Meta Title")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionRow {
    #[serde(rename = "Page URL")]
    pub page_url: String,
    #[serde(rename = "Meta Description")]
    pub description: String,
}

/// Heading levels the audit reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    H1,
    H2,
}

/// One H1 or H2 found on a page.
///
/// Serialized with the level in the column name (`"H1 Text"` / `"H2 Text"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "HeadingRow", try_from = "HeadingRow")]
pub struct HeadingRecord {
    pub page_url: String,
    pub level: HeadingLevel,
    pub text: String,
}

impl HeadingRecord {
    pub fn new(level: HeadingLevel, page_url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            level,
            text: text.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct HeadingRow {
    #[serde(rename = "Page URL")]
    page_url: String,
    #[serde(rename = "H1 Text", default, skip_serializing_if = "Option::is_none")]
    h1_text: Option<String>,
    #[serde(rename = "H2 Text", default, skip_serializing_if = "Option::is_none")]
    h2_text: Option<String>,
}

impl From<HeadingRecord> for HeadingRow {
    fn from(record: HeadingRecord) -> Self {
        let (h1_text, h2_text) = match record.level {
            HeadingLevel::H1 => (Some(record.text), None),
            HeadingLevel::H2 => (None, Some(record.text)),
        };
        Self {
            page_url: record.page_url,
            h1_text,
            h2_text,
        }
    }
}

impl TryFrom<HeadingRow> for HeadingRecord {
    type Error = String;

    fn try_from(row: HeadingRow) -> Result<Self, Self::Error> {
        match (row.h1_text, row.h2_text) {
            (Some(text), None) => Ok(Self::new(HeadingLevel::H1, row.page_url, text)),
            (None, Some(text)) => Ok(Self::new(HeadingLevel::H2, row.page_url, text)),
            _ => Err(format!(
                "heading row for {} needs exactly one of \"H1 Text\" and \"H2 Text\"",
                row.page_url
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingAltImage {
    #[serde(rename = "Page URL")]
    pub page_url: String,
    #[serde(rename = "Image URL")]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OversizedImage {
    #[serde(rename = "Page URL")]
    pub page_url: String,
    #[serde(rename = "Image URL")]
    pub image_url: String,
    /// Declared `Content-Length` in bytes
    #[serde(rename = "Image Size (bytes)")]
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStatusRow {
    #[serde(rename = "Page URL")]
    pub page_url: String,
    #[serde(rename = "Status")]
    pub status: LinkStatus,
}

/// Everything an audit run produces, one field per report table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub meta_data: Vec<PageRecord>,
    pub meta_titles_all: Vec<TitleRow>,
    pub meta_titles_missing: Vec<TitleRow>,
    pub meta_titles_below_30: Vec<TitleRow>,
    pub meta_titles_duplicate: Vec<TitleRow>,
    pub meta_descriptions_all: Vec<DescriptionRow>,
    pub meta_descriptions_missing: Vec<DescriptionRow>,
    pub meta_descriptions_below_50: Vec<DescriptionRow>,
    pub meta_descriptions_duplicate: Vec<DescriptionRow>,
    pub headers_h1: Vec<HeadingRecord>,
    pub headers_h2: Vec<HeadingRecord>,
    pub images_missing_alt: Vec<MissingAltImage>,
    pub images_over_100kb: Vec<OversizedImage>,
    pub tag_pages: Vec<String>,
    pub page_status: Vec<PageStatusRow>,
}

impl RunResult {
    /// Non-empty tables as `(name, rows)` pairs, in report order
    pub fn tables(&self) -> Result<Vec<(&'static str, serde_json::Value)>, serde_json::Error> {
        let tag_rows: Vec<TagPageRow<'_>> = self
            .tag_pages
            .iter()
            .map(|page_url| TagPageRow { page_url })
            .collect();

        let tables = vec![
            ("meta_data", table(&self.meta_data)?),
            ("meta_titles_all", table(&self.meta_titles_all)?),
            ("meta_titles_missing", table(&self.meta_titles_missing)?),
            ("meta_titles_below_30", table(&self.meta_titles_below_30)?),
            ("meta_titles_duplicate", table(&self.meta_titles_duplicate)?),
            ("meta_descriptions_all", table(&self.meta_descriptions_all)?),
            ("meta_descriptions_missing", table(&self.meta_descriptions_missing)?),
            ("meta_descriptions_below_50", table(&self.meta_descriptions_below_50)?),
            ("meta_descriptions_duplicate", table(&self.meta_descriptions_duplicate)?),
            ("headers_h1", table(&self.headers_h1)?),
            ("headers_h2", table(&self.headers_h2)?),
            ("images_missing_alt", table(&self.images_missing_alt)?),
            ("images_over_100kb", table(&self.images_over_100kb)?),
            ("tag_pages", table(&tag_rows)?),
            ("page_status", table(&self.page_status)?),
        ];

        Ok(tables
            .into_iter()
            .filter(|(_, rows)| rows.as_array().is_some_and(|rows| !rows.is_empty()))
            .collect())
    }

    /// Number of pages that were extracted (status `200_ok`)
    pub fn pages_extracted(&self) -> usize {
        self.meta_data.len()
    }
}

#[derive(Serialize)]
struct TagPageRow<'a> {
    #[serde(rename = "Page URL")]
    page_url: &'a String,
}

fn table<T: Serialize>(rows: &[T]) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(rows)
}
