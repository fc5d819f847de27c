use crate::parsers::text::normalize_text;
use crate::results::{DescriptionRow, HeadingLevel, HeadingRecord, TitleRow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a (text, page) pair occurs more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateStatus {
    #[serde(rename = "Duplicate Found")]
    DuplicateFound,
    #[serde(rename = "No Duplicate")]
    NoDuplicate,
}

/// Whether a page contributes more than one record to a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultipleStatus {
    Multiple,
    #[serde(rename = "Not Multiple")]
    NotMultiple,
}

/// A table row carrying some text found on a page
pub trait TextRecord {
    fn page_url(&self) -> &str;
    fn text(&self) -> &str;
}

impl TextRecord for HeadingRecord {
    fn page_url(&self) -> &str {
        &self.page_url
    }

    fn text(&self) -> &str {
        &self.text
    }
}

impl TextRecord for TitleRow {
    fn page_url(&self) -> &str {
        &self.page_url
    }

    fn text(&self) -> &str {
        &self.title
    }
}

impl TextRecord for DescriptionRow {
    fn page_url(&self) -> &str {
        &self.page_url
    }

    fn text(&self) -> &str {
        &self.description
    }
}

/// Flag records whose normalized text recurs on the same page.
///
/// The result is parallel to `records`. Texts are compared after collapsing
/// whitespace and lower-casing; page URLs must match exactly.
pub fn check_duplicates<R: TextRecord>(records: &[R]) -> Vec<DuplicateStatus> {
    let keys: Vec<(String, &str)> = records
        .iter()
        .map(|record| (normalize_text(record.text()), record.page_url()))
        .collect();

    let mut counts: HashMap<&(String, &str), usize> = HashMap::new();
    for key in &keys {
        *counts.entry(key).or_default() += 1;
    }

    keys.iter()
        .map(|key| {
            if counts[key] > 1 {
                DuplicateStatus::DuplicateFound
            } else {
                DuplicateStatus::NoDuplicate
            }
        })
        .collect()
}

/// Flag records whose page URL appears more than once, whatever the text
pub fn flag_multiple<R: TextRecord>(records: &[R]) -> Vec<MultipleStatus> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.page_url()).or_default() += 1;
    }

    records
        .iter()
        .map(|record| {
            if counts[record.page_url()] > 1 {
                MultipleStatus::Multiple
            } else {
                MultipleStatus::NotMultiple
            }
        })
        .collect()
}

/// A heading row annotated for review.
///
/// Text and multiple columns carry the heading level (`"H1 Text"`, `"H1 Multiple"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "HeadingReportRow")]
pub struct HeadingReport {
    pub page_url: String,
    pub level: HeadingLevel,
    pub text: String,
    pub duplicate_status: DuplicateStatus,
    pub multiple_status: MultipleStatus,
}

#[derive(Serialize)]
struct HeadingReportRow {
    #[serde(rename = "Page URL")]
    page_url: String,
    #[serde(rename = "H1 Text", skip_serializing_if = "Option::is_none")]
    h1_text: Option<String>,
    #[serde(rename = "H2 Text", skip_serializing_if = "Option::is_none")]
    h2_text: Option<String>,
    #[serde(rename = "Duplicate Status")]
    duplicate_status: DuplicateStatus,
    #[serde(rename = "H1 Multiple", skip_serializing_if = "Option::is_none")]
    h1_multiple: Option<MultipleStatus>,
    #[serde(rename = "H2 Multiple", skip_serializing_if = "Option::is_none")]
    h2_multiple: Option<MultipleStatus>,
}

impl From<HeadingReport> for HeadingReportRow {
    fn from(report: HeadingReport) -> Self {
        let mut row = Self {
            page_url: report.page_url,
            h1_text: None,
            h2_text: None,
            duplicate_status: report.duplicate_status,
            h1_multiple: None,
            h2_multiple: None,
        };
        match report.level {
            HeadingLevel::H1 => {
                row.h1_text = Some(report.text);
                row.h1_multiple = Some(report.multiple_status);
            }
            HeadingLevel::H2 => {
                row.h2_text = Some(report.text);
                row.h2_multiple = Some(report.multiple_status);
            }
        }
        row
    }
}

/// Annotate one heading table (all H1s or all H2s of a run)
pub fn annotate_headings(records: &[HeadingRecord]) -> Vec<HeadingReport> {
    let duplicates = check_duplicates(records);
    let multiples = flag_multiple(records);

    records
        .iter()
        .zip(duplicates)
        .zip(multiples)
        .map(|((record, duplicate_status), multiple_status)| HeadingReport {
            page_url: record.page_url.clone(),
            level: record.level,
            text: record.text.clone(),
            duplicate_status,
            multiple_status,
        })
        .collect()
}

/// Groups pages by the normalized text they share (titles, descriptions)
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    groups: Vec<Vec<(String, String)>>,
    positions: HashMap<String, usize>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `page_url` carries `text`
    pub fn insert(&mut self, text: &str, page_url: &str) {
        let key = normalize_text(text);
        let position = *self.positions.entry(key).or_insert_with(|| {
            self.groups.push(Vec::new());
            self.groups.len() - 1
        });
        self.groups[position].push((text.to_string(), page_url.to_string()));
    }

    /// One `(text, page URL)` row per page of every group shared by more than one page,
    /// groups in first-seen order
    pub fn duplicates(&self) -> Vec<(String, String)> {
        self.groups
            .iter()
            .filter(|group| group.len() > 1)
            .flatten()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(page_url: &str, text: &str) -> HeadingRecord {
        HeadingRecord::new(HeadingLevel::H1, page_url, text)
    }

    #[test]
    fn test_same_page_duplicates_ignore_case_and_whitespace() {
        let records = vec![heading("/a", "Hello World"), heading("/a", "hello   world")];
        assert_eq!(
            check_duplicates(&records),
            vec![DuplicateStatus::DuplicateFound, DuplicateStatus::DuplicateFound]
        );
    }

    #[test]
    fn test_same_text_on_different_pages_is_not_duplicate() {
        let records = vec![heading("/a", "Hello World"), heading("/b", "hello   world")];
        assert_eq!(
            check_duplicates(&records),
            vec![DuplicateStatus::NoDuplicate, DuplicateStatus::NoDuplicate]
        );
    }

    #[test]
    fn test_flag_multiple() {
        let records = vec![
            heading("/a", "Intro"),
            heading("/a", "Pricing"),
            heading("/b", "Missing"),
        ];
        assert_eq!(
            flag_multiple(&records),
            vec![
                MultipleStatus::Multiple,
                MultipleStatus::Multiple,
                MultipleStatus::NotMultiple
            ]
        );
    }

    #[test]
    fn test_annotate_headings() {
        let records = vec![heading("/a", "FAQ"), heading("/a", "faq"), heading("/b", "FAQ")];
        let report = annotate_headings(&records);
        assert_eq!(report[0].duplicate_status, DuplicateStatus::DuplicateFound);
        assert_eq!(report[0].multiple_status, MultipleStatus::Multiple);
        assert_eq!(report[2].duplicate_status, DuplicateStatus::NoDuplicate);
        assert_eq!(report[2].multiple_status, MultipleStatus::NotMultiple);

        let json = serde_json::to_value(&report[2]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Page URL": "/b",
                "H1 Text": "FAQ",
                "Duplicate Status": "No Duplicate",
                "H1 Multiple": "Not Multiple"
            })
        );
    }

    #[test]
    fn test_h2_report_columns() {
        let records = vec![
            HeadingRecord::new(HeadingLevel::H2, "/a", "Sizing"),
            HeadingRecord::new(HeadingLevel::H2, "/a", "Care"),
        ];
        let json = serde_json::to_value(annotate_headings(&records)).unwrap();
        assert_eq!(
            json[0],
            serde_json::json!({
                "Page URL": "/a",
                "H2 Text": "Sizing",
                "Duplicate Status": "No Duplicate",
                "H2 Multiple": "Multiple"
            })
        );
    }

    #[test]
    fn test_title_rows_are_text_records() {
        let rows = vec![
            TitleRow {
                page_url: "/a".to_string(),
                title: "Home".to_string(),
            },
            TitleRow {
                page_url: "/a".to_string(),
                title: "HOME".to_string(),
            },
        ];
        assert_eq!(
            check_duplicates(&rows),
            vec![DuplicateStatus::DuplicateFound, DuplicateStatus::DuplicateFound]
        );
    }

    #[test]
    fn test_duplicate_index_flattens_shared_groups() {
        let mut index = DuplicateIndex::new();
        index.insert("Home", "/a");
        index.insert("Home", "/b");
        index.insert("About", "/c");

        assert_eq!(
            index.duplicates(),
            vec![
                ("Home".to_string(), "/a".to_string()),
                ("Home".to_string(), "/b".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_index_keeps_each_page_text() {
        let mut index = DuplicateIndex::new();
        index.insert("Contact  Us", "/contact");
        index.insert("contact us", "/kontakt");

        assert_eq!(
            index.duplicates(),
            vec![
                ("Contact  Us".to_string(), "/contact".to_string()),
                ("contact us".to_string(), "/kontakt".to_string()),
            ]
        );
    }
}
