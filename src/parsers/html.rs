use crate::parsers::text::collapse_whitespace;
use crate::results::{MISSING_HEADING, NOT_AVAILABLE};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"]"#));
static HTML_ROOT: LazyLock<Selector> = LazyLock::new(|| selector("html"));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static H2: LazyLock<Selector> = LazyLock::new(|| selector("h2"));
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Title, meta description and document language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub lang: String,
}

impl PageMeta {
    /// Meta values for a page that could not be fetched or parsed
    pub fn not_available() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            lang: NOT_AVAILABLE.to_string(),
        }
    }
}

/// H1 and H2 texts of a page; a level without headings holds `["Missing"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
}

/// The attributes of an `<img>` element the audit cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    pub src: Option<String>,
    pub alt: Option<String>,
}

impl ImageTag {
    pub fn is_missing_alt(&self) -> bool {
        self.alt.as_deref().is_none_or(str::is_empty)
    }

    /// Only absolute http(s) sources get their size checked
    pub fn sized_source(&self) -> Option<&str> {
        self.src.as_deref().filter(|src| src.starts_with("http"))
    }
}

/// Everything the audit extracts from one HTML document
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub meta: PageMeta,
    pub headings: Headings,
    pub images: Vec<ImageTag>,
}

/// Parses an HTML document once and extracts meta, headings and images
pub fn parse_page(html: &str) -> ParsedPage {
    let doc = Html::parse_document(html);
    ParsedPage {
        meta: meta_from(&doc),
        headings: headings_from(&doc),
        images: images_from(&doc),
    }
}

pub fn extract_meta(html: &str) -> PageMeta {
    meta_from(&Html::parse_document(html))
}

pub fn extract_headers(html: &str) -> Headings {
    headings_from(&Html::parse_document(html))
}

pub fn extract_images(html: &str) -> Vec<ImageTag> {
    images_from(&Html::parse_document(html))
}

/// Extracts the raw `href` of every anchor
pub fn extract_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let links = doc
        .select(&ANCHOR)
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.to_string())
        .collect::<Vec<String>>();

    ::log::trace!("HTML parser found {} links", links.len());
    links
}

fn meta_from(doc: &Html) -> PageMeta {
    let title = doc
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let description = doc
        .select(&META_DESCRIPTION)
        .find_map(|e| e.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let lang = doc
        .select(&HTML_ROOT)
        .next()
        .and_then(|e| e.value().attr("lang"))
        .map(str::to_string)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    PageMeta {
        title,
        description,
        lang,
    }
}

fn headings_from(doc: &Html) -> Headings {
    Headings {
        h1: heading_texts(doc, &H1),
        h2: heading_texts(doc, &H2),
    }
}

fn heading_texts(doc: &Html, level: &Selector) -> Vec<String> {
    let texts: Vec<String> = doc
        .select(level)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();

    if texts.is_empty() {
        vec![MISSING_HEADING.to_string()]
    } else {
        texts
    }
}

fn images_from(doc: &Html) -> Vec<ImageTag> {
    doc.select(&IMG)
        .map(|e| ImageTag {
            src: e.value().attr("src").map(str::to_string),
            alt: e.value().attr("alt").map(str::to_string),
        })
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}
