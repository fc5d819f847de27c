use clap::{Parser, ValueEnum};
use regex::Regex;
use seo_crawl::Target;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "seo-crawl")]
#[command(about = "SEO audit of a site from its sitemap or by crawling it")]
#[command(version)]
pub struct Args {
    /// Sitemap URL or website root URL
    pub url: String,

    /// Input type (sitemap, website)
    #[arg(short, long = "type", value_enum, default_value_t = InputKind::Sitemap)]
    pub type_: InputKind,

    /// Number of pages processed concurrently
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stop the website crawl after this many pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write one JSON file per non-empty table into this directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    Sitemap,
    Website,
}

/// Check that a URL has the shape the input kind expects
pub fn validate_input(kind: InputKind, url: &str) -> Result<(), String> {
    let (pattern, expected) = match kind {
        InputKind::Sitemap => (r"^https?://.*\.xml$", "an http(s) URL ending in .xml"),
        InputKind::Website => (r"^https?://", "an http(s) URL"),
    };
    let re = Regex::new(pattern).map_err(|e| e.to_string())?;
    if re.is_match(url) {
        Ok(())
    } else {
        Err(format!("'{}' is not {}", url, expected))
    }
}

/// Convert from CLI argument input kind to the library target
pub fn to_target(kind: InputKind, url: &str) -> Target {
    match kind {
        InputKind::Sitemap => Target::Sitemap(url.to_string()),
        InputKind::Website => Target::Website(url.to_string()),
    }
}
