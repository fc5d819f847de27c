pub mod web;

pub use web::{CrawlOptions, crawl_website};
