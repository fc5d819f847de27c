pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

pub use html::{Headings, ImageTag, PageMeta, ParsedPage, parse_page};
pub use text::normalize_text;
