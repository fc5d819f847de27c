/// Collapse every run of whitespace into a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key used to compare texts for duplication: whitespace-collapsed and lower-cased
pub fn normalize_text(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

/// Whether a meta value counts as absent
pub fn is_blank_or_sentinel(text: &str, sentinel: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed == sentinel
}
