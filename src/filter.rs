use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Path endings that never point at an HTML page worth auditing
static NON_PAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\.(jpg|jpeg|png|gif|bmp|svg|webp|mp4|avi|mov|mkv|pdf|doc|docx|xls|xlsx|zip|rar|7z|exe)$",
    )
    .expect("extension pattern is valid")
});

/// Path fragments that mark taxonomy listing pages
const TAG_PATTERNS: [&str; 3] = ["/tag/", "/product-tag/", "/category-tag/"];

/// Canonical form of a URL used for identity comparisons.
///
/// Drops the fragment and every trailing `/` of the path. With
/// `add_trailing_slash` exactly one `/` is put back, unless the path ends up
/// empty. Works on plain strings so relative and malformed input never fails.
pub fn normalize_url(url: &str, add_trailing_slash: bool) -> String {
    let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
    let (before_query, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let path_start = match before_query.find("://") {
        Some(scheme_end) => {
            let authority_start = scheme_end + 3;
            before_query[authority_start..]
                .find('/')
                .map_or(before_query.len(), |offset| authority_start + offset)
        }
        None => 0,
    };
    let (prefix, path) = before_query.split_at(path_start);
    let path = path.trim_end_matches('/');

    let mut normalized = String::with_capacity(url.len() + 1);
    normalized.push_str(prefix);
    normalized.push_str(path);
    if add_trailing_slash && !path.is_empty() {
        normalized.push('/');
    }
    if !query.is_empty() {
        normalized.push('?');
        normalized.push_str(query);
    }
    normalized
}

/// Whether a URL is worth crawling and auditing.
///
/// A path containing `cart` is always accepted, even with an excluded
/// extension. Otherwise binary/document extensions and cart actions in the
/// query (`add-to-cart`, `action`) are rejected. A cart key with a blank value
/// (`?action=`) does not count. Unparseable input is rejected.
pub fn is_valid_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let path = parsed.path().to_lowercase();
    if path.contains("cart") {
        return true;
    }
    if NON_PAGE_EXTENSION.is_match(&path) {
        return false;
    }

    !parsed
        .query_pairs()
        .any(|(key, value)| (key == "add-to-cart" || key == "action") && !value.is_empty())
}

/// Whether a URL points at a tag/taxonomy listing page
pub fn is_tag_page(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    TAG_PATTERNS.iter().any(|pattern| path.contains(pattern))
}

/// URL filter combining the built-in validity rules with user regex patterns
#[derive(Debug, Default)]
pub struct UrlFilter {
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a filter from include/exclude regex patterns
    pub fn new(include_patterns: &[String], exclude_patterns: &[String]) -> Result<Self, regex::Error> {
        let include_regexes = include_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude_regexes = exclude_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if a discovered URL should be audited
    pub fn should_audit(&self, url: &str) -> bool {
        if !is_valid_url(url) {
            return false;
        }

        // Exclusions take precedence
        if self.exclude_regexes.iter().any(|regex| regex.is_match(url)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|regex| regex.is_match(url))
    }

    /// Keep the URLs that pass the filter, in normalized form
    pub fn apply<'a, I>(&self, urls: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        urls.into_iter()
            .filter(|url| self.should_audit(url))
            .map(|url| normalize_url(url, false))
            .collect()
    }
}
