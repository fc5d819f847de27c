use thiserror::Error;

/// Errors produced while auditing a site.
///
/// Most of these are absorbed at the boundary of a single unit of work (one
/// sitemap node, one page, one image) and only logged. Whatever escapes
/// [`crate::pipeline::process_url`] fails the whole run.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} responded with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("worker task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
