//! Error taxonomy shared by every phase of a run.

use std::path::PathBuf;

/// Failure while fetching, parsing, or persisting sitemap data.
///
/// Pipeline phases log these and treat the affected resource as absent;
/// only [`SitemapError::InvalidRegistry`] is fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("malformed xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to write xml: {0}")]
    XmlWrite(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("no <head> section found in {url}")]
    MissingHead { url: String },

    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid site registry: {0}")]
    InvalidRegistry(String),
}

impl SitemapError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SitemapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = SitemapError::Status {
            url: "https://example.com/sitemap.xml".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "unexpected status 503 for https://example.com/sitemap.xml"
        );
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = SitemapError::io(
            "out/en-us/sitemap.xml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("out/en-us/sitemap.xml"));
        assert!(msg.contains("denied"));
    }
}
