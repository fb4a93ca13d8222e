//! In-memory fixtures shared by unit tests.

use crate::acquisition::http_client::{Fetcher, HttpResponse};
use crate::error::{Result, SitemapError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Serves canned bodies by exact URL; anything else is a 404.
#[derive(Default)]
pub struct MemoryFetcher {
    /// Requested URL to (served-from URL, body).
    pages: HashMap<String, (String, String)>,
    failures: HashMap<String, u16>,
    requests: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages
            .insert(url.to_string(), (url.to_string(), body.to_string()));
        self
    }

    /// Serve `body` for `url` as if redirected to `target`.
    pub fn with_redirect(mut self, url: &str, target: &str, body: &str) -> Self {
        self.pages
            .insert(url.to_string(), (target.to_string(), body.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.failures.insert(url.to_string(), status);
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch_page(&self, url: &str, _timeout: Option<Duration>) -> Result<HttpResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failures.get(url) {
            return Err(SitemapError::Status {
                url: url.to_string(),
                status: *status,
            });
        }
        let (served_from, body) = self.pages.get(url).ok_or_else(|| SitemapError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        Ok(HttpResponse {
            url: served_from.clone(),
            status: 200,
            body: body.clone(),
        })
    }
}
