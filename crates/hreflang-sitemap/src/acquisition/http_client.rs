//! HTTP fetch capability.
//!
//! The pipeline only ever needs "GET this URL as text". [`Fetcher`] is that
//! seam; [`HttpClient`] is the reqwest-backed implementation used by the
//! binary.

use crate::error::{Result, SitemapError};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = concat!("hreflang-sitemap/", env!("CARGO_PKG_VERSION"));

/// Response of a GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects; the base for relative links in `body`.
    pub url: String,
    /// HTTP status code of the final response.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

/// Fetch a URL as text.
///
/// Non-2xx responses are errors. `timeout` bounds the whole request when set.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url`, keeping the URL the body was finally served from.
    async fn fetch_page(&self, url: &str, timeout: Option<Duration>) -> Result<HttpResponse>;

    /// GET `url` and return only the body.
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<String> {
        Ok(self.fetch_page(url, timeout).await?.body)
    }
}

/// Shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// GET `url`, failing on transport errors only.
    pub async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let body = resp.text().await?;

        Ok(HttpResponse {
            url: final_url,
            status,
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch_page(&self, url: &str, timeout: Option<Duration>) -> Result<HttpResponse> {
        let resp = self.get(url, timeout).await?;
        if !(200..300).contains(&resp.status) {
            return Err(SitemapError::Status {
                url: url.to_string(),
                status: resp.status,
            });
        }
        Ok(resp)
    }
}
