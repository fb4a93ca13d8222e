//! HTML `<head>` scanner for declared language alternates.
//!
//! Legacy pages announce their translations with
//! `<link rel="alternate" hreflang="en-US" href="...">` in the document head.
//! This module pulls those out so the resolver can map a legacy page onto
//! its default-locale equivalent.

use super::http_client::Fetcher;
use crate::error::{Result, SitemapError};
use crate::hreflang::{href_for, AlternateLink};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Return the inner markup of the first `<head>` element, if any.
pub fn extract_head(html: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?is)<head(?:\s[^>]*)?>(.*?)</head\s*>").expect("head regex is valid")
    });

    re.captures(html).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Collect every `<link rel="alternate" hreflang=".." href="..">` in `head`.
pub fn scan_alternates(head: &str) -> Vec<AlternateLink> {
    use scraper::{Html, Selector};

    let document = Html::parse_document(&format!("<html><head>{head}</head></html>"));
    let Ok(sel) = Selector::parse(r#"link[rel~="alternate"][hreflang][href]"#) else {
        return Vec::new();
    };

    document
        .select(&sel)
        .filter_map(|el| {
            let hreflang = el.value().attr("hreflang")?.trim();
            let href = el.value().attr("href")?.trim();
            if hreflang.is_empty() || href.is_empty() {
                return None;
            }
            Some(AlternateLink::new(hreflang, href))
        })
        .collect()
}

/// Find the equivalent of `page_url` in `lang` from the page's own markup.
///
/// Returns `Ok(None)` when the head declares no such alternate, and an error
/// when the page has no `<head>`. Relative hrefs are resolved against
/// `page_url`.
pub fn equivalent_in_html(html: &str, page_url: &str, lang: &str) -> Result<Option<String>> {
    let head = extract_head(html).ok_or_else(|| SitemapError::MissingHead {
        url: page_url.to_string(),
    })?;

    let alternates = scan_alternates(head);
    let Some(href) = href_for(&alternates, lang) else {
        return Ok(None);
    };

    let base = url::Url::parse(page_url)?;
    Ok(Some(base.join(href)?.to_string()))
}

/// Fetch a page and look up its declared equivalent in `lang`.
///
/// Relative hrefs resolve against the URL the page was served from, which
/// differs from `page_url` after a redirect.
pub async fn fetch_equivalent(
    fetcher: &dyn Fetcher,
    page_url: &str,
    lang: &str,
    timeout: Duration,
) -> Result<Option<String>> {
    let page = fetcher.fetch_page(page_url, Some(timeout)).await?;
    equivalent_in_html(&page.body, &page.url, lang)
}
