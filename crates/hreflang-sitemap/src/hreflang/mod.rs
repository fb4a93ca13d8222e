//! The hreflang map: default-locale path to per-locale equivalents.

pub mod map;
pub mod store;

pub use map::{HreflangMap, LocalePaths, MergePrecedence, MergeStats};

use serde::{Deserialize, Serialize};

/// An alternate-language link: `hreflang` code plus target URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateLink {
    /// Language code, or `x-default`.
    pub hreflang: String,
    /// Absolute URL of the alternate page.
    pub href: String,
}

impl AlternateLink {
    pub fn new(hreflang: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            hreflang: hreflang.into(),
            href: href.into(),
        }
    }
}

/// Pick the href declared for `lang`. When several links declare the same
/// language, the last one wins.
pub fn href_for<'a>(links: &'a [AlternateLink], lang: &str) -> Option<&'a str> {
    links
        .iter()
        .rev()
        .find(|l| l.hreflang.eq_ignore_ascii_case(lang) && !l.href.is_empty())
        .map(|l| l.href.as_str())
}
