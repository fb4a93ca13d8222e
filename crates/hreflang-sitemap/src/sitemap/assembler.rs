//! Sitemap assembly: page records plus hreflang map into sitemap entries.

use crate::acquisition::query_index::PageRecord;
use crate::config::{Locale, SiteRegistry};
use crate::hreflang::{AlternateLink, HreflangMap};

/// `hreflang` value of the fallback link closing every alternate block.
pub const X_DEFAULT: &str = "x-default";

/// One `<url>` of a generated sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// Absolute URL of the page on its own locale site.
    pub loc: String,
    /// `YYYY-MM-DD`; omitted from the XML when absent.
    pub lastmod: Option<String>,
    /// Empty when the page has no entry in the hreflang map.
    pub alternates: Vec<AlternateLink>,
}

/// A generated sitemap for one migrated locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sitemap {
    /// Code of the migrated locale this sitemap is for.
    pub locale: String,
    /// One entry per indexable page, in query-index order.
    pub urls: Vec<UrlEntry>,
}

impl Sitemap {
    /// Total alternate links across all entries, `x-default` included.
    pub fn alternate_count(&self) -> usize {
        self.urls.iter().map(|u| u.alternates.len()).sum()
    }
}

pub struct SitemapAssembler<'a> {
    registry: &'a SiteRegistry,
    map: &'a HreflangMap,
}

impl<'a> SitemapAssembler<'a> {
    pub fn new(registry: &'a SiteRegistry, map: &'a HreflangMap) -> Self {
        Self { registry, map }
    }

    pub fn assemble(&self, locale: &Locale, records: &[PageRecord]) -> Sitemap {
        Sitemap {
            locale: locale.code.clone(),
            urls: records.iter().map(|r| self.entry_for(locale, r)).collect(),
        }
    }

    pub fn entry_for(&self, locale: &Locale, record: &PageRecord) -> UrlEntry {
        let alternates = self
            .canonical_key(locale, record)
            .map(|key| self.alternates(locale, key))
            .unwrap_or_default();

        UrlEntry {
            loc: locale.url_for(&record.path),
            lastmod: record.lastmod_date(),
            alternates,
        }
    }

    /// The map key a page hangs under: its own path on the default locale,
    /// its declared primary-language path elsewhere.
    fn canonical_key<'r>(&self, locale: &Locale, record: &'r PageRecord) -> Option<&'r str> {
        if locale.code == self.registry.default_locale().code {
            Some(record.path.as_str())
        } else {
            record.primary_path()
        }
    }

    /// Alternates under `key` for every registered locale other than
    /// `locale`, then `x-default` when the default locale has an entry.
    fn alternates(&self, locale: &Locale, key: &str) -> Vec<AlternateLink> {
        let Some(paths) = self.map.get(key) else {
            return Vec::new();
        };

        let mut links: Vec<AlternateLink> = paths
            .iter()
            .filter(|(code, _)| code.as_str() != locale.code)
            .filter_map(|(code, path)| {
                let other = self.registry.get(code)?;
                Some(AlternateLink::new(code.clone(), other.url_for(path)))
            })
            .collect();

        let default_locale = self.registry.default_locale();
        if let Some(path) = paths.get(&default_locale.code) {
            links.push(AlternateLink::new(X_DEFAULT, default_locale.url_for(path)));
        }

        links
    }
}
