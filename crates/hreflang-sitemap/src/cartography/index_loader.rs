//! Migrated-site index loader.
//!
//! Downloads the `query-index.json` of every migrated locale, drops pages
//! that must not be indexed, and builds the migrated half of the hreflang
//! map. Indices are fetched concurrently; the map is then filled in two
//! phases (default locale first, other locales after) so a translated page
//! never misses its default-locale key because of task ordering.

use crate::acquisition::http_client::Fetcher;
use crate::acquisition::query_index::{parse_query_index, PageRecord};
use crate::config::{Locale, Settings, SiteRegistry};
use crate::error::Result;
use crate::hreflang::HreflangMap;
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Indexable pages per migrated locale code, in index order.
pub type LocalePages = BTreeMap<String, Vec<PageRecord>>;

/// Counters for one loader run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Migrated locales whose index was fetched and decoded.
    pub locales_loaded: usize,
    /// Migrated locales whose index could not be fetched or decoded.
    pub locales_failed: usize,
    /// Indexable pages retained across loaded locales.
    pub pages_kept: usize,
    /// Index rows dropped for lacking a usable path.
    pub pages_skipped: usize,
    /// Non-default pages whose primary-language key exists.
    pub pages_linked: usize,
    /// Non-default pages with a missing or dangling primary-language key.
    pub pages_unlinked: usize,
}

pub struct IndexLoader<'a> {
    fetcher: &'a dyn Fetcher,
    registry: &'a SiteRegistry,
    settings: &'a Settings,
}

impl<'a> IndexLoader<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        registry: &'a SiteRegistry,
        settings: &'a Settings,
    ) -> Self {
        Self {
            fetcher,
            registry,
            settings,
        }
    }

    /// Load every migrated locale into `map` and return the retained pages.
    ///
    /// A locale whose index cannot be fetched or parsed is absent from the
    /// returned pages, so no sitemap is produced for it.
    pub async fn load_into(&self, map: &mut HreflangMap) -> (LocalePages, LoadReport) {
        info!("fetching query indices");
        let fetched = join_all(self.registry.migrated().map(|locale| async move {
            let pages = match self.fetch_pages(locale).await {
                Ok(pages) => Some(pages),
                Err(e) => {
                    warn!(
                        "error fetching query index for {} ({}): {e}",
                        locale.code,
                        self.settings.query_index_url(locale)
                    );
                    None
                }
            };
            (locale, pages)
        }))
        .await;

        let default_code = self.registry.default_locale().code.as_str();
        let mut report = LoadReport::default();
        let mut pages = LocalePages::new();

        let (defaults, others): (Vec<_>, Vec<_>) = fetched
            .into_iter()
            .partition(|(locale, _)| locale.is_default);

        for (locale, records) in defaults.into_iter().chain(others) {
            let Some((records, skipped)) = records else {
                report.locales_failed += 1;
                continue;
            };
            report.pages_skipped += skipped;

            let (linked, unlinked) = apply_pages(map, locale, default_code, &records);
            report.locales_loaded += 1;
            report.pages_kept += records.len();
            report.pages_linked += linked;
            report.pages_unlinked += unlinked;

            debug!("{}: {} indexable pages", locale.code, records.len());
            pages.insert(locale.code.clone(), records);
        }

        (pages, report)
    }

    /// Indexable records of one locale, plus the count of unusable rows.
    async fn fetch_pages(&self, locale: &Locale) -> Result<(Vec<PageRecord>, usize)> {
        let url = self.settings.query_index_url(locale);
        let json = self.fetcher.fetch(&url, None).await?;
        let index = parse_query_index(&json)?;
        let skipped = index.skipped;
        Ok((index.indexable(), skipped))
    }
}

/// Add one locale's pages to `map`.
///
/// Default-locale pages seed their own key. Other pages attach under their
/// primary-language path when that key exists and are otherwise left out of
/// the map. Returns `(linked, unlinked)` counts for non-default pages.
pub fn apply_pages(
    map: &mut HreflangMap,
    locale: &Locale,
    default_code: &str,
    records: &[PageRecord],
) -> (usize, usize) {
    if locale.code == default_code {
        for record in records {
            map.seed(&record.path, default_code);
        }
        return (0, 0);
    }

    let mut linked = 0;
    let mut unlinked = 0;
    for record in records {
        let attached = record
            .primary_path()
            .is_some_and(|primary| map.attach(primary, &locale.code, &record.path));
        if attached {
            linked += 1;
        } else {
            unlinked += 1;
        }
    }
    (linked, unlinked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFetcher;

    const BASE: &str = "https://index.example/";

    fn registry() -> SiteRegistry {
        // The default locale is deliberately listed last.
        SiteRegistry::new(vec![
            Locale::migrated(
                "es-US",
                "https://example.com",
                "https://example.com/es-us/sitemap.xml",
            ),
            Locale::migrated("fr-FR", "https://example.fr", "https://example.fr/sitemap.xml"),
            Locale::migrated(
                "en-US",
                "https://example.com",
                "https://example.com/en-us/sitemap.xml",
            )
                .as_default(),
        ])
        .unwrap()
    }

    fn settings() -> Settings {
        Settings {
            query_index_base: BASE.to_string(),
            ..Settings::default()
        }
    }

    const EN_INDEX: &str = r#"{"data": [
        {"path": "/en-us/about", "lastModified": 1709251200, "robots": ""},
        {"path": "/en-us/private", "robots": "noindex, nofollow"},
        {"path": "/en-us/contact", "robots": "index"}
    ]}"#;

    const ES_INDEX: &str = r#"{"data": [
        {"path": "/es-us/acerca", "primary-language-url": "/en-us/about"},
        {"path": "/es-us/huerfano", "primary-language-url": "/en-us/gone"},
        {"path": "/es-us/sin-primaria", "primary-language-url": ""},
        {"path": "/es-us/borrador", "robots": "drafts", "primary-language-url": "/en-us/contact"}
    ]}"#;

    #[tokio::test]
    async fn test_default_locale_processed_first() {
        let fetcher = MemoryFetcher::new()
            .with_page("https://index.example/en-us/query-index.json", EN_INDEX)
            .with_page("https://index.example/es-us/query-index.json", ES_INDEX)
            .with_status("https://index.example/fr-fr/query-index.json", 500);
        let registry = registry();
        let settings = settings();
        let loader = IndexLoader::new(&fetcher, &registry, &settings);

        let mut map = HreflangMap::new();
        let (pages, report) = loader.load_into(&mut map).await;

        assert_eq!(map.len(), 2);
        assert_eq!(map.path_for("/en-us/about", "en-US"), Some("/en-us/about"));
        assert_eq!(map.path_for("/en-us/about", "es-US"), Some("/es-us/acerca"));
        assert_eq!(map.path_for("/en-us/contact", "en-US"), Some("/en-us/contact"));
        assert!(!map.contains_key("/en-us/private"));
        assert!(!map.contains_key("/en-us/gone"));

        // Unlinked pages are still kept for the sitemap; drafts are not.
        let es: Vec<&str> = pages["es-US"].iter().map(|p| p.path.as_str()).collect();
        assert_eq!(es, vec!["/es-us/acerca", "/es-us/huerfano", "/es-us/sin-primaria"]);
        assert!(!pages.contains_key("fr-FR"));

        assert_eq!(
            report,
            LoadReport {
                locales_loaded: 2,
                locales_failed: 1,
                pages_kept: 5,
                pages_skipped: 0,
                pages_linked: 1,
                pages_unlinked: 2,
            }
        );
    }

    #[test]
    fn test_every_indexable_default_page_has_self_entry() {
        let records: Vec<PageRecord> = parse_query_index(EN_INDEX).unwrap().indexable();
        let registry = registry();
        let mut map = HreflangMap::new();

        apply_pages(&mut map, registry.default_locale(), "en-US", &records);

        for record in &records {
            assert_eq!(map.path_for(&record.path, "en-US"), Some(record.path.as_str()));
        }
    }

    #[test]
    fn test_non_default_before_seed_is_dropped() {
        let registry = registry();
        let es = registry.get("es-US").unwrap();
        let records = vec![PageRecord {
            primary_language_url: Some("/en-us/about".to_string()),
            ..PageRecord::new("/es-us/acerca")
        }];

        let mut map = HreflangMap::new();
        assert_eq!(apply_pages(&mut map, es, "en-US", &records), (0, 1));
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_bad_row_does_not_drop_locale() {
        let en = r#"{"data": [
            {"path": "/en-us/about"},
            {"robots": "", "lastModified": 1709251200},
            {"path": "/en-us/contact"}
        ]}"#;
        let fetcher = MemoryFetcher::new()
            .with_page("https://index.example/en-us/query-index.json", en)
            .with_page("https://index.example/es-us/query-index.json", ES_INDEX)
            .with_page("https://index.example/fr-fr/query-index.json", r#"{"data": []}"#);
        let registry = registry();
        let settings = settings();
        let loader = IndexLoader::new(&fetcher, &registry, &settings);

        let mut map = HreflangMap::new();
        let (pages, report) = loader.load_into(&mut map).await;

        let en: Vec<&str> = pages["en-US"].iter().map(|p| p.path.as_str()).collect();
        assert_eq!(en, vec!["/en-us/about", "/en-us/contact"]);
        assert_eq!(map.path_for("/en-us/about", "es-US"), Some("/es-us/acerca"));
        assert_eq!(report.locales_loaded, 3);
        assert_eq!(report.locales_failed, 0);
        assert_eq!(report.pages_skipped, 1);
    }
}
