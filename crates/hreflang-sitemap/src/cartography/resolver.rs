//! External hreflang resolver.
//!
//! Walks the sitemap of every unmigrated locale and, for each listed page,
//! works out which default-locale page it translates:
//!
//! 1. Fetch the page and read `<link rel="alternate" hreflang>` from its head.
//! 2. Failing that, use the `xhtml:link` alternates listed in the sitemap.
//!
//! Every failure is per resource: it is logged and the entry yields nothing.

use crate::acquisition::head_scanner;
use crate::acquisition::http_client::Fetcher;
use crate::acquisition::sitemap_parser::{parse_sitemap, SitemapEntry};
use crate::cartography::batcher::BatchPacer;
use crate::config::{Locale, Settings, SiteRegistry};
use crate::error::Result;
use crate::hreflang::HreflangMap;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters for one resolver run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Unmigrated sitemaps downloaded and parsed.
    pub sitemaps_fetched: usize,
    /// Unmigrated sitemaps that could not be fetched or parsed.
    pub sitemaps_failed: usize,
    /// `<url>` entries across all parsed sitemaps.
    pub entries_seen: usize,
    /// Entries without `<loc>`.
    pub entries_skipped: usize,
    /// Entries recorded in the map under a default-locale key.
    pub entries_resolved: usize,
}

/// What became of a single sitemap entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryOutcome {
    Skipped,
    Unresolved,
    Resolved { canonical: String, local: String },
}

pub struct ExternalResolver<'a> {
    fetcher: &'a dyn Fetcher,
    registry: &'a SiteRegistry,
    pacer: BatchPacer,
    page_timeout: Duration,
}

impl<'a> ExternalResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, registry: &'a SiteRegistry, settings: &Settings) -> Self {
        Self {
            fetcher,
            registry,
            pacer: BatchPacer::from_settings(settings),
            page_timeout: settings.page_timeout,
        }
    }

    /// Resolve every unmigrated sitemap into `map`.
    ///
    /// Sitemaps are downloaded concurrently, then traversed one after the
    /// other so that the batch pacing applies per site.
    pub async fn resolve_into(&self, map: &mut HreflangMap) -> ResolveReport {
        info!("fetching external sitemaps");
        let mut report = ResolveReport::default();
        let sitemaps = self.fetch_sitemaps().await;

        for (_, entries) in &sitemaps {
            match entries {
                Some(_) => report.sitemaps_fetched += 1,
                None => report.sitemaps_failed += 1,
            }
        }
        info!("fetched {} sitemaps", report.sitemaps_fetched);

        for (locale, entries) in &sitemaps {
            let Some(entries) = entries else {
                continue;
            };
            info!("traversing {}", locale.sitemap_url);
            let traversed = self.traverse(locale, entries, map).await;
            report.entries_seen += traversed.entries_seen;
            report.entries_skipped += traversed.entries_skipped;
            report.entries_resolved += traversed.entries_resolved;
        }

        report
    }

    /// Fetch and parse every unmigrated sitemap. Failures come back as `None`.
    pub async fn fetch_sitemaps(&self) -> Vec<(&'a Locale, Option<Vec<SitemapEntry>>)> {
        join_all(self.registry.unmigrated().map(|locale| async move {
            match self.fetch_sitemap(locale).await {
                Ok(entries) => (locale, Some(entries)),
                Err(e) => {
                    warn!("error fetching or parsing sitemap {}: {e}", locale.sitemap_url);
                    (locale, None)
                }
            }
        }))
        .await
    }

    async fn fetch_sitemap(&self, locale: &Locale) -> Result<Vec<SitemapEntry>> {
        let xml = self.fetcher.fetch(&locale.sitemap_url, None).await?;
        parse_sitemap(&xml)
    }

    /// Resolve one locale's sitemap entries in paced batches and record the
    /// results under `locale`.
    pub async fn traverse(
        &self,
        locale: &Locale,
        entries: &[SitemapEntry],
        map: &mut HreflangMap,
    ) -> ResolveReport {
        let outcomes = self
            .pacer
            .run(entries, |entry| self.resolve_entry(locale, entry))
            .await;

        let mut report = ResolveReport {
            entries_seen: entries.len(),
            ..ResolveReport::default()
        };

        // Outcomes arrive in sitemap order; later duplicates overwrite.
        for outcome in outcomes {
            match outcome {
                EntryOutcome::Skipped => report.entries_skipped += 1,
                EntryOutcome::Unresolved => {}
                EntryOutcome::Resolved { canonical, local } => {
                    map.record(&canonical, &locale.code, &local);
                    report.entries_resolved += 1;
                }
            }
        }

        report
    }

    async fn resolve_entry(&self, locale: &Locale, entry: &SitemapEntry) -> EntryOutcome {
        let Some(loc) = entry.loc.as_deref() else {
            warn!("missing loc on sitemap entry of {}", locale.code);
            return EntryOutcome::Skipped;
        };

        let default_locale = self.registry.default_locale();

        let from_page = match head_scanner::fetch_equivalent(
            self.fetcher,
            loc,
            &default_locale.code,
            self.page_timeout,
        )
        .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!("error fetching or parsing page {loc}: {e}");
                None
            }
        };

        let from_sitemap = || entry.alternate_for(&default_locale.code).map(String::from);
        let Some(href) = from_page.or_else(from_sitemap) else {
            debug!("no {} equivalent for {loc}", default_locale.code);
            return EntryOutcome::Unresolved;
        };

        let page_url = match url::Url::parse(loc) {
            Ok(u) => u,
            Err(e) => {
                warn!("invalid loc {loc}: {e}");
                return EntryOutcome::Unresolved;
            }
        };
        let alternate_url = match page_url.join(&href) {
            Ok(u) => u,
            Err(e) => {
                warn!("invalid alternate {href} for {loc}: {e}");
                return EntryOutcome::Unresolved;
            }
        };

        EntryOutcome::Resolved {
            canonical: default_locale.local_path(&alternate_url),
            local: locale.local_path(&page_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFetcher;

    fn registry() -> SiteRegistry {
        SiteRegistry::new(vec![
            Locale::migrated(
                "en-US",
                "https://example.com/en-us",
                "https://example.com/en-us/sitemap.xml",
            )
                .as_default(),
            Locale::unmigrated(
                "fr-CA",
                "https://example.ca",
                "https://example.ca/fr-ca/sitemap.xml",
            ),
            Locale::unmigrated("de-DE", "https://example.de", "https://example.de/sitemap.xml"),
        ])
        .unwrap()
    }

    fn settings() -> Settings {
        Settings {
            batch_size: 2,
            batch_delay: Duration::ZERO,
            ..Settings::default()
        }
    }

    fn page(hreflang: &str, href: &str) -> String {
        format!(
            r#"<html><head><link rel="alternate" hreflang="{hreflang}" href="{href}"></head><body></body></html>"#
        )
    }

    const FR_SITEMAP: &str = r#"<urlset xmlns:xhtml="http://www.w3.org/1999/xhtml">
        <url><loc>https://example.ca/fr-ca/a-propos</loc></url>
        <url><lastmod>2024-01-01</lastmod></url>
        <url>
            <loc>https://example.ca/fr-ca/contact</loc>
            <xhtml:link rel="alternate" hreflang="en-US" href="https://example.com/en-us/contact"/>
        </url>
        <url><loc>https://example.ca/fr-ca/orphelin</loc></url>
    </urlset>"#;

    fn fetcher() -> MemoryFetcher {
        MemoryFetcher::new()
            .with_page("https://example.ca/fr-ca/sitemap.xml", FR_SITEMAP)
            .with_page(
                "https://example.ca/fr-ca/a-propos",
                &page("en-US", "https://example.com/en-us/about"),
            )
            // Contact page has no head alternates; sitemap fallback applies.
            .with_page("https://example.ca/fr-ca/contact", "<html><head></head></html>")
            .with_status("https://example.ca/fr-ca/orphelin", 500)
            .with_status("https://example.de/sitemap.xml", 503)
    }

    #[tokio::test]
    async fn test_resolve_from_html_and_sitemap_fallback() {
        let registry = registry();
        let fetcher = fetcher();
        let resolver = ExternalResolver::new(&fetcher, &registry, &settings());

        let mut map = HreflangMap::new();
        let report = resolver.resolve_into(&mut map).await;

        assert_eq!(map.path_for("/about", "fr-CA"), Some("/fr-ca/a-propos"));
        assert_eq!(map.path_for("/contact", "fr-CA"), Some("/fr-ca/contact"));
        assert_eq!(map.len(), 2);

        assert_eq!(
            report,
            ResolveReport {
                sitemaps_fetched: 1,
                sitemaps_failed: 1,
                entries_seen: 4,
                entries_skipped: 1,
                entries_resolved: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_html_takes_priority_over_sitemap_links() {
        let registry = registry();
        let sitemap = r#"<urlset xmlns:xhtml="http://www.w3.org/1999/xhtml"><url>
            <loc>https://example.ca/fr-ca/services</loc>
            <xhtml:link rel="alternate" hreflang="en-US" href="https://example.com/en-us/old-services"/>
        </url></urlset>"#;
        let fetcher = MemoryFetcher::new()
            .with_page("https://example.ca/fr-ca/sitemap.xml", sitemap)
            .with_page(
                "https://example.ca/fr-ca/services",
                &page("en-US", "https://example.com/en-us/services"),
            );
        let resolver = ExternalResolver::new(&fetcher, &registry, &settings());

        let mut map = HreflangMap::new();
        resolver.resolve_into(&mut map).await;

        assert_eq!(map.path_for("/services", "fr-CA"), Some("/fr-ca/services"));
        assert!(!map.contains_key("/old-services"));
    }

    #[tokio::test]
    async fn test_missing_loc_does_not_stop_batch() {
        let registry = registry();
        let fetcher = fetcher();
        let resolver = ExternalResolver::new(&fetcher, &registry, &settings());
        let fr = registry.get("fr-CA").unwrap();

        let entries = parse_sitemap(FR_SITEMAP).unwrap();
        let mut map = HreflangMap::new();
        let report = resolver.traverse(fr, &entries, &mut map).await;

        assert_eq!(report.entries_skipped, 1);
        assert_eq!(report.entries_resolved, 2);
        // One sitemap entry lacks <loc>, so only three pages are requested.
        assert_eq!(fetcher.requests(), 3);
    }

    #[tokio::test]
    async fn test_other_language_alternates_are_ignored() {
        let registry = registry();
        let sitemap = r#"<urlset><url><loc>https://example.ca/fr-ca/x</loc></url></urlset>"#;
        let fetcher = MemoryFetcher::new()
            .with_page("https://example.ca/fr-ca/sitemap.xml", sitemap)
            .with_page("https://example.ca/fr-ca/x", &page("en-CA", "https://example.ca/en-ca/x"));
        let resolver = ExternalResolver::new(&fetcher, &registry, &settings());

        let mut map = HreflangMap::new();
        let report = resolver.resolve_into(&mut map).await;

        assert!(map.is_empty());
        assert_eq!(report.entries_resolved, 0);
    }
}
