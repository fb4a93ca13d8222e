//! End-to-end phases of a run.
//!
//! `fetch_external` resolves unmigrated sites and persists the lookup table.
//! `generate` loads migrated indices, merges that table back in, and writes
//! one sitemap per migrated locale. Each phase owns a fresh [`HreflangMap`]
//! for its duration; the lookup table file is the only thing passed between
//! them.

use crate::acquisition::http_client::Fetcher;
use crate::cartography::index_loader::{IndexLoader, LoadReport, LocalePages};
use crate::cartography::resolver::{ExternalResolver, ResolveReport};
use crate::config::{Settings, SiteRegistry};
use crate::hreflang::store::{load_or_empty, save_lookup_table};
use crate::hreflang::{HreflangMap, MergeStats};
use crate::sitemap::{write_sitemap, SitemapAssembler};
use futures::future::join_all;
use std::path::PathBuf;
use tracing::{error, info};

/// Outcome of the external resolution phase.
#[derive(Debug, Clone)]
pub struct FetchSummary {
    /// Counters from walking the unmigrated sitemaps.
    pub report: ResolveReport,
    /// Keys and locale entries in the persisted table.
    pub keys: usize,
    pub entries: usize,
    /// False when the lookup table could not be written.
    pub persisted: bool,
}

/// A sitemap that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenSitemap {
    pub locale: String,
    pub path: PathBuf,
    /// `<url>` elements written.
    pub urls: usize,
    /// `xhtml:link` elements written, `x-default` included.
    pub alternates: usize,
}

/// Outcome of the generation phase.
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    /// Counters from loading the migrated query indices.
    pub load: LoadReport,
    /// What merging the persisted lookup table changed.
    pub merge: MergeStats,
    pub written: Vec<WrittenSitemap>,
    /// Locale codes whose sitemap could not be written.
    pub failed: Vec<String>,
}

/// Resolve all unmigrated sitemaps and persist the lookup table.
pub async fn fetch_external(
    fetcher: &dyn Fetcher,
    registry: &SiteRegistry,
    settings: &Settings,
) -> FetchSummary {
    let mut map = HreflangMap::new();
    let report = ExternalResolver::new(fetcher, registry, settings)
        .resolve_into(&mut map)
        .await;

    let table = map.restrict_to(|code| registry.is_unmigrated(code));

    info!("saving hreflangs to {}", settings.lookup_table.display());
    let persisted = match save_lookup_table(&settings.lookup_table, &table).await {
        Ok(()) => true,
        Err(e) => {
            error!("could not save hreflang map: {e}");
            false
        }
    };

    FetchSummary {
        report,
        keys: table.len(),
        entries: table.entry_count(),
        persisted,
    }
}

/// Build and write the sitemaps of every migrated locale.
pub async fn generate(
    fetcher: &dyn Fetcher,
    registry: &SiteRegistry,
    settings: &Settings,
) -> GenerateSummary {
    let mut map = HreflangMap::new();
    let (pages, load) = IndexLoader::new(fetcher, registry, settings)
        .load_into(&mut map)
        .await;

    let external = load_or_empty(&settings.lookup_table).await;
    let merge = map.merge_external(&external, settings.precedence);
    info!(
        "merged external hreflangs: {} new keys, {} new entries",
        merge.keys_added, merge.entries_added
    );

    let (written, failed) = write_sitemaps(registry, settings, &map, &pages).await;

    GenerateSummary {
        load,
        merge,
        written,
        failed,
    }
}

/// Assemble and write one sitemap per migrated locale that has pages.
///
/// Locales are written concurrently; a failure is logged and reported
/// without affecting the others.
pub async fn write_sitemaps(
    registry: &SiteRegistry,
    settings: &Settings,
    map: &HreflangMap,
    pages: &LocalePages,
) -> (Vec<WrittenSitemap>, Vec<String>) {
    info!("building sitemaps");
    let assembler = SitemapAssembler::new(registry, map);
    let assembler = &assembler;

    let results = join_all(registry.migrated().filter_map(|locale| {
        let records = pages.get(&locale.code)?;
        Some(async move {
            let sitemap = assembler.assemble(locale, records);
            let path = settings.sitemap_path(locale);

            match write_sitemap(&path, &sitemap).await {
                Ok(()) => {
                    info!("wrote {} ({} urls)", path.display(), sitemap.urls.len());
                    Ok(WrittenSitemap {
                        locale: locale.code.clone(),
                        urls: sitemap.urls.len(),
                        alternates: sitemap.alternate_count(),
                        path,
                    })
                }
                Err(e) => {
                    error!("failed to write sitemap for {}: {e}", locale.code);
                    Err(locale.code.clone())
                }
            }
        })
    }))
    .await;

    let mut written = Vec::new();
    let mut failed = Vec::new();
    for result in results {
        match result {
            Ok(w) => written.push(w),
            Err(code) => failed.push(code),
        }
    }
    (written, failed)
}
