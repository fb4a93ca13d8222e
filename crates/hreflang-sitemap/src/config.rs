//! Site registry and run settings.
//!
//! The registry is compiled in: every country site is listed with its base
//! URL, its sitemap URL, and whether it has already moved to the new
//! platform. Exactly one migrated locale is the default (reference) locale
//! whose paths key the hreflang map.

use crate::error::{Result, SitemapError};
use crate::hreflang::MergePrecedence;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Base URL the migrated sites publish their `query-index.json` under.
pub const QUERY_INDEX_BASE: &str = "https://main--shredit--stericycle.aem.page/";

/// File the external resolver persists its lookup table to.
pub const LOOKUP_TABLE_FILE: &str = "hreflangs.map.json";

/// Pages scraped concurrently per batch.
pub const BATCH_SIZE: usize = 100;

/// Pause between two batches of the same sitemap.
pub const BATCH_DELAY: Duration = Duration::from_secs(5);

/// Upper bound for a single page fetch.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(20);

/// Whether a site has moved to the new platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    /// Served from the new platform; has a structured page index.
    Migrated,
    /// Still on the legacy platform; only its sitemap and pages are visible.
    Unmigrated,
}

/// One country/language site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    /// Language code as used in `hreflang`, e.g. `en-US`.
    pub code: String,
    /// Site origin without trailing slash, e.g. `https://www.shredit.com`.
    pub site_url: String,
    /// Location of the site's current sitemap.
    pub sitemap_url: String,
    /// Decides whether the site is indexed or scraped.
    pub status: MigrationStatus,
    /// Set on exactly one migrated locale; its paths key the hreflang map.
    pub is_default: bool,
}

impl Locale {
    pub fn migrated(code: &str, site_url: &str, sitemap_url: &str) -> Self {
        Self::with_status(code, site_url, sitemap_url, MigrationStatus::Migrated)
    }

    pub fn unmigrated(code: &str, site_url: &str, sitemap_url: &str) -> Self {
        Self::with_status(code, site_url, sitemap_url, MigrationStatus::Unmigrated)
    }

    fn with_status(code: &str, site_url: &str, sitemap_url: &str, status: MigrationStatus) -> Self {
        Self {
            code: code.to_string(),
            site_url: site_url.trim_end_matches('/').to_string(),
            sitemap_url: sitemap_url.to_string(),
            status,
            is_default: false,
        }
    }

    /// Mark this locale as the default (reference) locale.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn is_migrated(&self) -> bool {
        self.status == MigrationStatus::Migrated
    }

    /// Absolute URL of a site-relative path on this locale's site.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.site_url)
        } else {
            format!("{}/{path}", self.site_url)
        }
    }

    /// Site-relative path of `url`: its path component with this locale's
    /// base path (if the site URL has one) stripped off, so that
    /// `url_for(local_path(u))` points back at `u`.
    pub fn local_path(&self, url: &url::Url) -> String {
        let path = url.path();
        let base = url::Url::parse(&self.site_url)
            .map(|u| u.path().trim_end_matches('/').to_string())
            .unwrap_or_default();

        if !base.is_empty() {
            if let Some(rest) = path.strip_prefix(base.as_str()) {
                if rest.is_empty() {
                    return "/".to_string();
                }
                if rest.starts_with('/') {
                    return rest.to_string();
                }
            }
        }
        path.to_string()
    }

    /// Lowercased code, used for directory names and index URLs.
    pub fn slug(&self) -> String {
        self.code.to_lowercase()
    }
}

/// The validated set of locales known to a run.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    locales: Vec<Locale>,
    default_index: usize,
}

impl SiteRegistry {
    /// Build a registry, rejecting duplicate codes and anything other than
    /// exactly one migrated default locale.
    pub fn new(locales: Vec<Locale>) -> Result<Self> {
        let mut seen = HashSet::new();
        for locale in &locales {
            if !seen.insert(locale.code.to_lowercase()) {
                return Err(SitemapError::InvalidRegistry(format!(
                    "duplicate locale {}",
                    locale.code
                )));
            }
        }

        let defaults: Vec<usize> = locales
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_default)
            .map(|(i, _)| i)
            .collect();

        let default_index = match defaults.as_slice() {
            [index] => *index,
            [] => {
                return Err(SitemapError::InvalidRegistry(
                    "no default locale".to_string(),
                ))
            }
            _ => {
                return Err(SitemapError::InvalidRegistry(
                    "more than one default locale".to_string(),
                ))
            }
        };

        if !locales[default_index].is_migrated() {
            return Err(SitemapError::InvalidRegistry(format!(
                "default locale {} is not migrated",
                locales[default_index].code
            )));
        }

        Ok(Self {
            locales,
            default_index,
        })
    }

    /// The compiled-in Shred-it site list.
    pub fn builtin() -> Self {
        let locales = vec![
            Locale::migrated(
                "en-US",
                "https://www.shredit.com",
                "https://www.shredit.com/en-us/sitemap.xml",
            )
            .as_default(),
            Locale::unmigrated(
                "en-CA",
                "https://www.shredit.com",
                "https://www.shredit.com/en-ca/sitemap.xml",
            ),
            Locale::unmigrated(
                "fr-CA",
                "https://www.shredit.com",
                "https://www.shredit.com/fr-ca/sitemap.xml",
            ),
            Locale::unmigrated(
                "en-GB",
                "https://www.shredit.co.uk",
                "https://www.shredit.co.uk/en-gb/sitemap.xml",
            ),
            Locale::unmigrated(
                "de-DE",
                "https://www.shredit.de",
                "https://www.shredit.de/de-de/sitemap.xml",
            ),
            Locale::unmigrated(
                "en-IE",
                "https://www.shredit.ie",
                "https://www.shredit.ie/en-ie/sitemap.xml",
            ),
            Locale::unmigrated(
                "pt-PT",
                "https://www.shredit.pt",
                "https://www.shredit.pt/pt-pt/sitemap.xml",
            ),
            Locale::unmigrated(
                "en-NL",
                "https://www.shredit.nl",
                "https://www.shredit.nl/en-nl/sitemap.xml",
            ),
            Locale::unmigrated(
                "nl-NL",
                "https://www.shredit.nl",
                "https://www.shredit.nl/nl-nl/sitemap.xml",
            ),
            Locale::unmigrated(
                "nl-BE",
                "https://www.shredit.be",
                "https://www.shredit.be/nl-be/sitemap.xml",
            ),
            Locale::unmigrated(
                "fr-BE",
                "https://www.shredit.be",
                "https://www.shredit.be/fr-be/sitemap.xml",
            ),
            Locale::unmigrated(
                "en-BE",
                "https://www.shredit.be",
                "https://www.shredit.be/en-be/sitemap.xml",
            ),
            Locale::unmigrated(
                "fr-FR",
                "https://www.shredit.fr",
                "https://www.shredit.fr/fr-fr/sitemap.xml",
            ),
            Locale::unmigrated(
                "en-LU",
                "https://www.shredit.lu",
                "https://www.shredit.lu/en-lu/sitemap.xml",
            ),
            Locale::unmigrated(
                "fr-LU",
                "https://www.shredit.lu",
                "https://www.shredit.lu/fr-lu/sitemap.xml",
            ),
            Locale::unmigrated(
                "es-ES",
                "https://www.shredit.es",
                "https://www.shredit.es/sitemap.xml",
            ),
        ];

        Self {
            locales,
            default_index: 0,
        }
    }

    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn default_locale(&self) -> &Locale {
        &self.locales[self.default_index]
    }

    pub fn get(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.code == code)
    }

    /// Whether `code` names a registered locale. Codes outside the registry
    /// never make it into an alternate-link block.
    pub fn is_known(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn is_unmigrated(&self, code: &str) -> bool {
        self.get(code).is_some_and(|l| !l.is_migrated())
    }

    pub fn migrated(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter().filter(|l| l.is_migrated())
    }

    pub fn unmigrated(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter().filter(|l| !l.is_migrated())
    }
}

/// Tunables for one run. `Default` yields the compiled-in constants.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Pages scraped concurrently per batch; values below 1 count as 1.
    pub batch_size: usize,
    /// Pause between two batches of the same sitemap.
    pub batch_delay: Duration,
    /// Upper bound for one legacy page fetch.
    pub page_timeout: Duration,
    /// Prefix of every `<slug>/query-index.json` URL.
    pub query_index_base: String,
    /// JSON file written by `fetch-external` and read by `generate`.
    pub lookup_table: PathBuf,
    /// Sitemaps are written to `<output_root>/<locale slug>/sitemap.xml`.
    pub output_root: PathBuf,
    /// Conflict rule when merging the lookup table into migrated data.
    pub precedence: MergePrecedence,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            batch_delay: BATCH_DELAY,
            page_timeout: PAGE_TIMEOUT,
            query_index_base: QUERY_INDEX_BASE.to_string(),
            lookup_table: PathBuf::from(LOOKUP_TABLE_FILE),
            output_root: PathBuf::from("../.."),
            precedence: MergePrecedence::default(),
        }
    }
}

impl Settings {
    /// Location of a migrated locale's structured page index.
    pub fn query_index_url(&self, locale: &Locale) -> String {
        let base = self.query_index_base.trim_end_matches('/');
        format!("{base}/{}/query-index.json", locale.slug())
    }

    /// Where a locale's generated sitemap is written.
    pub fn sitemap_path(&self, locale: &Locale) -> PathBuf {
        self.output_root.join(locale.slug()).join("sitemap.xml")
    }
}
