//! Hreflang sitemap builder.
//!
//! Crawls the sitemaps of not-yet-migrated country sites to learn which of
//! their pages correspond to which default-locale page, persists that as a
//! lookup table, then combines it with the page indices of migrated sites to
//! write one `sitemap.xml` per migrated locale with `xhtml:link` alternates.

pub mod acquisition;
pub mod cartography;
pub mod cli;
pub mod config;
pub mod error;
pub mod hreflang;
pub mod pipeline;
pub mod sitemap;

pub use config::{Locale, MigrationStatus, Settings, SiteRegistry};
pub use error::SitemapError;
pub use hreflang::{AlternateLink, HreflangMap, MergePrecedence};

#[cfg(test)]
pub(crate) mod testing;
