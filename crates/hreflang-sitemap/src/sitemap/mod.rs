//! Output sitemaps: assembly of entries and XML serialization.

pub mod assembler;
pub mod writer;

pub use assembler::{Sitemap, SitemapAssembler, UrlEntry, X_DEFAULT};
pub use writer::{render_sitemap, write_sitemap};
