//! Persisted lookup table.
//!
//! The external resolver writes its map as pretty-printed JSON; the sitemap
//! generator reads it back. This file is the only state shared between the
//! two phases.

use super::HreflangMap;
use crate::error::{Result, SitemapError};
use std::path::Path;
use tracing::{info, warn};

/// Read a lookup table.
pub async fn load_lookup_table(path: &Path) -> Result<HreflangMap> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SitemapError::io(path, e))?;
    Ok(serde_json::from_str(&data)?)
}

/// Read a lookup table, falling back to an empty one on any failure.
pub async fn load_or_empty(path: &Path) -> HreflangMap {
    match load_lookup_table(path).await {
        Ok(map) => {
            info!("loaded {} external hreflang keys from {}", map.len(), path.display());
            map
        }
        Err(e) => {
            warn!("failed to load hreflang map, continuing without external data: {e}");
            HreflangMap::new()
        }
    }
}

/// Write a lookup table, creating parent directories.
pub async fn save_lookup_table(path: &Path, map: &HreflangMap) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SitemapError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(map)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| SitemapError::io(path, e))
}
