//! Structured page index published by migrated sites.
//!
//! Each migrated locale exposes a `query-index.json` of the shape
//! `{ "data": [ { "path", "lastModified", "robots", "primary-language-url" } ] }`.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Robots directives that keep a page out of the sitemap.
const EXCLUDING_DIRECTIVES: &[&str] = &["noindex", "drafts"];

/// One page of a migrated locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Site-relative path of the page, e.g. `/en-us/about`.
    pub path: String,
    /// Epoch seconds. Numbers and numeric strings are accepted; zero and
    /// garbage read as absent.
    #[serde(
        rename = "lastModified",
        default,
        deserialize_with = "deserialize_epoch"
    )]
    pub last_modified: Option<i64>,
    /// Free-text robots directives, e.g. `noindex, nofollow`.
    #[serde(default)]
    pub robots: Option<String>,
    /// Path of the default-locale page this page translates.
    #[serde(rename = "primary-language-url", default)]
    pub primary_language_url: Option<String>,
}

impl PageRecord {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    /// False when the robots text carries a `noindex` or `drafts` marker.
    pub fn is_indexable(&self) -> bool {
        let robots = self.robots.as_deref().unwrap_or_default();
        !EXCLUDING_DIRECTIVES.iter().any(|d| robots.contains(d))
    }

    /// The declared default-locale path, with blanks treated as absent.
    pub fn primary_path(&self) -> Option<&str> {
        self.primary_language_url
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// `YYYY-MM-DD` (UTC) of the last modification.
    pub fn lastmod_date(&self) -> Option<String> {
        let secs = self.last_modified?;
        chrono::DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
    }
}

/// A decoded `query-index.json`.
#[derive(Debug, Clone, Default)]
pub struct QueryIndex {
    pub data: Vec<PageRecord>,
    /// Rows dropped for lacking a usable `path`.
    pub skipped: usize,
}

impl QueryIndex {
    /// Records that survive the robots filter, in index order.
    pub fn indexable(self) -> Vec<PageRecord> {
        self.data.into_iter().filter(PageRecord::is_indexable).collect()
    }
}

#[derive(Deserialize)]
struct RawIndex {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Decode a page index.
///
/// Only a malformed document is an error. A row that does not decode, or
/// whose `path` is missing or blank, is logged and skipped.
pub fn parse_query_index(json: &str) -> Result<QueryIndex> {
    let raw: RawIndex = serde_json::from_str(json)?;
    let mut index = QueryIndex::default();

    for (row, value) in raw.data.into_iter().enumerate() {
        match serde_json::from_value::<PageRecord>(value) {
            Ok(record) if !record.path.trim().is_empty() => index.data.push(record),
            Ok(_) => {
                warn!("skipping query index row {row}: empty path");
                index.skipped += 1;
            }
            Err(e) => {
                warn!("skipping query index row {row}: {e}");
                index.skipped += 1;
            }
        }
    }

    Ok(index)
}

fn deserialize_epoch<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let secs = match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    };
    Ok(secs.filter(|s| *s > 0))
}
