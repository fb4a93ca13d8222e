//! The hreflang map aggregate.
//!
//! Keys are default-locale paths (`/about`); each value maps a locale code
//! to that locale's path for the same page. A run builds one map, hands it
//! by reference through the phases, and drops it at the end. Ordered maps
//! keep every serialization and every alternate-link block deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locale code -> local path.
pub type LocalePaths = BTreeMap<String, String>;

/// Which side wins when the persisted table and the freshly built map both
/// define the same locale under the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePrecedence {
    /// Migrated-site data built this run is kept.
    #[default]
    MigratedWins,
    /// Persisted external data overwrites.
    ExternalWins,
}

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Keys present only in the external table.
    pub keys_added: usize,
    /// Locale entries added under keys that already existed.
    pub entries_added: usize,
    /// Conflicting entries overwritten by the external value.
    pub entries_replaced: usize,
    /// Conflicting entries where the existing value was kept.
    pub entries_kept: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HreflangMap {
    entries: BTreeMap<String, LocalePaths>,
}

impl HreflangMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `path` as a key holding its own default-locale self-entry.
    pub fn seed(&mut self, path: &str, default_locale: &str) {
        self.entries
            .entry(path.to_string())
            .or_default()
            .insert(default_locale.to_string(), path.to_string());
    }

    /// Attach `locale -> path` under an existing `key`.
    ///
    /// Returns `false` (and changes nothing) when `key` is unknown; such a
    /// page simply gets no alternates.
    pub fn attach(&mut self, key: &str, locale: &str, path: &str) -> bool {
        match self.entries.get_mut(key) {
            Some(paths) => {
                paths.insert(locale.to_string(), path.to_string());
                true
            }
            None => false,
        }
    }

    /// Record `locale -> path` under `key`, creating the key if needed.
    pub fn record(&mut self, key: &str, locale: &str, path: &str) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .insert(locale.to_string(), path.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&LocalePaths> {
        self.entries.get(key)
    }

    /// Path of `locale` under `key`.
    pub fn path_for(&self, key: &str, locale: &str) -> Option<&str> {
        self.entries.get(key)?.get(locale).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of locale entries across all keys.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LocalePaths)> {
        self.entries.iter()
    }

    /// Copy of this map keeping only locales accepted by `keep`; keys left
    /// without any locale are dropped.
    pub fn restrict_to(&self, keep: impl Fn(&str) -> bool) -> HreflangMap {
        let entries = self
            .entries
            .iter()
            .filter_map(|(key, paths)| {
                let kept: LocalePaths = paths
                    .iter()
                    .filter(|(code, _)| keep(code.as_str()))
                    .map(|(code, path)| (code.clone(), path.clone()))
                    .collect();
                (!kept.is_empty()).then(|| (key.clone(), kept))
            })
            .collect();
        HreflangMap { entries }
    }

    /// Fold a persisted external table into this map.
    ///
    /// Missing keys are created. A locale already present under a key is
    /// only overwritten with [`MergePrecedence::ExternalWins`]. Merging the
    /// same table again changes nothing.
    pub fn merge_external(
        &mut self,
        external: &HreflangMap,
        precedence: MergePrecedence,
    ) -> MergeStats {
        let mut stats = MergeStats::default();

        for (key, paths) in &external.entries {
            if !self.entries.contains_key(key) {
                stats.keys_added += 1;
            }
            let target = self.entries.entry(key.clone()).or_default();

            for (code, path) in paths {
                match target.get(code) {
                    None => {
                        target.insert(code.clone(), path.clone());
                        stats.entries_added += 1;
                    }
                    Some(existing) if existing == path => {}
                    Some(_) => match precedence {
                        MergePrecedence::MigratedWins => stats.entries_kept += 1,
                        MergePrecedence::ExternalWins => {
                            target.insert(code.clone(), path.clone());
                            stats.entries_replaced += 1;
                        }
                    },
                }
            }
        }

        stats
    }
}

impl FromIterator<(String, LocalePaths)> for HreflangMap {
    fn from_iter<I: IntoIterator<Item = (String, LocalePaths)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(pairs: &[(&str, &str)]) -> LocalePaths {
        pairs
            .iter()
            .map(|(c, p)| (c.to_string(), p.to_string()))
            .collect()
    }

    #[test]
    fn test_seed_creates_self_entry() {
        let mut map = HreflangMap::new();
        map.seed("/about", "en-US");
        assert_eq!(map.path_for("/about", "en-US"), Some("/about"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_attach_requires_existing_key() {
        let mut map = HreflangMap::new();
        map.seed("/about", "en-US");

        assert!(map.attach("/about", "es-US", "/es/acerca"));
        assert!(!map.attach("/dangling", "es-US", "/es/x"));

        assert_eq!(map.path_for("/about", "es-US"), Some("/es/acerca"));
        assert!(!map.contains_key("/dangling"));
    }

    #[test]
    fn test_record_creates_key() {
        let mut map = HreflangMap::new();
        map.record("/about", "fr-CA", "/fr-ca/a-propos");
        assert_eq!(map.get("/about"), Some(&paths(&[("fr-CA", "/fr-ca/a-propos")])));
    }

    #[test]
    fn test_merge_adds_keys_and_locales() {
        let mut map = HreflangMap::new();
        map.seed("/about", "en-US");

        let external: HreflangMap = [
            ("/about".to_string(), paths(&[("fr-CA", "/fr-ca/a-propos")])),
            ("/legacy".to_string(), paths(&[("de-DE", "/de-de/alt")])),
        ]
        .into_iter()
        .collect();

        let stats = map.merge_external(&external, MergePrecedence::MigratedWins);
        assert_eq!(stats.keys_added, 1);
        assert_eq!(stats.entries_added, 2);
        assert_eq!(map.path_for("/about", "en-US"), Some("/about"));
        assert_eq!(map.path_for("/about", "fr-CA"), Some("/fr-ca/a-propos"));
        assert_eq!(map.path_for("/legacy", "de-DE"), Some("/de-de/alt"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut map = HreflangMap::new();
        map.seed("/about", "en-US");
        map.seed("/contact", "en-US");

        let external: HreflangMap = [
            ("/about".to_string(), paths(&[("fr-CA", "/fr-ca/a-propos"), ("en-US", "/old-about")])),
            ("/new".to_string(), paths(&[("en-GB", "/en-gb/new")])),
        ]
        .into_iter()
        .collect();

        for precedence in [MergePrecedence::MigratedWins, MergePrecedence::ExternalWins] {
            let mut once = map.clone();
            once.merge_external(&external, precedence);

            let mut twice = once.clone();
            let second = twice.merge_external(&external, precedence);

            assert_eq!(once, twice);
            assert_eq!(second.keys_added, 0);
            assert_eq!(second.entries_added, 0);
            assert_eq!(second.entries_replaced, 0);
        }
    }

    #[test]
    fn test_merge_precedence_migrated_wins() {
        let mut map = HreflangMap::new();
        map.seed("/about", "en-US");
        let external: HreflangMap = [("/about".to_string(), paths(&[("en-US", "/stale")]))]
            .into_iter()
            .collect();

        let stats = map.merge_external(&external, MergePrecedence::MigratedWins);
        assert_eq!(stats.entries_kept, 1);
        assert_eq!(map.path_for("/about", "en-US"), Some("/about"));
    }

    #[test]
    fn test_merge_precedence_external_wins() {
        let mut map = HreflangMap::new();
        map.seed("/about", "en-US");
        let external: HreflangMap = [("/about".to_string(), paths(&[("en-US", "/stale")]))]
            .into_iter()
            .collect();

        let stats = map.merge_external(&external, MergePrecedence::ExternalWins);
        assert_eq!(stats.entries_replaced, 1);
        assert_eq!(map.path_for("/about", "en-US"), Some("/stale"));
    }

    #[test]
    fn test_restrict_to_drops_empty_keys() {
        let mut map = HreflangMap::new();
        map.seed("/about", "en-US");
        map.record("/about", "fr-CA", "/fr-ca/a-propos");
        map.seed("/contact", "en-US");

        let restricted = map.restrict_to(|code| code != "en-US");
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted.path_for("/about", "fr-CA"), Some("/fr-ca/a-propos"));
        assert_eq!(restricted.path_for("/about", "en-US"), None);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut map = HreflangMap::new();
        map.record("/about", "fr-CA", "/fr-ca/a-propos");
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"/about": {"fr-CA": "/fr-ca/a-propos"}}));
    }
}
