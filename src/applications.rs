//! The applications `Provider`: the only search source this crate ships,
//! backed by the XDG desktop-entry index and the substring/acronym
//! scoring engine.
//!
//! The index lives behind an `ArcSwap`, swapped wholesale by `refresh` so
//! a concurrent `search` always sees either the old index or the new one,
//! never a half-updated one.

use arc_swap::ArcSwap;

use crate::appindex::{AppRecord, Index};
use crate::provider::{InapplicableQuery, ItemRecord, Provider, ProviderDescription, ProviderSearchError};
use crate::scoring::{self, Field};
use crate::util::fold_case;

/// The built-in applications provider: ranks installed `.desktop` entries
/// against a query using substring and acronym matching.
pub struct ApplicationsProvider {
    index: ArcSwap<Index>,
}

impl ApplicationsProvider {
    /// Build the provider and perform its first full index load.
    pub fn construct() -> Self {
        Self {
            index: ArcSwap::from_pointee(Index::load()),
        }
    }

    fn score_record(record: &AppRecord, query_folded: &str) -> i64 {
        let name_folded = fold_case(record.name());
        let generic_folded = fold_case(record.generic_name());
        let comment_folded = fold_case(record.comment());

        let substring = scoring::substring_score(
            &[
                (name_folded.as_str(), Field::Name),
                (comment_folded.as_str(), Field::Comment),
                (generic_folded.as_str(), Field::GenericName),
            ],
            query_folded,
        );
        let acronym = scoring::acronym_score(
            &[
                (name_folded.as_str(), record.name(), Field::Name),
                (generic_folded.as_str(), record.generic_name(), Field::GenericName),
            ],
            query_folded,
        );
        scoring::combine(substring, acronym)
    }
}

impl Provider for ApplicationsProvider {
    fn refresh(&self, force: bool) {
        // Clone-and-swap: a concurrent `search` keeps reading the old
        // snapshot undisturbed until this store completes, instead of
        // mutating the published index in place.
        let mut next = (**self.index.load()).clone();
        next.refresh(force);
        self.index.store(std::sync::Arc::new(next));
    }

    fn search(&self, query: &str) -> Result<Vec<ItemRecord>, ProviderSearchError> {
        if query.trim().is_empty() {
            return Err(ProviderSearchError::Inapplicable(InapplicableQuery));
        }
        let query_folded = fold_case(query);
        let snapshot = self.index.load();

        // Unsorted: the caller is responsible for ordering results,
        // including across other providers' results.
        let results: Vec<ItemRecord> = snapshot
            .records()
            .iter()
            .filter_map(|record| {
                let relevance = Self::score_record(record, &query_folded);
                if relevance <= 0 {
                    return None;
                }
                Some(ItemRecord {
                    relevance,
                    name: record.name().to_string(),
                    exec: record.exec().to_string(),
                    description: record.comment().to_string(),
                    icon: record.icon().to_string(),
                })
            })
            .collect();
        Ok(results)
    }

    fn description(&self) -> ProviderDescription {
        ProviderDescription {
            short: "applications",
            long: "Installed desktop applications, discovered via the XDG application directories",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ENV_LOCK;
    use std::fs;

    fn write_entry(dir: &std::path::Path, filename: &str, body: &str) {
        fs::write(dir.join(filename), body).unwrap();
    }

    #[test]
    fn search_ranks_a_clear_substring_match_above_a_weak_one() {
        let _guard = ENV_LOCK.lock().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let apps = tmp.path().join("applications");
        fs::create_dir_all(&apps).unwrap();
        write_entry(
            &apps,
            "gimp.desktop",
            "[Desktop Entry]\nType=Application\nName=GIMP Image Editor\nExec=gimp\nGenericName=Image Editor\n",
        );
        write_entry(
            &apps,
            "unrelated.desktop",
            "[Desktop Entry]\nType=Application\nName=Unrelated Tool\nExec=unrelated\n",
        );

        unsafe {
            std::env::set_var("XDG_DATA_HOME", tmp.path());
            std::env::set_var("XDG_DATA_DIRS", "/nonexistent-for-test");
        }

        let provider = ApplicationsProvider::construct();
        let results = provider.search("gimp").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "GIMP Image Editor");
    }

    #[test]
    fn search_rejects_empty_query() {
        let _guard = ENV_LOCK.lock().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("applications")).unwrap();
        unsafe {
            std::env::set_var("XDG_DATA_HOME", tmp.path());
            std::env::set_var("XDG_DATA_DIRS", "/nonexistent-for-test");
        }
        let provider = ApplicationsProvider::construct();
        assert!(matches!(
            provider.search("   "),
            Err(ProviderSearchError::Inapplicable(_))
        ));
    }
}
