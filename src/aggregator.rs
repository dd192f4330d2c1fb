//! `Indelve`: the aggregator that owns a set of providers, fans queries
//! out to all of them, merges the results, and reports load failures as
//! warnings rather than aborting construction.

use once_cell::sync::Lazy;
use rayon::prelude::*;

use crate::applications::ApplicationsProvider;
use crate::provider::{validate_item_record, IndelveError, ItemRecord, Provider, ProviderDescription, ProviderSearchError, Warning};

/// Receives non-fatal `Warning`s raised while constructing or refreshing
/// providers. Injectable so callers (tests, alternate front ends) can
/// capture warnings instead of the default stderr emission, rather than
/// writing to a global mutable sink.
pub trait WarnSink: Send + Sync {
    fn warn(&self, warning: Warning);
}

/// The default sink: logs at `warn` level via the `log` facade.
pub struct LogWarnSink;

impl WarnSink for LogWarnSink {
    fn warn(&self, warning: Warning) {
        log::warn!("{warning}");
    }
}

type ProviderFactory = fn() -> Box<dyn Provider>;

/// The static registry of provider names this binary knows how to
/// construct, in registration order — an ordered list rather than a hash
/// map, so that `construct_all`'s provider set (and therefore the
/// tie-break order results from different providers sort by) stays
/// deterministic across runs.
static PROVIDER_REGISTRY: Lazy<Vec<(&'static str, ProviderFactory)>> =
    Lazy::new(|| vec![("applications", || Box::new(ApplicationsProvider::construct()))]);

fn lookup_provider(name: &str) -> Option<ProviderFactory> {
    PROVIDER_REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, factory)| *factory)
}

struct LoadedProvider {
    name: String,
    provider: Box<dyn Provider>,
}

/// The aggregator: holds every successfully constructed provider in
/// registration order and exposes the merged search surface.
pub struct Indelve {
    providers: Vec<LoadedProvider>,
}

impl Indelve {
    /// Construct an aggregator over exactly the named providers.
    ///
    /// Unknown names and providers whose construction fails are reported
    /// to `sink` as `Warning::ProviderLoad` and simply excluded — they do
    /// not abort the whole construction. If, after filtering, no provider
    /// survived, `IndelveError::NoProviders` is returned.
    pub fn construct(names: &[&str], sink: &dyn WarnSink) -> Result<Self, IndelveError> {
        let mut providers = Vec::new();
        for &name in names {
            match lookup_provider(name) {
                Some(factory) => providers.push(LoadedProvider {
                    name: name.to_string(),
                    provider: factory(),
                }),
                None => sink.warn(Warning::ProviderLoad {
                    name: name.to_string(),
                    reason: "unknown provider".to_string(),
                }),
            }
        }
        if providers.is_empty() {
            return Err(IndelveError::NoProviders);
        }
        Ok(Self { providers })
    }

    /// Construct an aggregator over every registered provider.
    pub fn construct_all(sink: &dyn WarnSink) -> Result<Self, IndelveError> {
        let names: Vec<&str> = PROVIDER_REGISTRY.iter().map(|(name, _)| *name).collect();
        Self::construct(&names, sink)
    }

    /// The short names of every provider currently loaded, in
    /// registration order.
    pub fn list_providers(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name.as_str()).collect()
    }

    /// The short names paired with their static descriptions.
    pub fn list_providers_with_descriptions(&self) -> Vec<(&str, ProviderDescription)> {
        self.providers
            .iter()
            .map(|p| (p.name.as_str(), p.provider.description()))
            .collect()
    }

    /// Refresh every loaded provider concurrently.
    pub fn refresh(&self, force: bool) {
        self.providers.par_iter().for_each(|p| p.provider.refresh(force));
    }

    /// Search every loaded provider concurrently and merge the results.
    ///
    /// Each provider's items are validated (`validate_item_record`) before
    /// being folded into the merged set — a provider returning an
    /// out-of-band relevance is a fatal `IndelveError`, not a warning,
    /// since it signals a programming error rather than an environmental
    /// one. Results are sorted by relevance, descending, with ties broken
    /// by provider registration order and then by each provider's own
    /// result order — never by a timestamp, since two results can share a
    /// relevance and still need a stable, reproducible order.
    pub fn search(&self, query: &str) -> Result<Vec<ItemRecord>, IndelveError> {
        if query.trim().is_empty() {
            return Err(IndelveError::EmptyQuery);
        }

        let per_provider: Vec<Result<Vec<ItemRecord>, IndelveError>> = self
            .providers
            .par_iter()
            .map(|loaded| match loaded.provider.search(query) {
                Ok(items) => {
                    for item in &items {
                        if let Err(reason) = validate_item_record(item) {
                            return Err(IndelveError::InvalidItemRecord(loaded.name.clone(), reason));
                        }
                    }
                    Ok(items)
                }
                Err(ProviderSearchError::Inapplicable(_)) => Ok(Vec::new()),
                Err(ProviderSearchError::Fatal(reason)) => Err(IndelveError::ProviderLoad(format!(
                    "{}: {reason}",
                    loaded.name
                ))),
            })
            .collect();

        let mut merged = Vec::new();
        for (slot, result) in per_provider.into_iter().enumerate() {
            let items = result?;
            for (index, item) in items.into_iter().enumerate() {
                merged.push((slot, index, item));
            }
        }
        merged.sort_by(|a, b| {
            b.2.relevance
                .cmp(&a.2.relevance)
                .then(a.0.cmp(&b.0))
                .then(a.1.cmp(&b.1))
        });
        Ok(merged.into_iter().map(|(_, _, item)| item).collect())
    }
}

/// A `WarnSink` that collects warnings in-memory instead of logging them,
/// used by tests and by callers that want to report warnings themselves.
pub struct CollectingWarnSink {
    warnings: std::sync::Mutex<Vec<Warning>>,
}

impl CollectingWarnSink {
    pub fn new() -> Self {
        Self {
            warnings: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings.into_inner().unwrap_or_default()
    }
}

impl Default for CollectingWarnSink {
    fn default() -> Self {
        Self::new()
    }
}

impl WarnSink for CollectingWarnSink {
    fn warn(&self, warning: Warning) {
        self.warnings.lock().unwrap().push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ENV_LOCK;
    use std::fs;

    fn with_empty_xdg_home() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("applications")).unwrap();
        unsafe {
            std::env::set_var("XDG_DATA_HOME", tmp.path());
            std::env::set_var("XDG_DATA_DIRS", "/nonexistent-for-test");
        }
        tmp
    }

    #[test]
    fn unknown_provider_warns_and_the_rest_still_load() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _tmp = with_empty_xdg_home();
        let sink = CollectingWarnSink::new();
        let indelve = Indelve::construct(&["applications", "bogus"], &sink).unwrap();
        assert_eq!(indelve.list_providers(), vec!["applications"]);
        assert_eq!(sink.into_warnings().len(), 1);
    }

    #[test]
    fn all_providers_unknown_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _tmp = with_empty_xdg_home();
        let sink = CollectingWarnSink::new();
        let result = Indelve::construct(&["bogus"], &sink);
        assert!(matches!(result, Err(IndelveError::NoProviders)));
    }

    #[test]
    fn search_rejects_empty_query() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _tmp = with_empty_xdg_home();
        let sink = CollectingWarnSink::new();
        let indelve = Indelve::construct(&["applications"], &sink).unwrap();
        assert!(matches!(indelve.search(""), Err(IndelveError::EmptyQuery)));
    }

    #[test]
    fn search_merges_and_sorts_descending() {
        let _guard = ENV_LOCK.lock().unwrap();
        let tmp = with_empty_xdg_home();
        let apps = tmp.path().join("applications");
        fs::write(
            apps.join("gimp.desktop"),
            "[Desktop Entry]\nType=Application\nName=GIMP\nExec=gimp\n",
        )
        .unwrap();
        fs::write(
            apps.join("weak.desktop"),
            "[Desktop Entry]\nType=Application\nName=Something with gimp in a comment\nExec=weak\nComment=gimp related\n",
        )
        .unwrap();

        let sink = CollectingWarnSink::new();
        let indelve = Indelve::construct(&["applications"], &sink).unwrap();
        let results = indelve.search("gimp").unwrap();
        assert!(results.len() >= 2);
        assert!(results.windows(2).all(|w| w[0].relevance >= w[1].relevance));
    }
}
