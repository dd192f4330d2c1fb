//! The provider contract every search source fulfills: construct,
//! refresh, search, and a static description. Fatal errors are typed with
//! `thiserror`; a separate, non-fatal `Warning` channel reports recoverable
//! load failures without aborting the whole aggregator.

use std::fmt;

use crate::relevance;

/// One ranked search result, carried across the provider/aggregator
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Relevance in `[relevance::MIN, relevance::MAX]`.
    pub relevance: i64,
    /// Primary display name.
    pub name: String,
    /// Command to execute if the item is selected.
    pub exec: String,
    /// Short description, possibly empty.
    pub description: String,
    /// Icon identifier or absolute path, possibly empty.
    pub icon: String,
}

/// A provider's static self-description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescription {
    pub short: &'static str,
    pub long: &'static str,
}

/// Fatal errors that propagate out of the provider/aggregator boundary.
#[derive(Debug, thiserror::Error)]
pub enum IndelveError {
    /// A named provider could not be constructed or could not discover
    /// its backing data at the platform level.
    #[error("could not load provider '{0}'")]
    ProviderLoad(String),
    /// Every requested provider was unknown or failed to construct.
    #[error("no providers could be loaded")]
    NoProviders,
    /// `Indelve::list_providers_with_descriptions` found a provider whose
    /// description didn't have the required shape. `ProviderDescription`
    /// is a fixed struct, so this can only occur if a provider impl
    /// returns an empty string where a real summary is expected.
    #[error("provider '{0}' has a malformed description")]
    DescriptionShape(String),
    /// `Indelve::search` was called with an empty query.
    #[error("query must not be empty")]
    EmptyQuery,
    /// A provider returned an `ItemRecord` violating the relevance-band
    /// invariant. This is a provider programming error, not a user error.
    #[error("provider '{0}' returned an invalid item record: {1}")]
    InvalidItemRecord(String, String),
}

/// Non-fatal, per-provider-query condition: this provider has nothing
/// useful to say about this particular query (e.g. it's empty, or too
/// short, or the wrong shape for this provider). The aggregator catches
/// this and simply skips the provider; it must never reach a caller of
/// `Indelve::search`.
#[derive(Debug, Clone, Copy)]
pub struct InapplicableQuery;

impl fmt::Display for InapplicableQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("query is inapplicable for this provider")
    }
}

impl std::error::Error for InapplicableQuery {}

/// A non-fatal event raised during construction or refresh. Delivered to
/// a `WarnSink` (see `aggregator`), never returned as an `Err`.
#[derive(Debug, Clone)]
pub enum Warning {
    /// `name` was requested but is unknown to the provider registry, or
    /// construction of a known provider failed.
    ProviderLoad { name: String, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ProviderLoad { name, reason } => {
                write!(f, "could not load provider '{name}': {reason}")
            }
        }
    }
}

/// The capability every search provider fulfills: construct, refresh,
/// search, and a static description.
///
/// `construct` is modeled as a free function returning `Self` (via the
/// provider registry in `aggregator`) rather than a trait method, since
/// Rust has no way to call an associated `fn new() -> Self` through a
/// trait object; the registry closure plays that role instead.
pub trait Provider: Send + Sync {
    /// Reload or incrementally update this provider's backing data.
    ///
    /// Providers with no index may make this a no-op. Must never fail
    /// user-visibly: internal per-item errors are swallowed.
    fn refresh(&self, force: bool);

    /// Search for `query`, already validated non-empty by the caller.
    ///
    /// Returns `Err(InapplicableQuery)` if this provider has nothing to
    /// say about `query`'s shape (not about whether it matches anything —
    /// an empty *result set* is not inapplicable, only an unusable query
    /// is). Any other error is fatal and must propagate.
    fn search(&self, query: &str) -> Result<Vec<ItemRecord>, ProviderSearchError>;

    /// This provider's static self-description.
    fn description(&self) -> ProviderDescription;
}

/// The error type `Provider::search` returns: either "this query doesn't
/// apply to me" (swallowed by the aggregator) or a genuine fatal failure.
#[derive(Debug, thiserror::Error)]
pub enum ProviderSearchError {
    #[error(transparent)]
    Inapplicable(#[from] InapplicableQuery),
    #[error("{0}")]
    Fatal(String),
}

/// Check the one `ItemRecord` invariant Rust's type system doesn't
/// already guarantee: the relevance band. Field presence and type are
/// enforced at compile time, so this is the whole of the runtime
/// validation needed at the aggregator/provider boundary.
pub fn validate_item_record(record: &ItemRecord) -> Result<(), String> {
    if record.relevance < relevance::MIN || record.relevance > relevance::MAX {
        return Err(format!(
            "relevance {} outside [{}, {}]",
            record.relevance,
            relevance::MIN,
            relevance::MAX
        ));
    }
    Ok(())
}
