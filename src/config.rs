//! Configuration management for indelve.
//!
//! A small load-merge-defaults layer: a partial TOML file on disk is
//! merged onto `Config::default()`, so a user only needs to mention the
//! settings they want to override. Per-provider tuning (e.g. a future
//! scoring weight override) is left for a provider to read on its own,
//! not centralized here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default maximum number of results `Indelve::search` callers should
/// request from the CLI layer; the library itself never truncates.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// The default provider set used when no `--providers` flag is given.
pub fn default_providers() -> Vec<String> {
    vec!["applications".to_string()]
}

/// Indelve's runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider short names to load, in order.
    pub providers: Vec<String>,
    /// Maximum number of results the CLI prints by default.
    pub max_results: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// The on-disk TOML shape; every field optional so a partial file only
/// overrides what it mentions.
#[derive(Deserialize, Serialize, Default)]
struct TomlConfig {
    search: Option<SearchConfig>,
}

#[derive(Deserialize, Serialize)]
struct SearchConfig {
    providers: Option<Vec<String>>,
    max_results: Option<usize>,
}

/// `$XDG_CONFIG_HOME/indelve/indelve.toml`, defaulting to
/// `$HOME/.config/indelve/indelve.toml`.
pub fn config_path() -> PathBuf {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_home.join("indelve").join("indelve.toml")
}

/// Load configuration from the user's config file, writing a default one
/// out if none exists yet. Any read or parse failure falls back to
/// `Config::default()` with a logged warning rather than aborting —
/// configuration is never allowed to be a fatal concern.
pub fn load() -> Config {
    let path = config_path();

    if !path.exists() {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let _ = std::fs::write(&path, default_toml());
        return Config::default();
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("failed to read config file {}: {e}. Using defaults.", path.display());
            return Config::default();
        }
    };
    apply_toml(&content)
}

/// Parse `content` as TOML and merge it onto `Config::default()`. Invalid
/// TOML falls back to all-defaults with a logged warning; a field absent
/// from an otherwise-valid document simply keeps its default value.
fn apply_toml(content: &str) -> Config {
    let mut cfg = Config::default();

    let toml_cfg: TomlConfig = match toml::from_str(content) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("failed to parse config: {e}. Using defaults.");
            return cfg;
        }
    };

    if let Some(search) = toml_cfg.search {
        if let Some(providers) = search.providers {
            cfg.providers = providers;
        }
        if let Some(max_results) = search.max_results {
            cfg.max_results = max_results;
        }
    }

    cfg
}

/// A commented template written the first time a user runs the binary
/// with no config file present yet.
fn default_toml() -> String {
    format!(
        "# indelve configuration\n\n[search]\n# Provider short names to load, in order.\nproviders = {:?}\n# Maximum number of results the CLI prints by default.\nmax_results = {}\n",
        default_providers(),
        DEFAULT_MAX_RESULTS
    )
}
