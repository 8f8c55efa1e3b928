//! Runtime configuration for the stores and the sync engine.
//!
//! `StoreConfig` carries the deadlines applied by the timeout wrapper, the
//! search page size and the sync fan-out limit. Values come from defaults, an
//! optional JSON file, and `NOTESYNC_*` environment overrides, in that order.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_CACHE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_PAGE_SIZE: u32 = 30;
const DEFAULT_SYNC_CONCURRENCY: usize = 8;
/// Upper bound on `sync_concurrency`.
pub const MAX_SYNC_CONCURRENCY: usize = 1024;

const ENV_NETWORK_TIMEOUT_MS: &str = "NOTESYNC_NETWORK_TIMEOUT_MS";
const ENV_CACHE_TIMEOUT_MS: &str = "NOTESYNC_CACHE_TIMEOUT_MS";
const ENV_PAGE_SIZE: &str = "NOTESYNC_PAGE_SIZE";
const ENV_SYNC_CONCURRENCY: &str = "NOTESYNC_SYNC_CONCURRENCY";

/// Store and sync tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Deadline for every network store call, in milliseconds
    pub network_timeout_ms: u64,
    /// Deadline for every cache store call, in milliseconds
    pub cache_timeout_ms: u64,
    /// Notes per search page; page N returns the first N pages
    pub page_size: u32,
    /// Maximum number of per-note store calls a sync pass runs at once
    pub sync_concurrency: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            network_timeout_ms: DEFAULT_NETWORK_TIMEOUT_MS,
            cache_timeout_ms: DEFAULT_CACHE_TIMEOUT_MS,
            page_size: DEFAULT_PAGE_SIZE,
            sync_concurrency: DEFAULT_SYNC_CONCURRENCY,
        }
    }
}

impl StoreConfig {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&raw)?;
        config.validated()
    }

    /// Apply `NOTESYNC_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = read_override(&lookup, ENV_NETWORK_TIMEOUT_MS)? {
            self.network_timeout_ms = value;
        }
        if let Some(value) = read_override(&lookup, ENV_CACHE_TIMEOUT_MS)? {
            self.cache_timeout_ms = value;
        }
        if let Some(value) = read_override(&lookup, ENV_PAGE_SIZE)? {
            self.page_size = value;
        }
        if let Some(value) = read_override(&lookup, ENV_SYNC_CONCURRENCY)? {
            self.sync_concurrency = value;
        }
        self.validated()
    }

    /// Deadline applied to network calls
    pub const fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }

    /// Deadline applied to cache calls
    pub const fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    fn validated(self) -> Result<Self> {
        if self.network_timeout_ms == 0 || self.cache_timeout_ms == 0 {
            return Err(Error::InvalidInput(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(Error::InvalidInput(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.sync_concurrency == 0 || self.sync_concurrency > MAX_SYNC_CONCURRENCY {
            return Err(Error::InvalidInput(format!(
                "sync_concurrency must be between 1 and {MAX_SYNC_CONCURRENCY}"
            )));
        }
        Ok(self)
    }
}

fn read_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = normalize_text_option(lookup(key)) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| Error::InvalidInput(format!("{key} has invalid value '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = StoreConfig::default().validated().unwrap();
        assert_eq!(config.page_size, 30);
        assert_eq!(config.network_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn overrides_replace_only_present_keys() {
        let env = HashMap::from([
            (ENV_PAGE_SIZE, "10".to_string()),
            (ENV_NETWORK_TIMEOUT_MS, " 250 ".to_string()),
            (ENV_CACHE_TIMEOUT_MS, "   ".to_string()),
        ]);
        let config = StoreConfig::default()
            .with_overrides(|key| env.get(key).cloned())
            .unwrap();

        assert_eq!(
            config,
            StoreConfig {
                network_timeout_ms: 250,
                page_size: 10,
                ..StoreConfig::default()
            }
        );
    }

    #[test]
    fn overrides_reject_garbage_and_zero() {
        let error = StoreConfig::default()
            .with_overrides(|key| (key == ENV_PAGE_SIZE).then(|| "many".to_string()))
            .unwrap_err();
        assert!(error.to_string().contains(ENV_PAGE_SIZE));

        assert!(StoreConfig::default()
            .with_overrides(|key| (key == ENV_SYNC_CONCURRENCY).then(|| "0".to_string()))
            .is_err());
    }

    #[test]
    fn overrides_reject_oversized_concurrency() {
        let error = StoreConfig::default()
            .with_overrides(|key| (key == ENV_SYNC_CONCURRENCY).then(|| usize::MAX.to_string()))
            .unwrap_err();
        assert!(error.to_string().contains("sync_concurrency"));

        let config = StoreConfig::default()
            .with_overrides(|key| {
                (key == ENV_SYNC_CONCURRENCY).then(|| MAX_SYNC_CONCURRENCY.to_string())
            })
            .unwrap();
        assert_eq!(config.sync_concurrency, MAX_SYNC_CONCURRENCY);
    }

    #[test]
    fn oversized_concurrency_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notesync.json");
        std::fs::write(&path, format!(r#"{{ "sync_concurrency": {} }}"#, usize::MAX)).unwrap();

        assert!(StoreConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn load_from_path_reads_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notesync.json");
        std::fs::write(&path, r#"{ "page_size": 5 }"#).unwrap();

        let config = StoreConfig::load_from_path(&path).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.sync_concurrency, DEFAULT_SYNC_CONCURRENCY);

        std::fs::write(&path, r#"{ "page_sise": 5 }"#).unwrap();
        assert!(StoreConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn load_from_missing_path_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, StoreConfig::default());
    }
}
