//! Configuration types shared across the orchestrator and connectors.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What a bounded fan-out does when one of its tasks fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BatchPolicy {
    /// Abort on the first failure and return it, dropping outstanding tasks.
    #[default]
    FailFast,
    /// Run every task and report failures next to successes.
    Partial,
}

/// Settings for the exchange metadata cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Never contact upstream for metadata; serve the persisted snapshot only.
    pub offline: bool,
    /// Where the snapshot is persisted.
    pub snapshot_path: PathBuf,
    /// Maximum age of any exchange entry before a background refresh is spawned.
    pub staleness: Duration,
    /// Parallelism ceiling for per-symbol onboarding lookups.
    pub onboard_concurrency: usize,
    /// Failure policy for onboarding lookups.
    pub batch_policy: BatchPolicy,
    /// After a failed refresh, stale reads wait this long before retrying.
    pub retry_backoff: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            offline: false,
            snapshot_path: PathBuf::from("./data/exchange.json"),
            staleness: Duration::from_secs(8 * 60 * 60),
            onboard_concurrency: 20,
            batch_policy: BatchPolicy::FailFast,
            retry_backoff: Duration::from_secs(60),
        }
    }
}

/// Global configuration for the `Marlin` orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarlinConfig {
    /// Timeout for individual provider requests.
    pub provider_timeout: Duration,
    /// Number of entries in every fixed-step series.
    pub fixed_capacity: usize,
    /// Number of rows requested by the latest-candles route.
    pub latest_limit: usize,
    /// Requests starting further than this in the future are answered without
    /// contacting upstream.
    pub future_guard: Duration,
    /// Metadata cache settings.
    pub cache: CacheConfig,
}

impl Default for MarlinConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(5),
            fixed_capacity: 1000,
            latest_limit: 99,
            future_guard: Duration::from_secs(15 * 60),
            cache: CacheConfig::default(),
        }
    }
}
