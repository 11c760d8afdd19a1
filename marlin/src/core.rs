use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use marlin_core::{
    AssetIdentifier, BatchPolicy, Capability, MarlinConfig, MarlinConnector, MarlinError,
};

use crate::cache::{ConnectorSource, ExchangeInfoCache, ExchangeListSource, SnapshotStore};

/// Orchestrator that routes requests to registered connectors and owns the
/// exchange metadata cache.
pub struct Marlin {
    pub(crate) connectors: Vec<Arc<dyn MarlinConnector>>,
    pub(crate) cfg: MarlinConfig,
    pub(crate) cache: ExchangeInfoCache,
}

/// Builder for constructing a `Marlin` orchestrator with custom configuration.
pub struct MarlinBuilder {
    connectors: Vec<Arc<dyn MarlinConnector>>,
    cfg: MarlinConfig,
    source: Option<Arc<dyn ExchangeListSource>>,
}

impl Default for MarlinBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MarlinBuilder {
    /// Create a new builder with default configuration and no connectors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            cfg: MarlinConfig::default(),
            source: None,
        }
    }

    /// Register a connector.
    ///
    /// Registration order is the order of exchange entries in the metadata
    /// snapshot. Each connector must cover a distinct broker + exchange scope.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn MarlinConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: MarlinConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the per-provider request timeout.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Number of entries in every fixed-step series.
    #[must_use]
    pub const fn fixed_capacity(mut self, capacity: usize) -> Self {
        self.cfg.fixed_capacity = capacity;
        self
    }

    /// Number of rows the latest route asks for.
    #[must_use]
    pub const fn latest_limit(mut self, limit: usize) -> Self {
        self.cfg.latest_limit = limit;
        self
    }

    /// How far in the future a fixed-step start may lie before upstream is skipped.
    #[must_use]
    pub const fn future_guard(mut self, guard: Duration) -> Self {
        self.cfg.future_guard = guard;
        self
    }

    /// Serve the persisted metadata snapshot only.
    #[must_use]
    pub const fn offline(mut self, yes: bool) -> Self {
        self.cfg.cache.offline = yes;
        self
    }

    /// Where the metadata snapshot is persisted.
    #[must_use]
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg.cache.snapshot_path = path.into();
        self
    }

    /// Maximum snapshot age before a background refresh is spawned.
    #[must_use]
    pub const fn staleness(mut self, staleness: Duration) -> Self {
        self.cfg.cache.staleness = staleness;
        self
    }

    /// Parallelism ceiling for onboarding-date lookups during a refresh.
    #[must_use]
    pub const fn onboard_concurrency(mut self, limit: usize) -> Self {
        self.cfg.cache.onboard_concurrency = limit;
        self
    }

    /// Failure policy for onboarding-date lookups during a refresh.
    #[must_use]
    pub const fn batch_policy(mut self, policy: BatchPolicy) -> Self {
        self.cfg.cache.batch_policy = policy;
        self
    }

    /// Minimum delay between a failed metadata refresh and the next automatic retry.
    #[must_use]
    pub const fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.cfg.cache.retry_backoff = backoff;
        self
    }

    /// Use a custom metadata source instead of walking the registered connectors.
    #[must_use]
    pub fn metadata_source(mut self, source: Arc<dyn ExchangeListSource>) -> Self {
        self.source = Some(source);
        self
    }

    fn validate(&self) -> Result<(), MarlinError> {
        if self.connectors.is_empty() {
            return Err(MarlinError::InvalidArg(
                "no connectors registered; add at least one via with_connector(...)".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for c in &self.connectors {
            if !seen.insert((c.broker_id(), c.exchange_id())) {
                return Err(MarlinError::InvalidArg(format!(
                    "duplicate scope {}:{} ({})",
                    c.broker_id(),
                    c.exchange_id(),
                    c.name()
                )));
            }
        }
        if self.cfg.fixed_capacity == 0 {
            return Err(MarlinError::InvalidArg("fixed_capacity must be positive".to_string()));
        }
        Ok(())
    }

    /// Build the orchestrator and bring the metadata cache up.
    ///
    /// The persisted snapshot is loaded if present; otherwise, unless offline,
    /// metadata is fetched synchronously and persisted.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an invalid registration, `CacheUnavailableOffline`
    /// when offline without a snapshot, `SnapshotCorrupt` for an unreadable
    /// snapshot, or the upstream error of the initial fetch.
    pub async fn open(self) -> Result<Marlin, MarlinError> {
        self.validate()?;
        let source = self.source.unwrap_or_else(|| {
            Arc::new(ConnectorSource::new(
                self.connectors.clone(),
                self.cfg.provider_timeout,
                &self.cfg.cache,
            ))
        });
        let store = SnapshotStore::new(self.cfg.cache.snapshot_path.clone());
        let cache = ExchangeInfoCache::open(source, store, &self.cfg.cache).await?;
        Ok(Marlin {
            connectors: self.connectors,
            cfg: self.cfg,
            cache,
        })
    }
}

/// Wrap a provider future with a timeout and standardized timeout error mapping.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "marlin::core::provider_call_with_timeout",
        skip(fut),
        fields(
            connector = connector_name,
            capability = %capability,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        ),
    )
)]
pub(crate) async fn provider_call_with_timeout<T, Fut>(
    connector_name: &'static str,
    capability: Capability,
    timeout: Duration,
    fut: Fut,
) -> Result<T, MarlinError>
where
    Fut: core::future::Future<Output = Result<T, MarlinError>>,
{
    (tokio::time::timeout(timeout, fut).await)
        .unwrap_or_else(|_| Err(MarlinError::provider_timeout(connector_name, capability.as_str())))
}

impl Marlin {
    /// Start building a new `Marlin` instance.
    #[must_use]
    pub fn builder() -> MarlinBuilder {
        MarlinBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &MarlinConfig {
        &self.cfg
    }

    /// The exchange metadata cache.
    #[must_use]
    pub const fn cache(&self) -> &ExchangeInfoCache {
        &self.cache
    }

    /// Resolve the connector serving `asset`'s broker and exchange.
    pub(crate) fn connector_for(
        &self,
        asset: &AssetIdentifier,
    ) -> Result<&Arc<dyn MarlinConnector>, MarlinError> {
        let mut broker_known = false;
        for c in &self.connectors {
            if c.broker_id() != asset.broker() {
                continue;
            }
            broker_known = true;
            if c.exchange_id() == asset.exchange() {
                return Ok(c);
            }
        }
        if broker_known {
            Err(MarlinError::InvalidArg(format!(
                "invalid exchange: {}",
                asset.exchange()
            )))
        } else {
            Err(MarlinError::InvalidArg(format!(
                "invalid data source: {}",
                asset.broker()
            )))
        }
    }
}
