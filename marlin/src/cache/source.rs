use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use marlin_core::{
    AssetIdentifier, AssetInfo, BatchPolicy, BrokerInfo, CacheConfig, Capability, ExchangeInfo,
    ExchangeList, ListedSymbol, MarlinConnector, MarlinError, ONBOARD_UNKNOWN, fetch_bounded,
};

use crate::core::provider_call_with_timeout;

/// Produces a complete, fresh [`ExchangeList`].
#[async_trait]
pub trait ExchangeListSource: Send + Sync {
    /// Build a new snapshot from upstream.
    async fn fetch(&self) -> Result<ExchangeList, MarlinError>;
}

/// Production source: one exchange entry per listing-capable connector, in
/// registration order.
///
/// Onboarding dates are resolved per symbol through [`fetch_bounded`] for
/// connectors that can answer them, each lookup under the provider timeout;
/// the rest keep [`ONBOARD_UNKNOWN`]. Any connector failure fails the whole
/// refresh.
///
/// `symbol_listing` is not wrapped in a timeout: a listing may fan out into
/// many upstream calls, and listing providers time-limit those individually.
pub struct ConnectorSource {
    connectors: Vec<Arc<dyn MarlinConnector>>,
    timeout: Duration,
    onboard_concurrency: usize,
    batch_policy: BatchPolicy,
}

impl ConnectorSource {
    /// Source over `connectors` with per-call `timeout`.
    #[must_use]
    pub fn new(connectors: Vec<Arc<dyn MarlinConnector>>, timeout: Duration, cfg: &CacheConfig) -> Self {
        Self {
            connectors,
            timeout,
            onboard_concurrency: cfg.onboard_concurrency,
            batch_policy: cfg.batch_policy,
        }
    }

    async fn onboarding_dates(
        &self,
        conn: &Arc<dyn MarlinConnector>,
        listed: &[ListedSymbol],
    ) -> Result<BTreeMap<String, i64>, MarlinError> {
        let Some(provider) = conn.as_earliest_timestamp_provider() else {
            return Ok(BTreeMap::new());
        };
        let name = conn.name();
        let timeout = self.timeout;
        let keys: Vec<String> = listed.iter().map(|s| s.symbol.clone()).collect();
        let outcome = fetch_bounded(
            keys,
            self.onboard_concurrency,
            self.batch_policy,
            |symbol| async move {
                provider_call_with_timeout(
                    name,
                    Capability::EarliestTimestamp,
                    timeout,
                    provider.earliest_timestamp(&symbol),
                )
                .await
            },
        )
        .await?;

        #[cfg(feature = "tracing")]
        for (symbol, err) in &outcome.failures {
            tracing::warn!(connector = name, symbol = %symbol, error = %err, "onboarding date unknown");
        }
        Ok(outcome.values)
    }

    async fn exchange_info(&self, conn: &Arc<dyn MarlinConnector>) -> Result<Option<ExchangeInfo>, MarlinError> {
        let Some(provider) = conn.as_listing_provider() else {
            return Ok(None);
        };
        let last_update = chrono::Utc::now().timestamp();
        // Listings may aggregate many upstream calls; providers bound each one.
        let listed = provider.symbol_listing().await?;
        let onboard = self.onboarding_dates(conn, &listed).await?;

        let mut symbols = BTreeMap::new();
        for item in listed {
            let id = AssetIdentifier::new(conn.broker_id(), conn.exchange_id(), item.symbol.as_str())?;
            let on_board = onboard.get(&item.symbol).copied().unwrap_or(ONBOARD_UNKNOWN);
            symbols.insert(id.to_string(), AssetInfo::from_listing(id, item, on_board));
        }

        Ok(Some(ExchangeInfo {
            name: conn.exchange_name().to_string(),
            exchange_id: conn.exchange_id().to_string(),
            broker_id: conn.broker_id().to_string(),
            last_update,
            resolution: conn.resolutions().to_vec(),
            symbols,
        }))
    }
}

#[async_trait]
impl ExchangeListSource for ConnectorSource {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "marlin::cache::source::fetch", skip(self))
    )]
    async fn fetch(&self) -> Result<ExchangeList, MarlinError> {
        let mut list = ExchangeList::default();
        for conn in &self.connectors {
            let Some(info) = self.exchange_info(conn).await? else {
                continue;
            };
            #[cfg(feature = "tracing")]
            tracing::debug!(
                connector = conn.name(),
                symbols = info.symbols.len(),
                "exchange info fetched"
            );
            list.exchanges.push(info);
            list.broker_info
                .entry(conn.broker_id().to_string())
                .or_insert_with(|| BrokerInfo {
                    name: conn.broker_name().to_string(),
                });
        }
        Ok(list)
    }
}
