//! marlin-mock
//!
//! Offline connectors for tests and demos. [`MockConnector`] serves static
//! fixtures; [`DynamicMockConnector`] defers every call to a controller so tests
//! can script successes, failures, hangs and count upstream calls.
#![warn(missing_docs)]

use std::time::Duration;

use async_trait::async_trait;
use marlin_core::connector::{
    CandleProvider, EarliestTimestampProvider, ListingProvider, MarlinConnector,
};
use marlin_core::{Cadence, Interval, ListedSymbol, MarlinError, RawCandle, TradeConstraints};

mod dynamic;
pub mod fixtures;

pub use dynamic::{CallCounts, CandleRequest, DynamicMockConnector, DynamicMockController, MockBehavior};

/// Static identity of a mock connector: one broker + exchange scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockScope {
    /// Connector name.
    pub name: &'static str,
    /// Broker id.
    pub broker_id: &'static str,
    /// Broker display name.
    pub broker_name: &'static str,
    /// Exchange id.
    pub exchange_id: &'static str,
    /// Exchange display name.
    pub exchange_name: &'static str,
    /// Served resolutions.
    pub resolutions: &'static [Interval],
}

impl MockScope {
    /// Minute-cadence crypto-like scope `MOCK:SPOT`.
    pub const MINUTE: Self = Self {
        name: "marlin-mock-spot",
        broker_id: "MOCK",
        broker_name: "Mock Broker",
        exchange_id: "SPOT",
        exchange_name: "Mock Spot",
        resolutions: &[Interval::I1m],
    };

    /// Daily-cadence equities-like scope `MOCK:EQ`.
    pub const DAILY: Self = Self {
        name: "marlin-mock-eq",
        broker_id: "MOCK",
        broker_name: "Mock Broker",
        exchange_id: "EQ",
        exchange_name: "Mock Equities",
        resolutions: &[Interval::I1d],
    };

    /// Same scope under another connector name and exchange id.
    #[must_use]
    pub const fn renamed(mut self, name: &'static str, exchange_id: &'static str) -> Self {
        self.name = name;
        self.exchange_id = exchange_id;
        self
    }

    fn is_fixed_step(&self) -> bool {
        self.resolutions
            .iter()
            .any(|i| matches!(i.cadence(), Cadence::FixedStep { .. }))
    }
}

/// Mock connector for CI-safe demos. Serves deterministic data from [`fixtures`].
///
/// The symbols `FAIL` and `TIMEOUT` are reserved: the first always errors, the
/// second sleeps briefly before answering so orchestrator timeouts can fire.
pub struct MockConnector {
    scope: MockScope,
}

impl MockConnector {
    /// Minute-cadence connector over [`fixtures::MINUTE_SYMBOLS`].
    #[must_use]
    pub const fn minute() -> Self {
        Self {
            scope: MockScope::MINUTE,
        }
    }

    /// Daily-cadence connector over [`fixtures::DAILY_SYMBOLS`].
    #[must_use]
    pub const fn daily() -> Self {
        Self {
            scope: MockScope::DAILY,
        }
    }

    /// The scope served.
    #[must_use]
    pub const fn scope(&self) -> MockScope {
        self.scope
    }

    async fn maybe_fail_or_timeout(&self, symbol: &str, capability: &str) -> Result<(), MarlinError> {
        match symbol {
            "FAIL" => Err(MarlinError::connector(
                self.scope.name,
                format!("forced failure: {capability}"),
            )),
            "TIMEOUT" => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn catalog(&self) -> &'static [fixtures::FixtureSymbol] {
        if self.scope.is_fixed_step() {
            fixtures::MINUTE_SYMBOLS
        } else {
            fixtures::DAILY_SYMBOLS
        }
    }
}

#[async_trait]
impl CandleProvider for MockConnector {
    async fn raw_candles(
        &self,
        symbol: &str,
        start: i64,
        limit: usize,
    ) -> Result<Vec<RawCandle>, MarlinError> {
        self.maybe_fail_or_timeout(symbol, "candles").await?;
        let rows = if self.scope.is_fixed_step() {
            fixtures::minute_rows(symbol, start, limit)
        } else {
            fixtures::daily_rows(symbol, start)
        };
        rows.ok_or_else(|| MarlinError::not_found(format!("candles for {symbol}")))
    }
}

#[async_trait]
impl ListingProvider for MockConnector {
    async fn symbol_listing(&self) -> Result<Vec<ListedSymbol>, MarlinError> {
        let constraints = if self.scope.is_fixed_step() {
            TradeConstraints::exchange_defaults()
        } else {
            TradeConstraints::default()
        };
        Ok(self
            .catalog()
            .iter()
            .map(|s| fixtures::listed(s, constraints))
            .collect())
    }
}

#[async_trait]
impl EarliestTimestampProvider for MockConnector {
    async fn earliest_timestamp(&self, symbol: &str) -> Result<i64, MarlinError> {
        self.maybe_fail_or_timeout(symbol, "earliest-timestamp").await?;
        fixtures::lookup(self.catalog(), symbol)
            .map(|s| s.onboard)
            .ok_or_else(|| MarlinError::not_found(format!("earliest candle for {symbol}")))
    }
}

impl MarlinConnector for MockConnector {
    fn name(&self) -> &'static str {
        self.scope.name
    }

    fn broker_id(&self) -> &'static str {
        self.scope.broker_id
    }

    fn broker_name(&self) -> &'static str {
        self.scope.broker_name
    }

    fn exchange_id(&self) -> &'static str {
        self.scope.exchange_id
    }

    fn exchange_name(&self) -> &'static str {
        self.scope.exchange_name
    }

    fn resolutions(&self) -> &'static [Interval] {
        self.scope.resolutions
    }

    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        Some(self as &dyn CandleProvider)
    }

    fn as_listing_provider(&self) -> Option<&dyn ListingProvider> {
        Some(self as &dyn ListingProvider)
    }

    // Daily scopes leave onboarding unknown, like the equities broker.
    fn as_earliest_timestamp_provider(&self) -> Option<&dyn EarliestTimestampProvider> {
        if self.scope.is_fixed_step() {
            Some(self as &dyn EarliestTimestampProvider)
        } else {
            None
        }
    }
}
