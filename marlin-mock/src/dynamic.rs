use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use marlin_core::connector::{
    CandleProvider, EarliestTimestampProvider, ListingProvider, MarlinConnector,
};
use marlin_core::{Cadence, DAY_SECS, Interval, ListedSymbol, MarlinError, RawCandle};

use crate::MockScope;

/// Instruction for how a method should behave for a given input.
#[derive(Debug, Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Sleep, then return the provided value.
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(MarlinError),
    /// Hang indefinitely (simulate a stalled upstream).
    Hang,
}

impl<T> MockBehavior<T> {
    async fn run(self) -> Result<T, MarlinError> {
        match self {
            Self::Return(v) => Ok(v),
            Self::Delay(d, v) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
            Self::Fail(e) => Err(e),
            Self::Hang => std::future::pending().await,
        }
    }
}

/// One recorded `raw_candles` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    /// Requested symbol.
    pub symbol: String,
    /// Requested start, unix seconds.
    pub start: i64,
    /// Requested row limit.
    pub limit: usize,
}

/// Upstream call counters, readable without awaiting.
#[derive(Debug, Default)]
pub struct CallCounts {
    candles: AtomicUsize,
    listing: AtomicUsize,
    earliest: AtomicUsize,
}

impl CallCounts {
    /// Number of `raw_candles` calls.
    pub fn candles(&self) -> usize {
        self.candles.load(Ordering::SeqCst)
    }

    /// Number of `symbol_listing` calls.
    pub fn listing(&self) -> usize {
        self.listing.load(Ordering::SeqCst)
    }

    /// Number of `earliest_timestamp` calls.
    pub fn earliest(&self) -> usize {
        self.earliest.load(Ordering::SeqCst)
    }
}

enum CandleRule {
    /// A backing history sliced per request like a real provider would.
    Series(Vec<RawCandle>),
    /// Returned verbatim regardless of the request.
    Scripted(MockBehavior<Vec<RawCandle>>),
}

#[derive(Default)]
struct InternalState {
    candle_rules: HashMap<String, CandleRule>,
    listing: Option<MockBehavior<Vec<ListedSymbol>>>,
    earliest_rules: HashMap<String, MockBehavior<i64>>,
    candle_requests: Vec<CandleRequest>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    counts: Arc<CallCounts>,
}

impl DynamicMockController {
    /// Back `symbol` with a full history; each call returns the rows at or
    /// after its start, up to its limit (calendar scopes: the whole tail from
    /// the start day, or everything when the start is zero).
    pub async fn set_candle_series(&self, symbol: &str, rows: Vec<RawCandle>) {
        let mut guard = self.state.lock().await;
        guard
            .candle_rules
            .insert(symbol.to_string(), CandleRule::Series(rows));
    }

    /// Script the raw answer for `symbol`, ignoring the request's start and limit.
    pub async fn set_candle_behavior(&self, symbol: &str, behavior: MockBehavior<Vec<RawCandle>>) {
        let mut guard = self.state.lock().await;
        guard
            .candle_rules
            .insert(symbol.to_string(), CandleRule::Scripted(behavior));
    }

    /// Set the behavior of `symbol_listing`.
    pub async fn set_listing_behavior(&self, behavior: MockBehavior<Vec<ListedSymbol>>) {
        self.state.lock().await.listing = Some(behavior);
    }

    /// Set the behavior of `earliest_timestamp` for `symbol`.
    pub async fn set_earliest_behavior(&self, symbol: &str, behavior: MockBehavior<i64>) {
        let mut guard = self.state.lock().await;
        guard.earliest_rules.insert(symbol.to_string(), behavior);
    }

    /// Copy of every recorded `raw_candles` call, in call order.
    pub async fn candle_requests(&self) -> Vec<CandleRequest> {
        self.state.lock().await.candle_requests.clone()
    }

    /// Shared call counters.
    #[must_use]
    pub fn counts(&self) -> Arc<CallCounts> {
        Arc::clone(&self.counts)
    }
}

/// A connector that defers all behavior to an external controller.
///
/// Unscripted calls answer with not-found (candles, earliest) or an empty
/// listing. Calendar-step scopes expose no onboarding lookup.
pub struct DynamicMockConnector {
    scope: MockScope,
    state: Arc<Mutex<InternalState>>,
    counts: Arc<CallCounts>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector and its controller.
    #[must_use]
    pub fn new_with_controller(scope: MockScope) -> (Arc<Self>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let counts = Arc::new(CallCounts::default());
        let controller = DynamicMockController {
            state: Arc::clone(&state),
            counts: Arc::clone(&counts),
        };
        let me = Arc::new(Self {
            scope,
            state,
            counts,
        });
        (me, controller)
    }

    fn step(&self) -> Option<i64> {
        self.scope.resolutions.iter().find_map(|i| match i.cadence() {
            Cadence::FixedStep { step } => Some(step),
            Cadence::CalendarDay => None,
        })
    }

    fn slice(&self, rows: &[RawCandle], start: i64, limit: usize) -> Vec<RawCandle> {
        if self.step().is_some() {
            rows.iter()
                .filter(|r| r.open_time >= start)
                .take(limit)
                .copied()
                .collect()
        } else {
            let day = start - start.rem_euclid(DAY_SECS);
            rows.iter().filter(|r| r.open_time >= day).copied().collect()
        }
    }
}

#[async_trait]
impl CandleProvider for DynamicMockConnector {
    async fn raw_candles(
        &self,
        symbol: &str,
        start: i64,
        limit: usize,
    ) -> Result<Vec<RawCandle>, MarlinError> {
        self.counts.candles.fetch_add(1, Ordering::SeqCst);
        // Resolve the rule without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.candle_requests.push(CandleRequest {
                symbol: symbol.to_string(),
                start,
                limit,
            });
            match guard.candle_rules.get(symbol) {
                Some(CandleRule::Series(rows)) => Some(MockBehavior::Return(self.slice(rows, start, limit))),
                Some(CandleRule::Scripted(b)) => Some(b.clone()),
                None => None,
            }
        };
        match behavior {
            Some(b) => b.run().await,
            None => Err(MarlinError::not_found(format!("candles for {symbol}"))),
        }
    }
}

#[async_trait]
impl ListingProvider for DynamicMockConnector {
    async fn symbol_listing(&self) -> Result<Vec<ListedSymbol>, MarlinError> {
        self.counts.listing.fetch_add(1, Ordering::SeqCst);
        let behavior = self.state.lock().await.listing.clone();
        match behavior {
            Some(b) => b.run().await,
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl EarliestTimestampProvider for DynamicMockConnector {
    async fn earliest_timestamp(&self, symbol: &str) -> Result<i64, MarlinError> {
        self.counts.earliest.fetch_add(1, Ordering::SeqCst);
        let behavior = {
            let guard = self.state.lock().await;
            guard.earliest_rules.get(symbol).cloned()
        };
        match behavior {
            Some(b) => b.run().await,
            None => Err(MarlinError::not_found(format!("earliest candle for {symbol}"))),
        }
    }
}

impl MarlinConnector for DynamicMockConnector {
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

    fn as_earliest_timestamp_provider(&self) -> Option<&dyn EarliestTimestampProvider> {
        self.step().map(|_| self as &dyn EarliestTimestampProvider)
    }
}
