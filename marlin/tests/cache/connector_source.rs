use std::sync::Arc;
use std::time::Duration;

use marlin::{
    BatchPolicy, CacheConfig, ConnectorSource, ExchangeListSource, MarlinConnector, MarlinError,
    ONBOARD_UNKNOWN,
};
use marlin::SymbolWhitelist;
use marlin_eod::EodConnector;
use marlin_eod::adapter::{EodApi, SplitEntry};
use marlin_mock::{DynamicMockConnector, MockBehavior, MockScope};

use crate::helpers::listed;

fn source(connectors: Vec<Arc<dyn MarlinConnector>>, policy: BatchPolicy) -> ConnectorSource {
    let cfg = CacheConfig {
        batch_policy: policy,
        onboard_concurrency: 2,
        ..CacheConfig::default()
    };
    ConnectorSource::new(connectors, Duration::from_secs(5), &cfg)
}

#[tokio::test]
async fn builds_one_entry_per_connector_in_registration_order() {
    let (spot, spot_ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    let (eq, eq_ctl) = DynamicMockConnector::new_with_controller(MockScope::DAILY);
    spot_ctl
        .set_listing_behavior(MockBehavior::Return(vec![
            listed("ETHUSDT", "ETHUSDT", "ETH", "USDT"),
            listed("BTCUSDT", "BTCUSDT", "BTC", "USDT"),
        ]))
        .await;
    spot_ctl
        .set_earliest_behavior("BTCUSDT", MockBehavior::Return(1_502_942_400))
        .await;
    spot_ctl
        .set_earliest_behavior("ETHUSDT", MockBehavior::Return(1_502_942_460))
        .await;
    eq_ctl
        .set_listing_behavior(MockBehavior::Return(vec![listed("AAPL", "AAPLUSD", "AAPL", "USD")]))
        .await;

    let before = chrono::Utc::now().timestamp();
    let list = source(vec![eq as Arc<dyn MarlinConnector>, spot], BatchPolicy::FailFast)
        .fetch()
        .await
        .unwrap();

    let ids: Vec<_> = list.exchanges.iter().map(|e| e.exchange_id.as_str()).collect();
    assert_eq!(ids, ["EQ", "SPOT"]);
    assert_eq!(list.broker_info.len(), 1);
    assert_eq!(list.broker_info["MOCK"].name, "Mock Broker");

    let spot = &list.exchanges[1];
    assert_eq!(spot.name, "Mock Spot");
    assert!(spot.last_update >= before);
    let keys: Vec<_> = spot.symbols.keys().map(String::as_str).collect();
    assert_eq!(keys, ["MOCK:SPOT:BTCUSDT", "MOCK:SPOT:ETHUSDT"]);
    assert_eq!(spot.symbols["MOCK:SPOT:ETHUSDT"].on_board_date, 1_502_942_460);
    assert_eq!(spot.symbols["MOCK:SPOT:BTCUSDT"].symbol, "MOCK:SPOT:BTCUSDT");

    let aapl = &list.exchanges[0].symbols["MOCK:EQ:AAPL"];
    assert_eq!(aapl.pair, "AAPLUSD");
    assert_eq!(aapl.on_board_date, ONBOARD_UNKNOWN);
    assert_eq!(spot_ctl.counts().earliest(), 2);
    assert_eq!(eq_ctl.counts().earliest(), 0);
}

#[tokio::test]
async fn fail_fast_onboarding_failure_names_the_symbol() {
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_listing_behavior(MockBehavior::Return(vec![
        listed("BTCUSDT", "BTCUSDT", "BTC", "USDT"),
        listed("XRPUSDT", "XRPUSDT", "XRP", "USDT"),
    ]))
    .await;
    ctl.set_earliest_behavior("BTCUSDT", MockBehavior::Return(1_502_942_400))
        .await;

    let err = source(vec![spot as Arc<dyn MarlinConnector>], BatchPolicy::FailFast)
        .fetch()
        .await
        .unwrap_err();
    match err {
        MarlinError::Batch { key, source } => {
            assert_eq!(key, "XRPUSDT");
            assert!(matches!(*source, MarlinError::NotFound { .. }));
        }
        other => panic!("expected batch error, got {other:?}"),
    }
}

#[tokio::test]
async fn partial_policy_keeps_failed_symbols_unknown() {
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_listing_behavior(MockBehavior::Return(vec![
        listed("BTCUSDT", "BTCUSDT", "BTC", "USDT"),
        listed("XRPUSDT", "XRPUSDT", "XRP", "USDT"),
    ]))
    .await;
    ctl.set_earliest_behavior("BTCUSDT", MockBehavior::Return(1_502_942_400))
        .await;

    let list = source(vec![spot as Arc<dyn MarlinConnector>], BatchPolicy::Partial).fetch().await.unwrap();
    let symbols = &list.exchanges[0].symbols;
    assert_eq!(symbols["MOCK:SPOT:BTCUSDT"].on_board_date, 1_502_942_400);
    assert_eq!(symbols["MOCK:SPOT:XRPUSDT"].on_board_date, ONBOARD_UNKNOWN);
}

#[tokio::test]
async fn listing_failure_fails_the_whole_refresh() {
    let (spot, _spot_ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    let (eq, eq_ctl) = DynamicMockConnector::new_with_controller(MockScope::DAILY);
    eq_ctl
        .set_listing_behavior(MockBehavior::Fail(MarlinError::connector("marlin-mock-eq", "503")))
        .await;

    let err = source(vec![spot as Arc<dyn MarlinConnector>, eq], BatchPolicy::Partial)
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, MarlinError::Connector { .. }), "{err:?}");
}

#[tokio::test(start_paused = true)]
async fn stalled_onboarding_lookup_times_out() {
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_listing_behavior(MockBehavior::Return(vec![listed("BTCUSDT", "BTCUSDT", "BTC", "USDT")]))
        .await;
    ctl.set_earliest_behavior("BTCUSDT", MockBehavior::Hang).await;

    let err = source(vec![spot as Arc<dyn MarlinConnector>], BatchPolicy::FailFast)
        .fetch()
        .await
        .unwrap_err();
    assert!(
        matches!(err.root_cause(), MarlinError::ProviderTimeout { .. }),
        "{err:?}"
    );
}

struct SlowSplits;

#[async_trait::async_trait]
impl EodApi for SlowSplits {
    async fn eod_csv(
        &self,
        _ticker: &str,
        _from: Option<chrono::NaiveDate>,
    ) -> Result<String, MarlinError> {
        Ok(String::new())
    }

    async fn splits(&self, _ticker: &str) -> Result<Vec<SplitEntry>, MarlinError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(vec![])
    }
}

#[tokio::test(start_paused = true)]
async fn slow_aggregate_listing_is_not_cut_by_the_provider_timeout() {
    let tickers: Vec<String> = (0..120).map(|i| format!("T{i:03}")).collect();
    let eod = EodConnector::with_api(
        Arc::new(SlowSplits),
        SymbolWhitelist::from_lines(&tickers.join("\n")),
    )
    .with_split_concurrency(4);
    let cfg = CacheConfig::default();
    let source = ConnectorSource::new(
        vec![Arc::new(eod) as Arc<dyn MarlinConnector>],
        Duration::from_secs(5),
        &cfg,
    );

    let list = source.fetch().await.unwrap();
    assert_eq!(list.exchanges[0].symbols.len(), 120);
    assert!(list.exchanges[0].symbols.contains_key("UNICORN:US:T119"));
}

#[tokio::test(start_paused = true)]
async fn eod_assets_use_the_identifier_as_symbol() {
    let eod = EodConnector::with_api(Arc::new(SlowSplits), SymbolWhitelist::from_lines("AAPL"));
    let source = ConnectorSource::new(
        vec![Arc::new(eod) as Arc<dyn MarlinConnector>],
        Duration::from_secs(5),
        &CacheConfig::default(),
    );

    let list = source.fetch().await.unwrap();
    let aapl = &list.exchanges[0].symbols["UNICORN:US:AAPL"];
    assert_eq!(aapl.symbol, "UNICORN:US:AAPL");
    assert_eq!(aapl.symbol, aapl.identifier.to_string());
    assert_eq!(aapl.identifier.symbol(), "AAPL");
    assert_eq!(aapl.pair, "AAPLUSD");
}
