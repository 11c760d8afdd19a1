use std::sync::Arc;

use marlin::{MarlinConnector, MarlinError, ONBOARD_UNKNOWN};
use marlin_mock::MockConnector;

use crate::helpers::{id, open_marlin};

async fn mock_marlin(dir: &std::path::Path) -> marlin::Marlin {
    open_marlin(dir, vec![Arc::new(MockConnector::minute()) as Arc<dyn MarlinConnector>]).await
}

#[tokio::test]
async fn asset_info_is_served_from_the_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let marlin = mock_marlin(dir.path()).await;

    let btc = marlin.asset_info(&id("BINANCE:SPOT:BTCUSDT")).unwrap();
    assert_eq!(btc.symbol, "BINANCE:SPOT:BTCUSDT");
    assert_eq!(btc.pair, "BTCUSDT");
    assert_eq!(btc.on_board_date, 1_502_942_400);

    let aapl = marlin.asset_info(&id("UNICORN:US:AAPL")).unwrap();
    assert_eq!(aapl.pair, "AAPLUSD");
    assert_eq!(aapl.on_board_date, ONBOARD_UNKNOWN);
}

#[tokio::test]
async fn unknown_asset_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let marlin = mock_marlin(dir.path()).await;

    let err = marlin.asset_info(&id("BINANCE:SPOT:DOGEUSDT")).unwrap_err();
    assert!(matches!(err, MarlinError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn exchange_list_returns_the_installed_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let marlin = mock_marlin(dir.path()).await;

    let list = marlin.exchange_list();
    assert_eq!(list.exchanges.len(), 2);
    assert_eq!(list.broker_info["UNICORN"].name, "Unicorn");
    assert!(Arc::ptr_eq(&list, &marlin.exchange_list()));
    assert!(marlin.cache().refresh_in_flight().is_none());
}

#[tokio::test]
async fn default_source_walks_registered_connectors() {
    let dir = tempfile::tempdir().unwrap();
    let marlin = marlin::Marlin::builder()
        .with_connector(Arc::new(MockConnector::minute()))
        .with_connector(Arc::new(MockConnector::daily()))
        .snapshot_path(crate::helpers::snapshot_path(dir.path()))
        .open()
        .await
        .unwrap();

    let list = marlin.exchange_list();
    let scopes: Vec<_> = list
        .exchanges
        .iter()
        .map(|e| format!("{}:{}", e.broker_id, e.exchange_id))
        .collect();
    assert_eq!(scopes, ["MOCK:SPOT", "MOCK:EQ"]);

    let eth = marlin.asset_info(&id("MOCK:SPOT:ETHUSDT")).unwrap();
    assert_eq!(eth.on_board_date, marlin_mock::fixtures::MINUTE_START + 600);
    let msft = marlin.asset_info(&id("MOCK:EQ:MSFT")).unwrap();
    assert_eq!(msft.on_board_date, ONBOARD_UNKNOWN);
    assert!(crate::helpers::snapshot_path(dir.path()).exists());
}
