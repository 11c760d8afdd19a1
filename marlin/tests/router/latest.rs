use std::sync::Arc;

use marlin::{MarlinConnector, MarlinError};
use marlin_mock::fixtures::{MINUTE_START, contiguous_minutes};
use marlin_mock::{DynamicMockConnector, MockBehavior, MockConnector, MockScope};

use crate::helpers::{id, open_marlin, row};

#[tokio::test]
async fn latest_asks_for_the_configured_limit_and_keeps_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    let mut rows = contiguous_minutes(MINUTE_START, 200);
    rows.remove(3);
    ctl.set_candle_series("BTCUSDT", rows).await;
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;

    let out = marlin
        .latest(&id("MOCK:SPOT:BTCUSDT"), MINUTE_START)
        .await
        .unwrap();

    assert_eq!(out.len(), 99);
    assert!(out.iter().all(|c| !c.missing));
    assert_eq!(out[3].time, MINUTE_START + 4 * 60);
    assert_eq!(ctl.candle_requests().await[0].limit, 99);
}

#[tokio::test]
async fn latest_does_not_check_row_order_or_start() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_candle_behavior(
        "BTCUSDT",
        MockBehavior::Return(vec![row(MINUTE_START - 60, 1.0), row(MINUTE_START + 30, 2.0)]),
    )
    .await;
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;

    let out = marlin
        .latest(&id("MOCK:SPOT:BTCUSDT"), MINUTE_START)
        .await
        .unwrap();
    let times: Vec<i64> = out.iter().map(|c| c.time).collect();
    assert_eq!(times, [MINUTE_START - 60, MINUTE_START + 30]);
}

#[tokio::test]
async fn latest_is_unsupported_for_calendar_connectors() {
    let dir = tempfile::tempdir().unwrap();
    let marlin = open_marlin(
        dir.path(),
        vec![Arc::new(MockConnector::daily()) as Arc<dyn MarlinConnector>],
    )
    .await;

    let err = marlin.latest(&id("MOCK:EQ:AAPL"), 0).await.unwrap_err();
    assert!(matches!(err, MarlinError::Unsupported { .. }), "{err:?}");
}

#[tokio::test(start_paused = true)]
async fn stalled_latest_times_out_with_its_own_capability() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_candle_behavior("BTCUSDT", MockBehavior::Hang).await;
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;

    let err = marlin
        .latest(&id("MOCK:SPOT:BTCUSDT"), MINUTE_START)
        .await
        .unwrap_err();
    assert_eq!(err, MarlinError::provider_timeout("marlin-mock-spot", "latest"));
}
