use std::sync::Arc;

use marlin::{Interval, MarlinConnector, MarlinError};
use marlin_mock::fixtures::{MINUTE_START, contiguous_minutes};
use marlin_mock::{CandleRequest, DynamicMockConnector, MockBehavior, MockConnector, MockScope};

use crate::helpers::{HOUR, id, now, open_marlin, row};

const FROM: i64 = MINUTE_START;

fn btc() -> marlin::AssetIdentifier {
    id("MOCK:SPOT:BTCUSDT")
}

#[tokio::test]
async fn gaps_are_filled_to_capacity_with_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    let mut rows = contiguous_minutes(FROM, 1_200);
    rows.drain(5..10);
    ctl.set_candle_series("BTCUSDT", rows).await;
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;

    let out = marlin.historical(&btc(), FROM, Interval::I1m).await.unwrap();

    assert_eq!(out.len(), 1_000);
    for (i, c) in out.iter().enumerate() {
        assert_eq!(c.time, FROM + 60 * i64::try_from(i).unwrap());
        assert_eq!(c.missing, (5..10).contains(&i), "entry {i}");
    }
    assert_eq!(out[7].close, 0.0);
    assert_eq!(out[7].number_of_trades, 0);
    assert!(out[10].close > 0.0);
    assert_eq!(
        ctl.candle_requests().await,
        vec![CandleRequest {
            symbol: "BTCUSDT".into(),
            start: FROM,
            limit: 1_000,
        }]
    );
}

#[tokio::test]
async fn short_history_is_padded_after_the_last_row() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_candle_series("BTCUSDT", vec![row(FROM + 120, 10.0), row(FROM + 180, 11.0)])
        .await;
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;

    let out = marlin.historical(&btc(), FROM, Interval::I1m).await.unwrap();

    assert_eq!(out.len(), 1_000);
    assert!(out[0].missing && out[1].missing);
    assert_eq!(out[2].close, 10.0);
    assert_eq!(out[3].close, 11.0);
    assert!(out[4..].iter().all(|c| c.missing));
    assert_eq!(out[999].time, FROM + 999 * 60);
}

#[tokio::test]
async fn custom_capacity_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_candle_series("BTCUSDT", contiguous_minutes(FROM, 50)).await;
    let marlin = marlin::Marlin::builder()
        .with_connector(spot)
        .fixed_capacity(10)
        .snapshot_path(crate::helpers::snapshot_path(dir.path()))
        .metadata_source(Arc::new(crate::helpers::ScriptedSource::fresh()))
        .open()
        .await
        .unwrap();

    let out = marlin.historical(&btc(), FROM, Interval::I1m).await.unwrap();
    assert_eq!(out.len(), 10);
    assert!(out.iter().all(|c| !c.missing));
    assert_eq!(ctl.candle_requests().await[0].limit, 10);
}

#[tokio::test]
async fn start_far_in_the_future_skips_upstream() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;
    let from = {
        let t = now() + 24 * HOUR;
        t - t.rem_euclid(60)
    };

    let out = marlin.historical(&btc(), from, Interval::I1m).await.unwrap();

    assert_eq!(out.len(), 1_000);
    assert!(out.iter().all(|c| c.missing));
    assert_eq!(out[0].time, from);
    assert_eq!(ctl.counts().candles(), 0);
}

#[tokio::test]
async fn start_within_the_future_guard_still_asks_upstream() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_candle_series("BTCUSDT", Vec::new()).await;
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;
    let from = {
        let t = now() + 5 * 60;
        t - t.rem_euclid(60)
    };

    let out = marlin.historical(&btc(), from, Interval::I1m).await.unwrap();
    assert!(out.iter().all(|c| c.missing));
    assert_eq!(ctl.counts().candles(), 1);
}

#[tokio::test]
async fn missing_or_misaligned_start_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;

    for from in [0, FROM + 30] {
        let err = marlin.historical(&btc(), from, Interval::I1m).await.unwrap_err();
        assert!(matches!(err, MarlinError::InvalidArg(_)), "{from}: {err:?}");
    }
    assert_eq!(ctl.counts().candles(), 0);
}

#[tokio::test]
async fn rows_before_the_start_abort_with_integrity_error() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_candle_behavior(
        "BTCUSDT",
        MockBehavior::Return(vec![row(FROM - 60, 9.0), row(FROM, 10.0)]),
    )
    .await;
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;

    let err = marlin.historical(&btc(), FROM, Interval::I1m).await.unwrap_err();
    assert_eq!(err, MarlinError::integrity("BTCUSDT", FROM, FROM - 60));
}

#[tokio::test]
async fn upstream_errors_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    let upstream = MarlinError::connector("marlin-mock-spot", "HTTP 418");
    ctl.set_candle_behavior("BTCUSDT", MockBehavior::Fail(upstream.clone()))
        .await;
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;

    let err = marlin.historical(&btc(), FROM, Interval::I1m).await.unwrap_err();
    assert_eq!(err, upstream);
}

#[tokio::test(start_paused = true)]
async fn stalled_upstream_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    ctl.set_candle_behavior("BTCUSDT", MockBehavior::Hang).await;
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;

    let err = marlin.historical(&btc(), FROM, Interval::I1m).await.unwrap_err();
    assert_eq!(
        err,
        MarlinError::provider_timeout("marlin-mock-spot", "candles")
    );
}

#[tokio::test]
async fn static_mock_serves_fixture_with_holes() {
    let dir = tempfile::tempdir().unwrap();
    let marlin = open_marlin(
        dir.path(),
        vec![Arc::new(MockConnector::minute()) as Arc<dyn MarlinConnector>],
    )
    .await;

    let out = marlin.historical(&btc(), FROM, Interval::I1m).await.unwrap();
    assert_eq!(out.len(), 1_000);
    let holes: Vec<usize> = out
        .iter()
        .enumerate()
        .filter(|(_, c)| c.missing)
        .map(|(i, _)| i)
        .take(3)
        .collect();
    assert_eq!(holes, vec![7, 20, 33]);
}

#[tokio::test]
async fn start_near_the_end_of_time_is_rejected_without_wrapping() {
    let dir = tempfile::tempdir().unwrap();
    let (spot, ctl) = DynamicMockConnector::new_with_controller(MockScope::MINUTE);
    let marlin = open_marlin(dir.path(), vec![spot as Arc<dyn MarlinConnector>]).await;
    let from = i64::MAX - i64::MAX.rem_euclid(60);

    let err = marlin.historical(&btc(), from, Interval::I1m).await.unwrap_err();
    assert!(matches!(err, MarlinError::InvalidArg(_)), "{err:?}");
    assert_eq!(ctl.counts().candles(), 0);
}
