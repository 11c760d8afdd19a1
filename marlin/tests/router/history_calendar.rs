use std::sync::Arc;

use marlin::{Interval, MarlinConnector, MarlinError};
use marlin_mock::{DynamicMockConnector, MockBehavior, MockConnector, MockScope};

use crate::helpers::{day, id, open_marlin, row};

#[tokio::test]
async fn calendar_gaps_become_daily_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let (eq, ctl) = DynamicMockConnector::new_with_controller(MockScope::DAILY);
    ctl.set_candle_series(
        "AAPL",
        vec![row(day(2020, 1, 1), 100.0), row(day(2020, 1, 5), 104.0)],
    )
    .await;
    let marlin = open_marlin(dir.path(), vec![eq as Arc<dyn MarlinConnector>]).await;

    let out = marlin
        .historical(&id("MOCK:EQ:AAPL"), 0, Interval::I1d)
        .await
        .unwrap();

    let times: Vec<i64> = out.iter().map(|c| c.time).collect();
    assert_eq!(
        times,
        (1..=5).map(|d| day(2020, 1, d)).collect::<Vec<_>>()
    );
    let missing: Vec<bool> = out.iter().map(|c| c.missing).collect();
    assert_eq!(missing, [false, true, true, true, false]);
    assert_eq!(out[4].close, 104.0);

    let requests = ctl.candle_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].start, 0);
}

#[tokio::test]
async fn calendar_start_is_forwarded_upstream() {
    let dir = tempfile::tempdir().unwrap();
    let (eq, ctl) = DynamicMockConnector::new_with_controller(MockScope::DAILY);
    ctl.set_candle_series(
        "AAPL",
        (1..=10).map(|d| row(day(2020, 1, d), 100.0)).collect(),
    )
    .await;
    let marlin = open_marlin(dir.path(), vec![eq as Arc<dyn MarlinConnector>]).await;

    let out = marlin
        .historical(&id("MOCK:EQ:AAPL"), day(2020, 1, 8), Interval::I1d)
        .await
        .unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].time, day(2020, 1, 8));
    assert_eq!(ctl.candle_requests().await[0].start, day(2020, 1, 8));
}

#[tokio::test]
async fn empty_calendar_history_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (eq, ctl) = DynamicMockConnector::new_with_controller(MockScope::DAILY);
    ctl.set_candle_series("AAPL", Vec::new()).await;
    let marlin = open_marlin(dir.path(), vec![eq as Arc<dyn MarlinConnector>]).await;

    let out = marlin
        .historical(&id("MOCK:EQ:AAPL"), 0, Interval::I1d)
        .await
        .unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn out_of_order_calendar_rows_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (eq, ctl) = DynamicMockConnector::new_with_controller(MockScope::DAILY);
    ctl.set_candle_behavior(
        "AAPL",
        MockBehavior::Return(vec![row(day(2020, 1, 3), 1.0), row(day(2020, 1, 2), 1.0)]),
    )
    .await;
    let marlin = open_marlin(dir.path(), vec![eq as Arc<dyn MarlinConnector>]).await;

    let err = marlin
        .historical(&id("MOCK:EQ:AAPL"), 0, Interval::I1d)
        .await
        .unwrap_err();
    assert!(matches!(err, MarlinError::Data(_)), "{err:?}");
}

#[tokio::test]
async fn static_daily_mock_fills_weekends() {
    let dir = tempfile::tempdir().unwrap();
    let marlin = open_marlin(
        dir.path(),
        vec![Arc::new(MockConnector::daily()) as Arc<dyn MarlinConnector>],
    )
    .await;

    let out = marlin
        .historical(&id("MOCK:EQ:MSFT"), day(2020, 1, 2), Interval::I1d)
        .await
        .unwrap();
    // 2020-01-04 and 2020-01-05 fall on a weekend.
    assert_eq!(out[0].time, day(2020, 1, 2));
    assert!(!out[1].missing);
    assert!(out[2].missing && out[3].missing);
    assert!(!out[4].missing);
    assert!(out.windows(2).all(|w| w[1].time - w[0].time == 86_400));
}
