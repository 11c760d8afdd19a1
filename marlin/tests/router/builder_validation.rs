use std::sync::Arc;

use marlin::{Marlin, MarlinError};
use marlin_mock::{MockConnector, MockScope};

use crate::helpers::{ScriptedSource, snapshot_path};

#[tokio::test]
async fn no_connectors_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = Marlin::builder()
        .snapshot_path(snapshot_path(dir.path()))
        .open()
        .await
        .err()
        .expect("empty builder must fail");
    assert!(matches!(err, MarlinError::InvalidArg(_)));
}

#[tokio::test]
async fn duplicate_scope_is_rejected_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(ScriptedSource::fresh());
    let calls = source.calls();
    let err = Marlin::builder()
        .with_connector(Arc::new(MockConnector::minute()))
        .with_connector(Arc::new(MockConnector::minute()))
        .snapshot_path(snapshot_path(dir.path()))
        .metadata_source(source)
        .open()
        .await
        .err()
        .expect("duplicate scope must fail");

    match err {
        MarlinError::InvalidArg(msg) => assert!(msg.contains("MOCK:SPOT"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(!snapshot_path(dir.path()).exists());
}

#[tokio::test]
async fn same_broker_on_distinct_exchanges_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let marlin = Marlin::builder()
        .with_connector(Arc::new(MockConnector::minute()))
        .with_connector(Arc::new(MockConnector::daily()))
        .snapshot_path(snapshot_path(dir.path()))
        .metadata_source(Arc::new(ScriptedSource::fresh()))
        .open()
        .await
        .unwrap();
    assert_eq!(marlin.config().fixed_capacity, 1_000);
    assert_eq!(marlin.config().latest_limit, 99);
    assert_eq!(MockConnector::daily().scope(), MockScope::DAILY);
}

#[tokio::test]
async fn zero_capacity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = Marlin::builder()
        .with_connector(Arc::new(MockConnector::minute()))
        .fixed_capacity(0)
        .snapshot_path(snapshot_path(dir.path()))
        .open()
        .await
        .err()
        .expect("zero capacity must fail");
    assert!(matches!(err, MarlinError::InvalidArg(_)));
}
