use std::sync::Arc;

use marlin::{Interval, Marlin};
use marlin_mock::MockConnector;
use marlin_mock::fixtures::MINUTE_START;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,marlin=trace
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let dir = tempfile::tempdir()?;
    let marlin = Marlin::builder()
        .with_connector(Arc::new(MockConnector::minute()))
        .with_connector(Arc::new(MockConnector::daily()))
        .snapshot_path(dir.path().join("exchange.json"))
        .open()
        .await?;

    let _ = marlin
        .historical(&"MOCK:SPOT:BTCUSDT".parse()?, MINUTE_START, Interval::I1m)
        .await?;
    let _ = marlin.latest(&"MOCK:SPOT:ETHUSDT".parse()?, MINUTE_START).await?;
    let _ = marlin
        .historical(&"MOCK:EQ:AAPL".parse()?, 0, Interval::I1d)
        .await?;
    let _ = marlin.asset_info(&"MOCK:EQ:MSFT".parse()?)?;

    Ok(())
}
