use std::sync::Arc;

use marlin::{AssetIdentifier, CandlesPayload, Interval, Marlin};
use marlin_mock::MockConnector;
use marlin_mock::fixtures::MINUTE_START;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let marlin = Marlin::builder()
        .with_connector(Arc::new(MockConnector::minute()))
        .with_connector(Arc::new(MockConnector::daily()))
        .snapshot_path(dir.path().join("exchange.json"))
        .open()
        .await?;

    let btc: AssetIdentifier = "MOCK:SPOT:BTCUSDT".parse()?;
    let minutes = marlin.historical(&btc, MINUTE_START, Interval::I1m).await?;
    let gaps = minutes.iter().filter(|c| c.missing).count();
    println!("{btc}: {} one-minute entries, {gaps} placeholders", minutes.len());
    for c in minutes.iter().take(10) {
        let mark = if c.missing { "missing" } else { "" };
        println!("  {} close={:.2} {mark}", c.time, c.close);
    }

    let aapl: AssetIdentifier = "MOCK:EQ:AAPL".parse()?;
    let days = marlin.historical(&aapl, 0, Interval::I1d).await?;
    let weekends = days.iter().filter(|c| c.missing).count();
    println!("{aapl}: {} daily entries, {weekends} without a session", days.len());

    let payload = CandlesPayload::from(days.into_iter().take(7).collect::<Vec<_>>());
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
