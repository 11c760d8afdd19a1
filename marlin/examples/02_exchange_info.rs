use std::sync::Arc;
use std::time::Duration;

use marlin::{BatchPolicy, Marlin, SymbolWhitelist};
use marlin_binance::{BinanceConnector, Segment};
use marlin_eod::EodConnector;

/// Builds the live metadata snapshot from Binance spot/futures and, when
/// `EOD_API_TOKEN` is set, from EOD Historical Data.
///
/// Set `MARLIN_EXAMPLES_OFFLINE=1` to serve a snapshot persisted by a previous run.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let crypto = SymbolWhitelist::from_lines("BTC\nETH\nSOL\n");
    let spot = BinanceConnector::builder(Segment::Spot)
        .whitelist(crypto.clone())
        .build()?;
    let perp = BinanceConnector::builder(Segment::Futures)
        .whitelist(crypto)
        .build()?;

    let mut builder = Marlin::builder()
        .with_connector(Arc::new(spot))
        .with_connector(Arc::new(perp))
        .provider_timeout(Duration::from_secs(10))
        .batch_policy(BatchPolicy::Partial)
        .offline(std::env::var("MARLIN_EXAMPLES_OFFLINE").is_ok());
    if let Ok(token) = std::env::var("EOD_API_TOKEN") {
        let stocks = EodConnector::new(token, SymbolWhitelist::from_lines("AAPL\nMSFT\n"))?;
        builder = builder.with_connector(Arc::new(stocks));
    }
    let marlin = builder.open().await?;

    let list = marlin.exchange_list();
    for exchange in &list.exchanges {
        let broker = list
            .broker_info
            .get(&exchange.broker_id)
            .map_or(exchange.broker_id.as_str(), |b| b.name.as_str());
        println!(
            "{broker} / {} ({} symbols, updated {})",
            exchange.name,
            exchange.symbols.len(),
            exchange.last_update
        );
        for (id, info) in &exchange.symbols {
            println!(
                "  {id}: {} {}/{} min notional {}",
                info.pair, info.base_asset, info.quote_asset, info.constraints.min_notional
            );
        }
    }
    Ok(())
}
