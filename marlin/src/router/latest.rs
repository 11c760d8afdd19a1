use marlin_core::{AssetIdentifier, Cadence, Candle, Capability, MarlinError, RawCandle};

use crate::Marlin;
use crate::core::provider_call_with_timeout;

impl Marlin {
    /// Fetch the most recent rows for `asset` from `from`, as reported upstream.
    ///
    /// Asks for [`MarlinConfig::latest_limit`](crate::MarlinConfig) rows and
    /// converts them one-to-one; gaps are not filled. Only fixed-step
    /// connectors serve this route.
    ///
    /// # Errors
    /// `InvalidArg` for an unknown broker or exchange, `Unsupported` for
    /// calendar-step connectors, or the upstream error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "marlin::router::latest::latest",
            skip(self),
            fields(asset = %asset, from = from),
        )
    )]
    pub async fn latest(&self, asset: &AssetIdentifier, from: i64) -> Result<Vec<Candle>, MarlinError> {
        let conn = self.connector_for(asset)?;
        let fixed = conn
            .resolutions()
            .iter()
            .any(|i| matches!(i.cadence(), Cadence::FixedStep { .. }));
        let provider = conn
            .as_candle_provider()
            .filter(|_| fixed)
            .ok_or_else(|| MarlinError::unsupported(format!("latest {}", Capability::Candles)))?;

        let rows = provider_call_with_timeout(
            conn.name(),
            Capability::Latest,
            self.cfg.provider_timeout,
            provider.raw_candles(asset.symbol(), from, self.cfg.latest_limit),
        )
        .await?;
        Ok(rows.iter().map(RawCandle::to_candle).collect())
    }
}
