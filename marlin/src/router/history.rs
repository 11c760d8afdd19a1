use std::sync::Arc;

use marlin_core::connector::CandleProvider;
use marlin_core::{
    AssetIdentifier, Cadence, Candle, Capability, Interval, MarlinConnector, MarlinError,
    align_calendar_days, align_fixed_step,
};

use crate::Marlin;
use crate::core::provider_call_with_timeout;

fn candle_provider(c: &Arc<dyn MarlinConnector>) -> Result<&dyn CandleProvider, MarlinError> {
    c.as_candle_provider()
        .ok_or_else(|| MarlinError::unsupported(Capability::Candles.as_str()))
}

impl Marlin {
    /// Fetch a gap-explicit candle series for `asset` starting at `from`.
    ///
    /// Fixed-step intervals (one minute) return exactly
    /// [`MarlinConfig::fixed_capacity`](crate::MarlinConfig) entries aligned to
    /// `from, from + step, …`; `from` is required and must be step-aligned. A
    /// start further in the future than the configured guard is answered with
    /// placeholders only, without contacting upstream.
    ///
    /// Calendar-step intervals (one day) return one entry per calendar day from
    /// the first to the last available row; `from == 0` asks for the full history.
    ///
    /// # Errors
    /// - `InvalidArg` for an unknown broker ("invalid data source"), an unknown
    ///   exchange, or a missing / misaligned fixed-step start.
    /// - `Unsupported` when the connector does not serve `interval`.
    /// - `ProviderTimeout` or the connector's own error for upstream failures.
    /// - `Integrity` when upstream returned rows earlier than `from`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "marlin::router::history::historical",
            skip(self),
            fields(asset = %asset, from = from, interval = interval.as_str()),
        )
    )]
    pub async fn historical(
        &self,
        asset: &AssetIdentifier,
        from: i64,
        interval: Interval,
    ) -> Result<Vec<Candle>, MarlinError> {
        let conn = self.connector_for(asset)?;
        if !conn.supports_interval(interval) {
            return Err(MarlinError::unsupported(format!(
                "{}/{}",
                Capability::Candles,
                interval.as_str()
            )));
        }
        match interval.cadence() {
            Cadence::FixedStep { step } => self.fixed_step_history(conn, asset, from, step).await,
            Cadence::CalendarDay => self.calendar_history(conn, asset, from).await,
        }
    }

    async fn fixed_step_history(
        &self,
        conn: &Arc<dyn MarlinConnector>,
        asset: &AssetIdentifier,
        from: i64,
        step: i64,
    ) -> Result<Vec<Candle>, MarlinError> {
        if from == 0 {
            return Err(MarlinError::InvalidArg(
                "from is required for fixed-step intervals".to_string(),
            ));
        }
        if from.rem_euclid(step) != 0 {
            return Err(MarlinError::InvalidArg(format!(
                "from {from} is not aligned to {step}s"
            )));
        }

        let symbol = asset.symbol();
        let capacity = self.cfg.fixed_capacity;
        let guard = i64::try_from(self.cfg.future_guard.as_secs()).unwrap_or(i64::MAX);
        let now = chrono::Utc::now().timestamp();
        if from > now.saturating_add(guard) {
            #[cfg(feature = "tracing")]
            tracing::debug!(asset = %asset, from, now, "start lies in the future; skipping upstream");
            return align_fixed_step(symbol, &[], from, step, capacity);
        }

        let provider = candle_provider(conn)?;
        let rows = provider_call_with_timeout(
            conn.name(),
            Capability::Candles,
            self.cfg.provider_timeout,
            provider.raw_candles(symbol, from, capacity),
        )
        .await?;
        align_fixed_step(symbol, &rows, from, step, capacity)
    }

    async fn calendar_history(
        &self,
        conn: &Arc<dyn MarlinConnector>,
        asset: &AssetIdentifier,
        from: i64,
    ) -> Result<Vec<Candle>, MarlinError> {
        let symbol = asset.symbol();
        let provider = candle_provider(conn)?;
        // Calendar providers ignore the limit.
        let rows = provider_call_with_timeout(
            conn.name(),
            Capability::Candles,
            self.cfg.provider_timeout,
            provider.raw_candles(symbol, from, usize::MAX),
        )
        .await?;
        align_calendar_days(symbol, &rows)
    }
}
