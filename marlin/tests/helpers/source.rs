use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use marlin::{ExchangeList, ExchangeListSource, MarlinError};
use tokio::sync::Semaphore;

use super::{now, sample_list};

enum Mode {
    Fresh,
    Fail(MarlinError),
}

/// Metadata source counting its upstream calls.
///
/// A gated source blocks every fetch until the test releases a permit.
pub struct ScriptedSource {
    mode: Mode,
    calls: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedSource {
    /// Every fetch returns [`sample_list`] stamped with the current time.
    pub fn fresh() -> Self {
        Self {
            mode: Mode::Fresh,
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    /// Every fetch fails with `err`.
    pub fn failing(err: MarlinError) -> Self {
        Self {
            mode: Mode::Fail(err),
            ..Self::fresh()
        }
    }

    /// Block fetches on `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ExchangeListSource for ScriptedSource {
    async fn fetch(&self) -> Result<ExchangeList, MarlinError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| MarlinError::Other(e.to_string()))?
                .forget();
        }
        match &self.mode {
            Mode::Fresh => Ok(sample_list(now())),
            Mode::Fail(e) => Err(e.clone()),
        }
    }
}
