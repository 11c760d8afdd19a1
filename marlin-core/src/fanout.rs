use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;

use futures::stream::{self, StreamExt};
use marlin_types::{BatchPolicy, MarlinError};

/// Aggregated results of one bounded fan-out.
#[derive(Debug)]
pub struct BatchOutcome<K, T> {
    /// Successful results keyed by input key.
    pub values: BTreeMap<K, T>,
    /// Failed keys with their errors; always empty under [`BatchPolicy::FailFast`].
    pub failures: Vec<(K, MarlinError)>,
}

impl<K: Ord, T> Default for BatchOutcome<K, T> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            failures: Vec::new(),
        }
    }
}

impl<K: Ord, T> BatchOutcome<K, T> {
    /// Number of keys that produced a result or a failure.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() + self.failures.len()
    }

    /// True when no key was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run `op` once per key with at most `limit` calls in flight.
///
/// Results are merged by the single polling task, so no lock is involved.
/// A `limit` of zero is treated as one.
///
/// Under [`BatchPolicy::FailFast`] the first failure is returned as
/// [`MarlinError::Batch`] naming its key, and outstanding calls are dropped.
/// Under [`BatchPolicy::Partial`] every key ends up in exactly one of
/// `values` or `failures`.
///
/// # Errors
/// Only under `FailFast`, as described above.
pub async fn fetch_bounded<K, T, I, F, Fut>(
    keys: I,
    limit: usize,
    policy: BatchPolicy,
    op: F,
) -> Result<BatchOutcome<K, T>, MarlinError>
where
    I: IntoIterator<Item = K>,
    K: Ord + Clone + Display,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<T, MarlinError>>,
{
    let mut results = stream::iter(keys.into_iter().map(|key| {
        let call = op(key.clone());
        async move { (key, call.await) }
    }))
    .buffer_unordered(limit.max(1));

    let mut outcome = BatchOutcome::default();
    while let Some((key, result)) = results.next().await {
        match result {
            Ok(value) => {
                outcome.values.insert(key, value);
            }
            Err(err) if policy == BatchPolicy::FailFast => {
                return Err(MarlinError::batch(key.to_string(), err));
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(key = %key, error = %err, "bounded fetch task failed");
                outcome.failures.push((key, err));
            }
        }
    }
    Ok(outcome)
}
