//! Exchange metadata cache.
//!
//! Lifecycle:
//! - `open` loads the persisted snapshot; if there is none it fails when
//!   offline, otherwise it fetches synchronously and persists the result.
//! - `snapshot` returns the installed list at once. When online and any
//!   exchange entry is older than the staleness threshold, it spawns one
//!   background refresh unless one is already running.
//! - A finished refresh installs the new list, persists it, clears the
//!   in-flight flag and wakes any [`RefreshTicket`] holders. A failed refresh
//!   keeps the previous list; stale reads within `retry_backoff` of the
//!   failure do not spawn another one. `force_refresh` ignores the backoff.
//! - Snapshot reads and writes run on tokio's blocking pool.
//!
//! One mutex guards the installed pointer, the in-flight flag and the waiter
//! list; it is never held across an await or a disk write.

mod source;
mod store;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use marlin_core::{CacheConfig, ExchangeList, MarlinError};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::Instant;

pub use source::{ConnectorSource, ExchangeListSource};
pub use store::SnapshotStore;

type Waiter = oneshot::Sender<Result<(), MarlinError>>;

struct State {
    current: Arc<ExchangeList>,
    refreshing: bool,
    retry_after: Option<Instant>,
    waiters: Vec<Waiter>,
}

struct Inner {
    state: Mutex<State>,
    source: Arc<dyn ExchangeListSource>,
    store: SnapshotStore,
    offline: bool,
    staleness: Duration,
    retry_backoff: Duration,
    runtime: Handle,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn refresh(self: Arc<Self>) {
        let outcome = match self.source.fetch().await {
            Ok(list) => {
                let list = Arc::new(list);
                {
                    let mut st = self.lock();
                    st.current = Arc::clone(&list);
                    st.retry_after = None;
                }
                #[cfg(feature = "tracing")]
                tracing::info!(exchanges = list.exchanges.len(), "exchange info refreshed");
                self.persist(list).await;
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    error = %e,
                    retry_in_secs = self.retry_backoff.as_secs(),
                    "exchange info refresh failed; keeping previous snapshot"
                );
                self.lock().retry_after = Instant::now().checked_add(self.retry_backoff);
                Err(e)
            }
        };

        let waiters = {
            let mut st = self.lock();
            st.refreshing = false;
            std::mem::take(&mut st.waiters)
        };
        for w in waiters {
            let _ = w.send(outcome.clone());
        }
    }

    async fn persist(&self, list: Arc<ExchangeList>) {
        let store = self.store.clone();
        if let Err(_e) = on_blocking_pool(move || store.save(&list)).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, path = %self.store.path().display(), "failed to persist exchange info");
        }
    }
}

/// Run filesystem work off the runtime workers.
async fn on_blocking_pool<T, F>(f: F) -> Result<T, MarlinError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, MarlinError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .unwrap_or_else(|e| Err(MarlinError::Other(format!("blocking task failed: {e}"))))
}

/// Completion handle for one background refresh.
#[derive(Debug)]
pub struct RefreshTicket {
    rx: oneshot::Receiver<Result<(), MarlinError>>,
}

impl RefreshTicket {
    /// Wait for the refresh to finish.
    ///
    /// # Errors
    /// Returns the refresh's error, or `Other` if the refresh task was dropped
    /// before finishing (e.g. runtime shutdown).
    pub async fn wait(self) -> Result<(), MarlinError> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(MarlinError::Other("refresh task dropped".to_string())))
    }
}

/// Read-mostly holder of the current [`ExchangeList`].
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ExchangeInfoCache {
    inner: Arc<Inner>,
}

impl ExchangeInfoCache {
    /// Bring the cache to its populated state.
    ///
    /// Must be called within a tokio runtime; background refreshes are spawned
    /// on that runtime.
    ///
    /// # Errors
    /// - `SnapshotCorrupt` if a persisted snapshot exists but cannot be decoded.
    /// - `CacheUnavailableOffline` if offline and nothing is persisted.
    /// - The source's error if the initial fetch fails.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "marlin::cache::open",
            skip(source, store, cfg),
            fields(path = %store.path().display(), offline = cfg.offline),
        )
    )]
    pub async fn open(
        source: Arc<dyn ExchangeListSource>,
        store: SnapshotStore,
        cfg: &CacheConfig,
    ) -> Result<Self, MarlinError> {
        let runtime = Handle::try_current()
            .map_err(|e| MarlinError::Other(format!("exchange info cache needs a tokio runtime: {e}")))?;

        let loaded = {
            let store = store.clone();
            on_blocking_pool(move || store.load()).await?
        };
        let current = match loaded {
            Some(list) => {
                #[cfg(feature = "tracing")]
                tracing::info!(exchanges = list.exchanges.len(), "loaded persisted exchange info");
                Arc::new(list)
            }
            None if cfg.offline => {
                return Err(MarlinError::CacheUnavailableOffline {
                    path: store.path().display().to_string(),
                });
            }
            None => {
                let list = Arc::new(source.fetch().await?);
                let (to_save, saver) = (Arc::clone(&list), store.clone());
                if let Err(_e) = on_blocking_pool(move || saver.save(&to_save)).await {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_e, "failed to persist exchange info");
                }
                list
            }
        };

        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    current,
                    refreshing: false,
                    retry_after: None,
                    waiters: Vec::new(),
                }),
                source,
                store,
                offline: cfg.offline,
                staleness: cfg.staleness,
                retry_backoff: cfg.retry_backoff,
                runtime,
            }),
        })
    }

    /// The installed snapshot; spawns a background refresh when it is stale.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ExchangeList> {
        let now = chrono::Utc::now().timestamp();
        let mut st = self.inner.lock();
        let current = Arc::clone(&st.current);
        if self.inner.offline || !current.is_stale(now, self.inner.staleness) {
            return current;
        }
        if st.refreshing {
            #[cfg(feature = "tracing")]
            tracing::debug!("exchange info stale; refresh already in flight");
            return current;
        }
        if st.retry_after.is_some_and(|t| Instant::now() < t) {
            #[cfg(feature = "tracing")]
            tracing::debug!("exchange info stale; backing off after a failed refresh");
            return current;
        }
        st.refreshing = true;
        drop(st);

        #[cfg(feature = "tracing")]
        tracing::debug!("exchange info stale; spawning refresh");
        self.spawn_refresh();
        current
    }

    /// Completion handle for the refresh currently in flight, if any.
    #[must_use]
    pub fn refresh_in_flight(&self) -> Option<RefreshTicket> {
        let mut st = self.inner.lock();
        if !st.refreshing {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        st.waiters.push(tx);
        Some(RefreshTicket { rx })
    }

    /// Start a refresh regardless of staleness, or join the one in flight.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the cache is offline.
    pub fn force_refresh(&self) -> Result<RefreshTicket, MarlinError> {
        if self.inner.offline {
            return Err(MarlinError::InvalidArg(
                "exchange info cache is offline".to_string(),
            ));
        }
        let (tx, rx) = oneshot::channel();
        let spawn = {
            let mut st = self.inner.lock();
            st.waiters.push(tx);
            !std::mem::replace(&mut st.refreshing, true)
        };
        if spawn {
            self.spawn_refresh();
        }
        Ok(RefreshTicket { rx })
    }

    /// Whether the cache never contacts upstream.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.inner.offline
    }

    fn spawn_refresh(&self) {
        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(inner.refresh());
    }
}
