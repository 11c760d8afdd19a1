use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the marlin workspace.
///
/// Covers capability mismatches, argument validation, connector-tagged upstream
/// failures, series integrity violations, batch failures from bounded fan-outs,
/// and the metadata snapshot lifecycle (offline, corrupt, I/O).
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MarlinError {
    /// The requested capability is not implemented by the target connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "candles/1d").
        capability: String,
    },

    /// Issues with the returned or expected data (malformed rows, missing fields).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual connector returned an error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "earliest candle for BTCUSDT".
        what: String,
    },

    /// An individual provider call exceeded the configured timeout.
    #[error("provider timed out: {capability} via {connector}")]
    ProviderTimeout {
        /// Connector name that timed out.
        connector: String,
        /// Capability label (e.g. "candles", "symbol-listing").
        capability: String,
    },

    /// Upstream returned rows earlier than the requested start.
    #[error("integrity violation for {symbol}: requested start {requested}, received {received}")]
    Integrity {
        /// Symbol whose series could not be built.
        symbol: String,
        /// Requested start (unix seconds).
        requested: i64,
        /// Offending row time (unix seconds).
        received: i64,
    },

    /// One task of a bounded fan-out failed and the batch was aborted.
    #[error("batch aborted at {key}: {source}")]
    Batch {
        /// Key of the task that failed.
        key: String,
        /// The task's own error.
        source: Box<MarlinError>,
    },

    /// Offline mode was requested but no snapshot could be loaded.
    #[error("no exchange snapshot available offline at {path}")]
    CacheUnavailableOffline {
        /// Snapshot path that was consulted.
        path: String,
    },

    /// A persisted snapshot exists but cannot be decoded.
    #[error("corrupt exchange snapshot at {path}: {msg}")]
    SnapshotCorrupt {
        /// Snapshot path.
        path: String,
        /// Decoder or reader message.
        msg: String,
    },

    /// Filesystem failure while persisting or reading a snapshot.
    #[error("i/o failure at {path}: {msg}")]
    Io {
        /// Path involved in the failing operation.
        path: String,
        /// OS error message.
        msg: String,
    },
}

/// Coarse classification used by outer layers (for example an HTTP front-end)
/// to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Anything without a more specific bucket.
    Unexpected,
    /// The caller supplied an invalid request.
    UserError,
    /// Upstream or cached data is temporarily unavailable.
    Unavailable,
    /// The route exists but the broker does not offer it.
    NotImplemented,
    /// The requested resource does not exist.
    NotFound,
}

impl MarlinError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build an `Integrity` error.
    pub fn integrity(symbol: impl Into<String>, requested: i64, received: i64) -> Self {
        Self::Integrity {
            symbol: symbol.into(),
            requested,
            received,
        }
    }

    /// Helper: wrap a task failure into a `Batch` error keyed by the task key.
    pub fn batch(key: impl Into<String>, source: Self) -> Self {
        Self::Batch {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Helper: build an `Io` error from a path and an `std::io::Error`.
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            msg: err.to_string(),
        }
    }

    /// Returns true if this error should be surfaced to users as actionable.
    ///
    /// Capability absence and benign not-found conditions are not actionable.
    /// Batch errors are classified by their inner cause.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::Unsupported { .. } | Self::NotFound { .. } => false,
            Self::Batch { source, .. } => source.is_actionable(),
            _ => true,
        }
    }

    /// Unwrap nested `Batch` layers down to the originating error.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Batch { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Classify this error for transport layers.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            Self::InvalidArg(_) => ErrorKind::UserError,
            Self::Unsupported { .. } => ErrorKind::NotImplemented,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Connector { .. }
            | Self::ProviderTimeout { .. }
            | Self::CacheUnavailableOffline { .. } => ErrorKind::Unavailable,
            _ => ErrorKind::Unexpected,
        }
    }
}
