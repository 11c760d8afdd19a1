use std::sync::Arc;
use std::time::Duration;

use marlin_core::{MarlinError, SymbolWhitelist};
use url::Url;

use crate::adapter::{BinanceApi, RealAdapter};
use crate::{BinanceConnector, FilterKeys, Segment};

/// Builder for [`BinanceConnector`].
///
/// Defaults to the production base URL of the segment, a 5 second HTTP
/// timeout, the segment's own filter keys and an empty whitelist.
pub struct BinanceConnectorBuilder {
    segment: Segment,
    whitelist: SymbolWhitelist,
    base_url: Option<String>,
    timeout: Duration,
    keys: FilterKeys,
    api: Option<Arc<dyn BinanceApi>>,
}

impl BinanceConnectorBuilder {
    pub(crate) fn new(segment: Segment) -> Self {
        Self {
            segment,
            whitelist: SymbolWhitelist::default(),
            base_url: None,
            timeout: Duration::from_secs(5),
            keys: segment.filter_keys(),
            api: None,
        }
    }

    /// Base assets allowed in the listing.
    #[must_use]
    pub fn whitelist(mut self, whitelist: SymbolWhitelist) -> Self {
        self.whitelist = whitelist;
        self
    }

    /// Point the HTTP adapter at another host (e.g. a local mock server).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override filter key names.
    #[must_use]
    pub const fn filter_keys(mut self, keys: FilterKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Use a custom transport instead of HTTP.
    #[must_use]
    pub fn api(mut self, api: Arc<dyn BinanceApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Build the connector.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an unparsable base URL and `Connector` if the
    /// HTTP client cannot be created.
    pub fn build(self) -> Result<BinanceConnector, MarlinError> {
        let api: Arc<dyn BinanceApi> = match self.api {
            Some(api) => api,
            None => {
                let raw = self
                    .base_url
                    .unwrap_or_else(|| self.segment.default_base_url().to_string());
                let raw = if raw.ends_with('/') { raw } else { format!("{raw}/") };
                let base = Url::parse(&raw)
                    .map_err(|e| MarlinError::InvalidArg(format!("base url '{raw}': {e}")))?;
                Arc::new(RealAdapter::new(
                    base,
                    self.timeout,
                    self.segment.connector_name(),
                )?)
            }
        };
        Ok(BinanceConnector::with_api(self.segment, api, self.whitelist).with_filter_keys(self.keys))
    }
}
