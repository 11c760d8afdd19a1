use std::sync::Arc;

use marlin_core::{AssetIdentifier, AssetInfo, ExchangeList, MarlinError};

use crate::Marlin;

impl Marlin {
    /// The currently installed metadata snapshot.
    ///
    /// Never waits for upstream; may spawn a background refresh when the
    /// snapshot is stale.
    #[must_use]
    pub fn exchange_list(&self) -> Arc<ExchangeList> {
        self.cache.snapshot()
    }

    /// Metadata for one asset from the current snapshot.
    ///
    /// # Errors
    /// Returns `NotFound` when the snapshot has no entry for `asset`.
    pub fn asset_info(&self, asset: &AssetIdentifier) -> Result<AssetInfo, MarlinError> {
        self.exchange_list()
            .asset(asset)
            .cloned()
            .ok_or_else(|| MarlinError::not_found(format!("asset info for {asset}")))
    }
}
