//! Repository trait definitions

use async_trait::async_trait;

use crate::errors::StoreResult;
use crate::models::VinRecord;

/// Durable key-value store of decoded VINs
///
/// Implementations must be safe to share between concurrent request
/// handlers without external locking.
#[async_trait]
pub trait VinCacheStore: Send + Sync {
    /// Find a record by its VIN
    ///
    /// # Returns
    ///
    /// * `Ok(Some(VinRecord))` - Record cached
    /// * `Ok(None)` - Not cached
    /// * `Err(StoreError)` - Database or mapping error
    async fn get(&self, vin: &str) -> StoreResult<Option<VinRecord>>;

    /// Persist a new record, committing before returning
    ///
    /// Fails with [`crate::errors::StoreError::DuplicateKey`] when the VIN is
    /// already cached; records are never overwritten.
    async fn insert(&self, record: &VinRecord) -> StoreResult<()>;

    /// Delete a record, reporting whether a row was actually removed
    ///
    /// Removing an absent VIN is not an error.
    async fn remove(&self, vin: &str) -> StoreResult<bool>;

    /// Every cached record in the store's natural order
    ///
    /// Unpaginated: intended for exporting modest caches only.
    async fn list_all(&self) -> StoreResult<Vec<VinRecord>>;

    /// Check the backing storage is reachable
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
