//! In-memory VIN cache repository
//!
//! Honours the same contract as the SQLite store, including duplicate-key
//! rejection and insertion-ordered listing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::VinCacheStore;
use crate::errors::{StoreError, StoreResult};
use crate::models::VinRecord;

#[derive(Clone, Default)]
pub struct InMemoryVinRepository {
    records: Arc<RwLock<Vec<VinRecord>>>,
}

impl InMemoryVinRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VinCacheStore for InMemoryVinRepository {
    async fn get(&self, vin: &str) -> StoreResult<Option<VinRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.vin == vin).cloned())
    }

    async fn insert(&self, record: &VinRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.vin == record.vin) {
            return Err(StoreError::duplicate_key(&record.vin));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn remove(&self, vin: &str) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.vin != vin);
        Ok(records.len() != before)
    }

    async fn list_all(&self) -> StoreResult<Vec<VinRecord>> {
        Ok(self.records.read().await.clone())
    }
}
