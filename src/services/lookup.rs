//! Cache-aside VIN lookup
//!
//! A lookup validates the VIN, serves it from the store when cached, and
//! otherwise decodes it upstream and populates the store before answering.
//! Failed decodes are never cached.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::errors::{AppError, AppResult, DecodeError, StoreError};
use crate::models::{LookupResult, RemoveResult, VinRecord};
use crate::repositories::VinCacheStore;
use crate::sources::VinDecoder;
use crate::utils::validation::validate_vin;

#[derive(Clone)]
pub struct LookupService {
    store: Arc<dyn VinCacheStore>,
    decoder: Arc<dyn VinDecoder>,
}

impl LookupService {
    pub fn new(store: Arc<dyn VinCacheStore>, decoder: Arc<dyn VinDecoder>) -> Self {
        Self { store, decoder }
    }

    pub async fn lookup(&self, raw_vin: &str) -> AppResult<LookupResult> {
        let vin = validate_vin(raw_vin)?;

        if let Some(record) = self.store.get(vin.as_str()).await? {
            info!("Got vin {} from cache", vin);
            return Ok(LookupResult::from_record(record, true));
        }

        let record = self.decoder.decode(&vin).await.map_err(|e| {
            match &e {
                DecodeError::UpstreamUnavailable { message } => {
                    warn!("Decoder unavailable for vin {}: {}", vin, message)
                }
                DecodeError::MappingFailed { reason, .. } => {
                    info!("Vin {} did not decode: {}", vin, reason)
                }
                DecodeError::MalformedPayload { message } => {
                    error!("Unexpected decoder payload for vin {}: {}", vin, message)
                }
            }
            AppError::from(e)
        })?;

        info!("Inserting vin {} to cache", vin);
        match self.store.insert(&record).await {
            Ok(()) => Ok(LookupResult::from_record(record, false)),
            Err(StoreError::DuplicateKey { .. }) => self.resolve_insert_race(record).await,
            Err(e) => Err(e.into()),
        }
    }

    /// Another request cached the same VIN between our read and insert
    async fn resolve_insert_race(&self, decoded: VinRecord) -> AppResult<LookupResult> {
        info!(
            "Vin {} was cached concurrently, serving the stored record",
            decoded.vin
        );
        match self.store.get(&decoded.vin).await? {
            Some(stored) => Ok(LookupResult::from_record(stored, true)),
            None => Ok(LookupResult::from_record(decoded, false)),
        }
    }

    /// Best-effort removal; store failures are reported as `false`
    pub async fn remove(&self, raw_vin: &str) -> AppResult<RemoveResult> {
        let vin = validate_vin(raw_vin)?;

        let cache_delete_success = match self.store.remove(vin.as_str()).await {
            Ok(removed) => {
                info!("Remove vin {} from cache: {}", vin, removed);
                removed
            }
            Err(e) => {
                warn!("Error trying to remove vin {}. Error: {}", vin, e);
                false
            }
        };

        Ok(RemoveResult {
            vin: vin.into_inner(),
            cache_delete_success,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DecodeResult, StoreResult};
    use crate::models::Vin;
    use crate::repositories::InMemoryVinRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VIN: &str = "1XPWD40X1ED215307";

    /// Decoder double that counts calls and answers from a fixed outcome
    struct StubDecoder {
        outcome: Result<(), DecodeError>,
        calls: AtomicUsize,
    }

    impl StubDecoder {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(error: DecodeError) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(error),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VinDecoder for StubDecoder {
        async fn decode(&self, vin: &Vin) -> DecodeResult<VinRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map(|()| VinRecord {
                vin: vin.as_str().to_string(),
                make: "PETERBILT".to_string(),
                model: "388".to_string(),
                model_year: "2014".to_string(),
                body_class: "Truck-Tractor".to_string(),
            })
        }
    }

    /// Store whose insert always loses a race against another writer
    struct RacingStore {
        inner: InMemoryVinRepository,
        winner: VinRecord,
    }

    #[async_trait]
    impl VinCacheStore for RacingStore {
        async fn get(&self, vin: &str) -> StoreResult<Option<VinRecord>> {
            self.inner.get(vin).await
        }

        async fn insert(&self, record: &VinRecord) -> StoreResult<()> {
            self.inner.insert(&self.winner).await?;
            self.inner.insert(record).await
        }

        async fn remove(&self, vin: &str) -> StoreResult<bool> {
            self.inner.remove(vin).await
        }

        async fn list_all(&self) -> StoreResult<Vec<VinRecord>> {
            self.inner.list_all().await
        }
    }

    /// Store where every operation fails at the database level
    struct BrokenStore;

    #[async_trait]
    impl VinCacheStore for BrokenStore {
        async fn get(&self, _vin: &str) -> StoreResult<Option<VinRecord>> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn insert(&self, _record: &VinRecord) -> StoreResult<()> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn remove(&self, _vin: &str) -> StoreResult<bool> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn list_all(&self) -> StoreResult<Vec<VinRecord>> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
    }

    fn service(store: Arc<dyn VinCacheStore>, decoder: Arc<StubDecoder>) -> LookupService {
        LookupService::new(store, decoder)
    }

    #[tokio::test]
    async fn test_first_lookup_decodes_then_serves_from_cache() {
        let store = InMemoryVinRepository::new();
        let decoder = StubDecoder::ok();
        let service = service(Arc::new(store.clone()), decoder.clone());

        let first = service.lookup(VIN).await.unwrap();
        assert!(!first.cached_result);
        assert_eq!(decoder.calls(), 1);
        assert_eq!(store.len().await, 1);

        let second = service.lookup(VIN).await.unwrap();
        assert!(second.cached_result);
        assert_eq!(decoder.calls(), 1);
        assert_eq!(
            (first.make, first.model, first.model_year, first.body_class),
            (second.make, second.model, second.model_year, second.body_class)
        );
    }

    #[tokio::test]
    async fn test_lookup_normalizes_before_caching() {
        let store = InMemoryVinRepository::new();
        let service = service(Arc::new(store.clone()), StubDecoder::ok());

        let result = service.lookup(" 1xpwd40x1ed215307 ").await.unwrap();
        assert_eq!(result.vin, VIN);

        let again = service.lookup(VIN).await.unwrap();
        assert!(again.cached_result);
    }

    #[tokio::test]
    async fn test_invalid_vin_never_reaches_decoder() {
        let decoder = StubDecoder::ok();
        let service = service(Arc::new(InMemoryVinRepository::new()), decoder.clone());

        let err = service.lookup("123").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));
        assert_eq!(decoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_decode_failures_are_classified_and_not_cached() {
        let store = InMemoryVinRepository::new();

        let decoder = StubDecoder::failing(DecodeError::mapping_failed(VIN, "empty results"));
        let not_found = service(Arc::new(store.clone()), decoder.clone());
        assert!(matches!(
            not_found.lookup(VIN).await.unwrap_err(),
            AppError::NotDecodable { .. }
        ));
        assert!(matches!(
            not_found.lookup(VIN).await.unwrap_err(),
            AppError::NotDecodable { .. }
        ));
        assert_eq!(decoder.calls(), 2);

        let unavailable = service(
            Arc::new(store.clone()),
            StubDecoder::failing(DecodeError::upstream_unavailable("connection refused")),
        );
        assert!(matches!(
            unavailable.lookup(VIN).await.unwrap_err(),
            AppError::UpstreamUnavailable { .. }
        ));

        let malformed = service(
            Arc::new(store.clone()),
            StubDecoder::failing(DecodeError::malformed_payload("not json")),
        );
        assert!(matches!(
            malformed.lookup(VIN).await.unwrap_err(),
            AppError::Internal { .. }
        ));

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_key_race_serves_stored_record() {
        let winner = VinRecord {
            vin: VIN.to_string(),
            make: "WINNER".to_string(),
            model: "388".to_string(),
            model_year: "2014".to_string(),
            body_class: "Truck-Tractor".to_string(),
        };
        let store = RacingStore {
            inner: InMemoryVinRepository::new(),
            winner,
        };
        let service = service(Arc::new(store), StubDecoder::ok());

        let result = service.lookup(VIN).await.unwrap();
        assert!(result.cached_result);
        assert_eq!(result.make, "WINNER");
    }

    #[tokio::test]
    async fn test_store_failure_on_lookup_is_internal() {
        let service = service(Arc::new(BrokenStore), StubDecoder::ok());
        assert!(matches!(
            service.lookup(VIN).await.unwrap_err(),
            AppError::Store(_)
        ));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let service = service(Arc::new(InMemoryVinRepository::new()), StubDecoder::ok());

        let never_cached = service.remove(VIN).await.unwrap();
        assert!(!never_cached.cache_delete_success);

        service.lookup(VIN).await.unwrap();
        assert!(service.remove(VIN).await.unwrap().cache_delete_success);
        assert!(!service.remove(VIN).await.unwrap().cache_delete_success);

        let relookup = service.lookup(VIN).await.unwrap();
        assert!(!relookup.cached_result);
    }

    #[tokio::test]
    async fn test_remove_absorbs_store_failures() {
        let service = service(Arc::new(BrokenStore), StubDecoder::ok());

        let result = service.remove(VIN).await.unwrap();
        assert_eq!(result.vin, VIN);
        assert!(!result.cache_delete_success);

        assert!(matches!(
            service.remove("xxxxxxxxxxxxxxxx;").await.unwrap_err(),
            AppError::InvalidFormat { .. }
        ));
    }
}
