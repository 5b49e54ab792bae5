//! Bulk export of the VIN cache
//!
//! Every export rewrites a single artifact file. The file is truncated up
//! front so a download is always available, even when the cache is empty.
//! The artifact carries the bytes it wrote, so callers never re-read the
//! shared file after the export lock is released.

pub mod format;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::ExportConfig;
use crate::errors::{AppError, AppResult};
use crate::repositories::VinCacheStore;

use self::format::serializer_for;

/// A written export file ready to be sent to the client
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
    pub rows: usize,
    /// File contents as written under the export lock
    pub contents: Vec<u8>,
}

#[derive(Clone)]
pub struct ExportService {
    store: Arc<dyn VinCacheStore>,
    config: ExportConfig,
    cache_file: Option<PathBuf>,
    export_lock: Arc<Mutex<()>>,
}

impl ExportService {
    /// `cache_file` is the store's backing file, when it has one
    pub fn new(
        store: Arc<dyn VinCacheStore>,
        config: ExportConfig,
        cache_file: Option<PathBuf>,
    ) -> Self {
        Self {
            store,
            config,
            cache_file,
            export_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn export(&self) -> AppResult<ExportArtifact> {
        let _guard = self.export_lock.lock().await;

        let mut artifact = ExportArtifact {
            path: self.config.file_path(),
            file_name: self.config.file_name(),
            content_type: self.config.format.content_type(),
            rows: 0,
            contents: Vec::new(),
        };

        tokio::fs::create_dir_all(&self.config.directory).await?;
        tokio::fs::File::create(&artifact.path).await?;

        if let Some(cache_file) = &self.cache_file {
            if !tokio::fs::try_exists(cache_file).await.unwrap_or(false) {
                warn!("Cache file not found: {}", cache_file.display());
                return Ok(artifact);
            }
        }

        let records = self.store.list_all().await?;
        if records.is_empty() {
            info!("Cache is empty, exporting placeholder {}", artifact.file_name);
            return Ok(artifact);
        }

        let bytes = serializer_for(self.config.format).serialize(&records)?;
        tokio::fs::write(&artifact.path, &bytes).await.map_err(|e| {
            AppError::export(format!("failed to write {}: {e}", artifact.path.display()))
        })?;

        artifact.rows = records.len();
        artifact.contents = bytes;
        info!(
            "Exported {} cached vins to {}",
            artifact.rows,
            artifact.path.display()
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportFormat;
    use crate::errors::StoreResult;
    use crate::models::VinRecord;
    use crate::repositories::InMemoryVinRepository;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    fn export_config(dir: &TempDir, format: ExportFormat) -> ExportConfig {
        ExportConfig {
            directory: dir.path().join("export"),
            file_stem: "vinCache".to_string(),
            format,
        }
    }

    fn record(vin: &str) -> VinRecord {
        VinRecord {
            vin: vin.to_string(),
            make: "PETERBILT".to_string(),
            model: "388".to_string(),
            model_year: "2014".to_string(),
            body_class: "Truck-Tractor".to_string(),
        }
    }

    /// Store whose bulk read stalls, keeping an export inside its critical section
    struct SlowListStore {
        inner: InMemoryVinRepository,
        delay: Duration,
    }

    #[async_trait]
    impl VinCacheStore for SlowListStore {
        async fn get(&self, vin: &str) -> StoreResult<Option<VinRecord>> {
            self.inner.get(vin).await
        }

        async fn insert(&self, record: &VinRecord) -> StoreResult<()> {
            self.inner.insert(record).await
        }

        async fn remove(&self, vin: &str) -> StoreResult<bool> {
            self.inner.remove(vin).await
        }

        async fn list_all(&self) -> StoreResult<Vec<VinRecord>> {
            tokio::time::sleep(self.delay).await;
            self.inner.list_all().await
        }
    }

    #[tokio::test]
    async fn test_empty_cache_yields_zero_length_file() {
        let dir = TempDir::new().unwrap();
        let service = ExportService::new(
            Arc::new(InMemoryVinRepository::new()),
            export_config(&dir, ExportFormat::Csv),
            None,
        );

        let artifact = service.export().await.unwrap();

        assert_eq!(artifact.file_name, "vinCache.csv");
        assert_eq!(artifact.rows, 0);
        assert!(artifact.contents.is_empty());
        assert_eq!(std::fs::metadata(&artifact.path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_export_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = InMemoryVinRepository::new();
        let vins = [
            "1XPWD40X1ED215307",
            "1XKWDB0X57J211825",
            "1XP5DB9X7YN526158",
            "4V4NC9EJXEN171694",
        ];
        for vin in vins {
            store.insert(&record(vin)).await.unwrap();
        }
        let service = ExportService::new(
            Arc::new(store),
            export_config(&dir, ExportFormat::Csv),
            None,
        );

        let artifact = service.export().await.unwrap();
        assert_eq!(artifact.rows, 4);

        let mut reader = csv::Reader::from_path(&artifact.path).unwrap();
        let rows: Vec<VinRecord> = reader.deserialize::<VinRecord>().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), vins.len());
        for (row, vin) in rows.iter().zip(vins) {
            assert_eq!(row, &record(vin));
        }
    }

    #[tokio::test]
    async fn test_stale_rows_are_truncated() {
        let dir = TempDir::new().unwrap();
        let store = InMemoryVinRepository::new();
        store.insert(&record("1XPWD40X1ED215307")).await.unwrap();
        let service = ExportService::new(
            Arc::new(store.clone()),
            export_config(&dir, ExportFormat::Jsonl),
            None,
        );

        let artifact = service.export().await.unwrap();
        assert!(std::fs::metadata(&artifact.path).unwrap().len() > 0);

        store.remove("1XPWD40X1ED215307").await.unwrap();
        let artifact = service.export().await.unwrap();
        assert_eq!(artifact.rows, 0);
        assert_eq!(std::fs::metadata(&artifact.path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_missing_cache_file_returns_placeholder() {
        let dir = TempDir::new().unwrap();
        let store = InMemoryVinRepository::new();
        store.insert(&record("1XPWD40X1ED215307")).await.unwrap();
        let service = ExportService::new(
            Arc::new(store),
            export_config(&dir, ExportFormat::Csv),
            Some(dir.path().join("missing.db")),
        );

        let artifact = service.export().await.unwrap();

        assert_eq!(artifact.rows, 0);
        assert_eq!(std::fs::metadata(&artifact.path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_parquet_export_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = InMemoryVinRepository::new();
        let vins = ["1XPWD40X1ED215307", "4V4NC9EJXEN171694"];
        for vin in vins {
            store.insert(&record(vin)).await.unwrap();
        }
        let service = ExportService::new(
            Arc::new(store),
            export_config(&dir, ExportFormat::Parquet),
            None,
        );

        let artifact = service.export().await.unwrap();

        assert_eq!(artifact.file_name, "vinCache.parq");
        assert_eq!(artifact.content_type, "application/vnd.apache.parquet");
        assert_eq!(std::fs::read(&artifact.path).unwrap(), artifact.contents);
        let rows = format::tests::read_parquet(artifact.contents);
        assert_eq!(rows, vins.map(record).to_vec());
    }

    #[tokio::test]
    async fn test_overlapping_exports_keep_their_own_contents() {
        let dir = TempDir::new().unwrap();
        let inner = InMemoryVinRepository::new();
        inner.insert(&record("1XPWD40X1ED215307")).await.unwrap();
        let service = ExportService::new(
            Arc::new(SlowListStore {
                inner,
                delay: Duration::from_millis(300),
            }),
            export_config(&dir, ExportFormat::Csv),
            None,
        );

        let first = service.export().await.unwrap();
        assert_eq!(first.rows, 1);

        // The second export truncates the shared file, then stalls in list_all
        let second = tokio::spawn({
            let service = service.clone();
            async move { service.export().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut reader = csv::Reader::from_reader(first.contents.as_slice());
        let rows: Vec<VinRecord> = reader.deserialize::<VinRecord>().map(|row| row.unwrap()).collect();
        assert_eq!(rows, vec![record("1XPWD40X1ED215307")]);

        let second = second.await.unwrap().unwrap();
        assert_eq!(second.rows, 1);
        assert_eq!(second.contents, first.contents);
    }
}
