use crate::config::{CacheMode, DatabaseConfig};
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the single cache table
pub const VIN_TABLE: &str = "vin_cache";

const CREATE_VIN_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS vin_cache (
        vin TEXT PRIMARY KEY NOT NULL,
        make TEXT NOT NULL,
        model TEXT NOT NULL,
        model_year TEXT NOT NULL,
        body_class TEXT NOT NULL
    )
"#;

const DROP_VIN_TABLE: &str = "DROP TABLE IF EXISTS vin_cache";

/// Shared handle to the SQLite cache file
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
    path: PathBuf,
    mode: CacheMode,
    remove_on_shutdown: bool,
}

impl Database {
    pub fn pool(&self) -> Pool<Sqlite> {
        self.pool.clone()
    }

    /// Path of the backing SQLite file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(5))
            .connect_with(options)
            .await?;

        Ok(Self {
            pool,
            path: config.path.clone(),
            mode: config.mode,
            remove_on_shutdown: config.remove_on_shutdown,
        })
    }

    /// Prepare the cache table according to the configured [`CacheMode`]
    pub async fn initialize(&self) -> Result<()> {
        let mut transaction = self.pool.begin().await?;

        if self.mode == CacheMode::Ephemeral {
            sqlx::query(DROP_VIN_TABLE)
                .execute(&mut *transaction)
                .await?;
            tracing::info!("Dropped existing {} table (ephemeral cache)", VIN_TABLE);
        }

        sqlx::query(CREATE_VIN_TABLE)
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;

        tracing::info!(
            "Cache table {} ready at {} (mode: {:?})",
            VIN_TABLE,
            self.path.display(),
            self.mode
        );
        Ok(())
    }

    /// Close the pool and, if configured, delete the backing file afterwards
    pub async fn close(&self) -> Result<()> {
        tracing::info!("Closing database connection");
        self.pool.close().await;

        if self.remove_on_shutdown {
            for path in self.backing_files() {
                match std::fs::remove_file(&path) {
                    Ok(()) => tracing::info!("Removed cache file {}", path.display()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(())
    }

    fn backing_files(&self) -> Vec<PathBuf> {
        let base = self.path.as_os_str().to_string_lossy();
        vec![
            self.path.clone(),
            PathBuf::from(format!("{base}-wal")),
            PathBuf::from(format!("{base}-shm")),
        ]
    }
}
