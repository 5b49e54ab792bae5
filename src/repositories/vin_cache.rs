//! SQLite-backed VIN cache repository

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use super::traits::VinCacheStore;
use crate::errors::{StoreError, StoreResult};
use crate::models::VinRecord;

/// Repository implementation over the `vin_cache` table
#[derive(Clone)]
pub struct SqliteVinRepository {
    pool: Pool<Sqlite>,
}

impl SqliteVinRepository {
    /// Create a new VIN repository
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> StoreResult<VinRecord> {
        let column = |name: &str| -> StoreResult<String> {
            row.try_get::<String, _>(name).map_err(|e| {
                StoreError::mapping(format!("unable to read column '{name}': {e}"))
            })
        };

        Ok(VinRecord {
            vin: column("vin")?,
            make: column("make")?,
            model: column("model")?,
            model_year: column("model_year")?,
            body_class: column("body_class")?,
        })
    }
}

#[async_trait]
impl VinCacheStore for SqliteVinRepository {
    async fn get(&self, vin: &str) -> StoreResult<Option<VinRecord>> {
        let row = sqlx::query(
            "SELECT vin, make, model, model_year, body_class FROM vin_cache WHERE vin = ?",
        )
        .bind(vin)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, record: &VinRecord) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO vin_cache (vin, make, model, model_year, body_class) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.vin)
        .bind(&record.make)
        .bind(&record.model)
        .bind(&record.model_year)
        .bind(&record.body_class)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::duplicate_key(&record.vin))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, vin: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM vin_cache WHERE vin = ?")
            .bind(vin)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_all(&self) -> StoreResult<Vec<VinRecord>> {
        let rows = sqlx::query(
            "SELECT vin, make, model, model_year, body_class FROM vin_cache ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
