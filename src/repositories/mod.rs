//! Repository pattern implementation for the VIN cache
//!
//! The orchestrator and export pipeline only ever see the
//! [`VinCacheStore`] trait, so the SQLite store can be swapped for the
//! in-memory one in tests.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vin_cache::repositories::{SqliteVinRepository, VinCacheStore};
//!
//! async fn example(pool: sqlx::SqlitePool) {
//!     let store: Arc<dyn VinCacheStore> = Arc::new(SqliteVinRepository::new(pool));
//!     let cached = store.get("1XPWD40X1ED215307").await;
//! }
//! ```

pub mod memory;
pub mod traits;
pub mod vin_cache;

// Re-export main traits and types
pub use memory::InMemoryVinRepository;
pub use traits::*;
pub use vin_cache::SqliteVinRepository;
