//! Centralized error handling for the VIN cache service
//!
//! This module unifies the error types used across the application layers
//! and provides the aliases each layer returns.
//!
//! # Error Categories
//!
//! - **Application Errors**: what a request handler ultimately reports
//! - **Store Errors**: SQLite operations, constraint violations, row mapping
//! - **Decode Errors**: classification of external decoder failures
//!
//! # Usage
//!
//! ```rust
//! use vin_cache::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::internal("something went wrong"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for cache store Results
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience type alias for decoder Results
pub type DecodeResult<T> = Result<T, DecodeError>;
