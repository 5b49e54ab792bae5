//! Error type definitions for the VIN cache service

use thiserror::Error;

/// Top-level application error type
///
/// Every variant maps onto exactly one HTTP status in
/// [`crate::web::responses`]. Variants that map to a 5xx status carry
/// detail meant for the logs only.
#[derive(Error, Debug)]
pub enum AppError {
    /// The caller supplied a VIN that is not 17 alphanumeric characters
    #[error("{message}")]
    InvalidFormat { message: String },

    /// The VIN is well formed but the decoder knows no such vehicle
    #[error("Vin {vin} could not be decoded to a known vehicle")]
    NotDecodable { vin: String },

    /// The decoder could not be reached or answered with an error status
    #[error("Vehicle decoding service unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// Cache store errors that cannot be recovered from locally
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Export file could not be written
    #[error("Export error: {message}")]
    Export { message: String },

    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Cache store specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Primary key constraint violated on insert
    #[error("Duplicate key: vin {vin} is already cached")]
    DuplicateKey { vin: String },

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A stored row could not be mapped back into a record
    #[error("Row mapping failed: {message}")]
    Mapping { message: String },
}

/// Classification of decoder failures
///
/// The orchestrator branches on these kinds rather than on the
/// underlying transport error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Transport failure or a non-success response status
    #[error("Decoder unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// The call succeeded but returned no usable vehicle data
    #[error("Vin {vin} did not decode: {reason}")]
    MappingFailed { vin: String, reason: String },

    /// The response body did not have the expected structure at all
    #[error("Malformed decoder payload: {message}")]
    MalformedPayload { message: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(error)
    }
}

impl From<DecodeError> for AppError {
    fn from(error: DecodeError) -> Self {
        match error {
            DecodeError::UpstreamUnavailable { message } => Self::UpstreamUnavailable { message },
            DecodeError::MappingFailed { vin, .. } => Self::NotDecodable { vin },
            DecodeError::MalformedPayload { message } => Self::Internal { message },
        }
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create an invalid format error with a custom message
    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a not decodable error for a VIN
    pub fn not_decodable<S: Into<String>>(vin: S) -> Self {
        Self::NotDecodable { vin: vin.into() }
    }

    /// Create an upstream unavailable error
    pub fn upstream_unavailable<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create an export error
    pub fn export<S: Into<String>>(message: S) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl StoreError {
    /// Create a duplicate key error
    pub fn duplicate_key<S: Into<String>>(vin: S) -> Self {
        Self::DuplicateKey { vin: vin.into() }
    }

    /// Create a row mapping error
    pub fn mapping<S: Into<String>>(message: S) -> Self {
        Self::Mapping {
            message: message.into(),
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

impl DecodeError {
    /// Create an upstream unavailable error
    pub fn upstream_unavailable<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create a mapping failed error
    pub fn mapping_failed<V: Into<String>, R: Into<String>>(vin: V, reason: R) -> Self {
        Self::MappingFailed {
            vin: vin.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed payload error
    pub fn malformed_payload<S: Into<String>>(message: S) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }
}
