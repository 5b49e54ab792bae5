//! Input validation for vehicle identification numbers
//!
//! # Usage
//!
//! ```rust
//! use vin_cache::utils::validation::validate_vin;
//!
//! let vin = validate_vin(" 1xpwd40x1ed215307 ").unwrap();
//! assert_eq!(vin.as_str(), "1XPWD40X1ED215307");
//! assert!(validate_vin("123").is_err());
//! ```

use thiserror::Error;

use crate::errors::AppError;
use crate::models::Vin;

/// Number of characters in a VIN
pub const VIN_LENGTH: usize = 17;

/// Validation errors that can occur for a candidate VIN
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Wrong length or a character outside `[A-Za-z0-9]`
    #[error("Vin {value} must be a 17 alphanumeric characters string.")]
    InvalidFormat { value: String },
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::invalid_format(error.to_string())
    }
}

/// Trim, uppercase and check a raw VIN
///
/// The error echoes the trimmed input as the caller sent it.
pub fn validate_vin(raw: &str) -> Result<Vin, ValidationError> {
    let trimmed = raw.trim();

    let well_formed = trimmed.chars().count() == VIN_LENGTH
        && trimmed.chars().all(|c| c.is_ascii_alphanumeric());

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            value: trimmed.to_string(),
        });
    }

    Ok(Vin::new_unchecked(trimmed.to_ascii_uppercase()))
}
