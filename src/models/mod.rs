//! Domain models for the VIN cache
//!
//! [`VinRecord`] is the only persisted entity. [`LookupResult`] and
//! [`RemoveResult`] shape the HTTP responses and are never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column order shared by the store schema and every export format
pub const VIN_RECORD_COLUMNS: [&str; 5] = ["vin", "make", "model", "modelYear", "bodyClass"];

/// A validated, normalized vehicle identification number
///
/// Only [`crate::utils::validation::validate_vin`] constructs one, so holding
/// a `Vin` means the value is 17 uppercase ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vin(String);

impl Vin {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Decoded vehicle attributes keyed by VIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VinRecord {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub model_year: String,
    pub body_class: String,
}

impl VinRecord {
    /// Field values in [`VIN_RECORD_COLUMNS`] order
    pub fn columns(&self) -> [&str; 5] {
        [
            &self.vin,
            &self.make,
            &self.model,
            &self.model_year,
            &self.body_class,
        ]
    }
}

/// Response body for `GET /lookup/:vin`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub model_year: String,
    pub body_class: String,
    pub cached_result: bool,
}

impl LookupResult {
    pub fn from_record(record: VinRecord, cached_result: bool) -> Self {
        Self {
            vin: record.vin,
            make: record.make,
            model: record.model,
            model_year: record.model_year,
            body_class: record.body_class,
            cached_result,
        }
    }
}

/// Response body for `DELETE /remove/:vin`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResult {
    pub vin: String,
    pub cache_delete_success: bool,
}
