//! External vehicle data sources
//!
//! A source turns a validated VIN into a [`crate::models::VinRecord`] or a
//! classified [`crate::errors::DecodeError`].

pub mod traits;
pub mod vpic;

pub use traits::VinDecoder;
pub use vpic::VpicDecoder;
