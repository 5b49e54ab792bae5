//! Service layer
//!
//! Services hold the business rules and depend only on the store and
//! decoder traits; the web layer stays a thin adapter over them.

pub mod export;
pub mod lookup;

pub use export::{ExportArtifact, ExportService};
pub use lookup::LookupService;
