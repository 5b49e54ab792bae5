use async_trait::async_trait;

use crate::errors::DecodeResult;
use crate::models::{Vin, VinRecord};

/// Resolves a VIN to vehicle attributes using an external service
#[async_trait]
pub trait VinDecoder: Send + Sync {
    /// Decode a single VIN with one upstream call
    async fn decode(&self, vin: &Vin) -> DecodeResult<VinRecord>;
}
