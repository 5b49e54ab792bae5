//! NHTSA vPIC decoder
//!
//! Calls `DecodeVinValues/{vin}?format=json` and reads the first element of
//! the `Results` array.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::traits::VinDecoder;
use crate::config::DecoderConfig;
use crate::errors::{DecodeError, DecodeResult};
use crate::models::{Vin, VinRecord};

const RESULTS_KEY: &str = "Results";
const MAKE_KEY: &str = "Make";
const MODEL_KEY: &str = "Model";
const MODEL_YEAR_KEY: &str = "ModelYear";
const BODY_CLASS_KEY: &str = "BodyClass";

pub struct VpicDecoder {
    client: Client,
    base_url: Url,
}

impl VpicDecoder {
    pub fn new(config: &DecoderConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Self::with_client(client, &config.base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid decoder base url '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Decoder base url '{base_url}' cannot carry a path");
        }
        Ok(Self { client, base_url })
    }

    fn decode_url(&self, vin: &Vin) -> DecodeResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DecodeError::malformed_payload(format!(
                    "decoder base url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push("DecodeVinValues")
            .push(vin.as_str());
        url.query_pairs_mut().append_pair("format", "json");
        Ok(url)
    }

    /// Map a vPIC response body onto a record
    pub fn map_response(vin: &Vin, body: &Value) -> DecodeResult<VinRecord> {
        let results = body
            .get(RESULTS_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                DecodeError::malformed_payload(format!("response has no '{RESULTS_KEY}' array"))
            })?;

        let first = results
            .first()
            .ok_or_else(|| DecodeError::mapping_failed(vin.as_str(), "empty results"))?;

        let field = |key: &str| -> DecodeResult<String> {
            first
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    DecodeError::mapping_failed(vin.as_str(), format!("missing '{key}'"))
                })
        };

        Ok(VinRecord {
            vin: vin.as_str().to_string(),
            make: field(MAKE_KEY)?,
            model: field(MODEL_KEY)?,
            model_year: field(MODEL_YEAR_KEY)?,
            body_class: field(BODY_CLASS_KEY)?,
        })
    }
}

#[async_trait]
impl VinDecoder for VpicDecoder {
    async fn decode(&self, vin: &Vin) -> DecodeResult<VinRecord> {
        let url = self.decode_url(vin)?;
        debug!("Decoding vin {} via {}", vin, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DecodeError::upstream_unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DecodeError::upstream_unavailable(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DecodeError::upstream_unavailable(format!("Failed to read response: {e}")))?;

        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| DecodeError::malformed_payload(format!("response is not JSON: {e}")))?;

        Self::map_response(vin, &body)
    }
}
