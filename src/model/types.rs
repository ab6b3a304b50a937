use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

fn default_sample_count() -> u32 {
    1
}

/// Inbound generation body. Every field is optional on the wire so a missing
/// prompt is reported as such rather than as a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub image_size: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            sample_count: 1,
            ..Default::default()
        }
    }

    /// Parses a raw request body. Empty or non-JSON bodies are read as `{}`.
    pub fn from_body(raw: &[u8]) -> Result<Self, ServiceError> {
        let value = serde_json::from_slice::<serde_json::Value>(raw)
            .ok()
            .filter(|v| v.is_object())
            .unwrap_or_else(|| serde_json::json!({}));

        // A prompt of the wrong type is the same as no prompt.
        if !value.get("prompt").is_none_or(|p| p.is_string() || p.is_null()) {
            return Err(ServiceError::MissingPrompt);
        }

        serde_json::from_value(value).map_err(|e| ServiceError::BadRequest(e.to_string()))
    }

    /// Returns the trimmed-non-empty prompt or `MissingPrompt`.
    pub fn validate(&self) -> Result<&str, ServiceError> {
        let prompt = self
            .prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or(ServiceError::MissingPrompt)?;
        if self.sample_count == 0 {
            return Err(ServiceError::BadRequest(
                "sampleCount must be at least 1".into(),
            ));
        }
        Ok(prompt)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub image_base64: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub ok: bool,
    #[serde(rename = "hasAPIKey")]
    pub has_api_key: bool,
    pub provider: &'static str,
    pub model: String,
    pub version: &'static str,
}
