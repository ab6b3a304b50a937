use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::ServiceError,
    model::GenerationRequest,
    provider::{ImageProvider, ProviderKind, send_json},
};

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: [Instance<'a>; 1],
    parameters: Parameters<'a>,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
    sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_size: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

/// Imagen models served through the Gemini API `:predict` endpoint.
pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{model}:predict",
                base_url.trim_end_matches('/')
            ),
            model: model.to_string(),
        }
    }
}

fn request_body<'a>(prompt: &'a str, request: &'a GenerationRequest) -> PredictRequest<'a> {
    PredictRequest {
        instances: [Instance { prompt }],
        parameters: Parameters {
            sample_count: request.sample_count,
            aspect_ratio: request.aspect_ratio.as_deref().filter(|s| !s.is_empty()),
            image_size: request.image_size.as_deref().filter(|s| !s.is_empty()),
        },
    }
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        api_key: &SecretString,
        prompt: &str,
        request: &GenerationRequest,
    ) -> Result<String, ServiceError> {
        let body = request_body(prompt, request);
        info!(
            model = %self.model,
            sample_count = body.parameters.sample_count,
            "requesting Imagen prediction"
        );

        let value = send_json(
            ProviderKind::Gemini,
            self.client
                .post(&self.endpoint)
                .header("x-goog-api-key", api_key.expose_secret())
                .json(&body),
        )
        .await?;

        let parsed: PredictResponse = serde_json::from_value(value).unwrap_or_default();
        parsed
            .predictions
            .into_iter()
            .next()
            .and_then(|p| p.bytes_base64_encoded)
            .filter(|s| !s.is_empty())
            .ok_or(ServiceError::NoImageReturned)
    }
}
