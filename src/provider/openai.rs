use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::ServiceError,
    model::GenerationRequest,
    provider::{ImageProvider, ProviderKind, send_json},
};

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}

/// OpenAI Images API (`/v1/images/generations`).
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    default_size: String,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str, default_size: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/images/generations", base_url.trim_end_matches('/')),
            model: model.to_string(),
            default_size: default_size.to_string(),
        }
    }

    fn request_body<'a>(
        &'a self,
        prompt: &'a str,
        request: &'a GenerationRequest,
    ) -> ImagesRequest<'a> {
        ImagesRequest {
            model: &self.model,
            prompt,
            n: request.sample_count,
            size: request.size.as_deref().unwrap_or(&self.default_size),
        }
    }

    async fn download(&self, url: &str) -> Result<String, ServiceError> {
        debug!(%url, "fetching image returned by url");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::ImageFetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ImageFetch(status.as_u16().to_string()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::ImageFetch(e.to_string()))?;
        Ok(STANDARD.encode(bytes))
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
        let body = self.request_body(prompt, request);
        info!(model = %self.model, n = body.n, size = body.size, "requesting OpenAI image");

        let value = send_json(
            ProviderKind::OpenAi,
            self.client
                .post(&self.endpoint)
                .bearer_auth(api_key.expose_secret())
                .json(&body),
        )
        .await?;

        // An unexpected shape is treated like an empty result.
        let parsed: ImagesResponse = serde_json::from_value(value).unwrap_or_default();
        let datum = parsed.data.into_iter().next().unwrap_or_default();

        if let Some(b64) = datum.b64_json.filter(|s| !s.is_empty()) {
            return Ok(b64);
        }
        match datum.url.filter(|s| !s.is_empty()) {
            Some(url) => self.download(&url).await,
            None => Err(ServiceError::NoImageReturned),
        }
    }
}
