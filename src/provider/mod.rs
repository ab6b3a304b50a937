//! Upstream image-generation providers.
//!
//! A deployment talks to exactly one provider, chosen at startup through
//! [`ProviderKind`]. Both implementations share the HTTP plumbing in
//! [`send_json`] so upstream failures surface the same way regardless of
//! which API produced them.

mod gemini;
mod openai;

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::warn;

use crate::{config::AppConfig, error::ServiceError, model::GenerationRequest};

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Human-readable name used as the prefix of upstream error messages.
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
        }
    }

    pub fn api_key_env(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-image-1",
            ProviderKind::Gemini => "imagen-4.0-generate-001",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" | "imagen" | "google" => Ok(ProviderKind::Gemini),
            other => Err(anyhow::anyhow!(
                "unknown image provider `{other}`, expected `openai` or `gemini`"
            )),
        }
    }
}

/// Turns a prompt into a single base64-encoded image.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// Makes one generation call upstream. Implementations may issue a second
    /// request to download the image when the provider only returns a URL.
    async fn generate(
        &self,
        api_key: &SecretString,
        prompt: &str,
        request: &GenerationRequest,
    ) -> Result<String, ServiceError>;
}

pub fn build_provider(config: &AppConfig, client: reqwest::Client) -> Arc<dyn ImageProvider> {
    match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            client,
            &config.base_url,
            &config.model,
            &config.default_size,
        )),
        ProviderKind::Gemini => {
            Arc::new(GeminiProvider::new(client, &config.base_url, &config.model))
        }
    }
}

/// Sends `request` and returns the parsed JSON body of a successful response.
///
/// Non-success statuses become [`ServiceError::Upstream`] with the raw body
/// text attached, unparsable success bodies become
/// [`ServiceError::MalformedUpstream`].
pub(crate) async fn send_json(
    kind: ProviderKind,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ServiceError> {
    let provider = kind.label();
    let unreachable = |err: reqwest::Error| ServiceError::UpstreamUnreachable {
        provider,
        message: err.to_string(),
    };

    let response = request.send().await.map_err(unreachable)?;
    let status = response.status();
    let text = response.text().await.map_err(unreachable)?;

    if !status.is_success() {
        warn!(provider, status = status.as_u16(), "upstream rejected generation request");
        return Err(ServiceError::Upstream {
            provider,
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|err| {
        warn!(provider, %err, "upstream returned a body that is not JSON");
        ServiceError::MalformedUpstream { provider }
    })
}
