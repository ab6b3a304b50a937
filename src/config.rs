use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use anyhow::Context;
use secrecy::SecretString;

use crate::provider::ProviderKind;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub provider: ProviderKind,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
    pub default_size: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let listen_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".into())
            .parse()
            .unwrap_or_else(|_| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));

        let provider = match env::var("IMAGE_PROVIDER") {
            Ok(raw) => raw
                .parse::<ProviderKind>()
                .with_context(|| format!("invalid IMAGE_PROVIDER {raw:?}"))?,
            Err(_) => ProviderKind::OpenAi,
        };

        // Empty values count as unset, a blank key is never sent upstream.
        let api_key = env::var(provider.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);

        let model = env::var("IMAGE_MODEL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());
        let base_url = env::var("PROVIDER_BASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| provider.default_base_url().to_string());
        let default_size =
            env::var("DEFAULT_IMAGE_SIZE").unwrap_or_else(|_| "1024x1024".to_string());

        Ok(Self {
            listen_addr,
            provider,
            api_key,
            model,
            base_url,
            default_size,
        })
    }

    /// Config for `provider` using its default model and endpoint.
    pub fn for_provider(provider: ProviderKind, api_key: Option<&str>) -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
            provider,
            api_key: api_key.map(|key| SecretString::from(key.to_string())),
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            default_size: "1024x1024".to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
