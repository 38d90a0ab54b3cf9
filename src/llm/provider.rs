use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::config::LlmConfig;

/// Model backend selected by `LLM_PROVIDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Native Ollama API (`/api/embed`, `/api/generate`).
    Ollama,
    /// Any OpenAI-compatible server (`/v1/embeddings`, `/v1/chat/completions`).
    OpenAi,
}

impl Provider {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        match config.provider.as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAi),
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Provider::Ollama => "Ollama",
            Provider::OpenAi => "OpenAI",
        }
    }
}

/// POST `body` to `{base_url}{path}` and decode the JSON reply.
///
/// Non-2xx replies become errors carrying the status and response text.
/// OpenAI-compatible servers get the API key as a bearer token.
pub async fn post_json<B, R>(
    client: &reqwest::Client,
    config: &LlmConfig,
    provider: Provider,
    path: &str,
    body: &B,
    timeout: Option<Duration>,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let url = format!("{}{}", config.base_url.trim_end_matches('/'), path);
    let mut request = client.post(&url).json(body);
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }
    if provider == Provider::OpenAi {
        if let Some(key) = config.api_key.as_deref() {
            request = request.bearer_auth(key);
        }
    }

    let resp = request
        .send()
        .await
        .with_context(|| format!("Failed to reach {} at {url}", provider.label()))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        anyhow::bail!("{} {path} returned {status}: {text}", provider.label());
    }

    resp.json()
        .await
        .with_context(|| format!("Unexpected {} {path} response body", provider.label()))
}
