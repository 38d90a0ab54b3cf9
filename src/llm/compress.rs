use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::CompressionConfig;

#[derive(Serialize)]
struct CompressRequest<'a> {
    context: &'a str,
    prompt: &'a str,
    scaledown: CompressOptions,
}

#[derive(Serialize)]
struct CompressOptions {
    rate: &'static str,
}

#[derive(Deserialize)]
struct CompressResponse {
    #[serde(default)]
    successful: Option<bool>,
    #[serde(default)]
    compressed_prompt: Option<String>,
}

/// Ask the compression service to shrink `context` with respect to `query`.
///
/// Never fails: without an API key, or on any transport, status or
/// decoding problem, the original context is returned.
pub async fn compress_context(
    client: &reqwest::Client,
    config: &CompressionConfig,
    context: &str,
    query: &str,
) -> String {
    let Some(api_key) = config.api_key.as_deref() else {
        return context.to_string();
    };

    let req = CompressRequest {
        context,
        prompt: query,
        scaledown: CompressOptions { rate: "auto" },
    };

    let resp = match client
        .post(&config.url)
        .timeout(Duration::from_secs(config.timeout_secs))
        .header("x-api-key", api_key)
        .json(&req)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!("Context compression unavailable, using raw context: {e}");
            return context.to_string();
        }
    };

    let body: CompressResponse = match resp.json().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Unreadable compression response, using raw context: {e}");
            return context.to_string();
        }
    };

    if body.successful != Some(true) {
        tracing::debug!("Compression service reported failure, using raw context");
        return context.to_string();
    }

    match body.compressed_prompt {
        Some(compressed) if !compressed.is_empty() => {
            tracing::debug!(
                "Compressed context from {} to {} bytes",
                context.len(),
                compressed.len()
            );
            compressed
        }
        _ => context.to_string(),
    }
}
