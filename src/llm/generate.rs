use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::llm::provider::{post_json, Provider};

/// Generation can take minutes on CPU-only Ollama hosts.
const GENERATE_TIMEOUT: Duration = Duration::from_secs(300);

/// Send a single prompt to the configured model and return its full reply.
pub async fn generate(client: &reqwest::Client, config: &LlmConfig, prompt: &str) -> Result<String> {
    match Provider::from_config(config)? {
        Provider::Ollama => generate_ollama(client, config, prompt).await,
        Provider::OpenAi => generate_openai(client, config, prompt).await,
    }
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_ctx: u32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

async fn generate_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
) -> Result<String> {
    let req = OllamaGenerateRequest {
        model: &config.chat_model,
        prompt,
        stream: false,
        options: OllamaOptions {
            num_ctx: config.num_ctx,
            num_predict: config.num_predict,
        },
    };

    let body: OllamaGenerateResponse = post_json(
        client,
        config,
        Provider::Ollama,
        "/api/generate",
        &req,
        Some(GENERATE_TIMEOUT),
    )
    .await?;
    Ok(body.response)
}

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

async fn generate_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
) -> Result<String> {
    let req = OpenAiChatRequest {
        model: &config.chat_model,
        messages: vec![OpenAiMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens: config.num_predict,
    };

    let body: OpenAiChatResponse = post_json(
        client,
        config,
        Provider::OpenAi,
        "/v1/chat/completions",
        &req,
        Some(GENERATE_TIMEOUT),
    )
    .await?;
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("Chat completion returned no message content")
}
