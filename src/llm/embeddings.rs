use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::llm::provider::{post_json, Provider};
use crate::models::Document;

/// Byte cap per embedding input. Default chunks are well under it; it only
/// bites when `CODEBASE_QA_CHUNK_SIZE` is raised past what nomic-embed-text
/// can take in one 8k-token window.
const MAX_EMBED_INPUT_BYTES: usize = 3_000;

const OLLAMA_BATCH: usize = 32;
const OPENAI_BATCH: usize = 64;

fn clip_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_INPUT_BYTES {
        return text;
    }
    let mut end = MAX_EMBED_INPUT_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}

/// Embed every text, in order. Requests are batched per provider and each
/// batch must come back with one vector per input.
pub async fn embed_batch(
    client: &reqwest::Client,
    config: &LlmConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let provider = Provider::from_config(config)?;
    let batch_size = match provider {
        Provider::Ollama => OLLAMA_BATCH,
        Provider::OpenAi => OPENAI_BATCH,
    };

    let mut vectors = Vec::with_capacity(texts.len());
    for (n, batch) in texts.chunks(batch_size).enumerate() {
        let inputs: Vec<&str> = batch.iter().map(|t| clip_for_embedding(t)).collect();
        let model = config.embedding_model.as_str();

        let batch_vectors = match provider {
            Provider::Ollama => {
                let req = OllamaEmbedRequest {
                    model,
                    input: &inputs,
                    truncate: true,
                };
                let resp: OllamaEmbedResponse =
                    post_json(client, config, provider, "/api/embed", &req, None).await?;
                resp.embeddings
            }
            Provider::OpenAi => {
                let req = OpenAiEmbedRequest {
                    model,
                    input: &inputs,
                };
                let resp: OpenAiEmbedResponse =
                    post_json(client, config, provider, "/v1/embeddings", &req, None).await?;
                resp.data.into_iter().map(|d| d.embedding).collect()
            }
        };

        if batch_vectors.len() != batch.len() {
            anyhow::bail!(
                "Embedding batch {n} returned {} vectors for {} inputs",
                batch_vectors.len(),
                batch.len()
            );
        }
        tracing::debug!("Embedded batch {n} ({} texts)", batch.len());
        vectors.extend(batch_vectors);
    }

    Ok(vectors)
}

/// Embed the content of each document; vectors line up with `documents`.
pub async fn embed_documents(
    client: &reqwest::Client,
    config: &LlmConfig,
    documents: &[Document],
) -> Result<Vec<Vec<f32>>> {
    let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
    embed_batch(client, config, &texts).await
}

pub async fn embed_single(
    client: &reqwest::Client,
    config: &LlmConfig,
    text: &str,
) -> Result<Vec<f32>> {
    embed_batch(client, config, &[text.to_string()])
        .await?
        .into_iter()
        .next()
        .context("No embedding returned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ollama_at(server: &MockServer) -> LlmConfig {
        LlmConfig {
            base_url: server.uri(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_clip_leaves_short_text() {
        assert_eq!(clip_for_embedding("fn main() {}"), "fn main() {}");
    }

    #[test]
    fn test_clip_lands_on_char_boundary() {
        let text = "é".repeat(MAX_EMBED_INPUT_BYTES);
        let out = clip_for_embedding(&text);
        assert!(out.len() <= MAX_EMBED_INPUT_BYTES);
        assert!(text.is_char_boundary(out.len()));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let client = reqwest::Client::new();
        let config = LlmConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..LlmConfig::default()
        };
        assert!(embed_batch(&client, &config, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let client = reqwest::Client::new();
        let config = LlmConfig {
            provider: "carrier-pigeon".into(),
            ..LlmConfig::default()
        };
        let err = embed_batch(&client, &config, &["x".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown LLM provider"));
    }

    #[tokio::test]
    async fn test_embed_documents_keeps_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[1.0, 0.0], [0.0, 1.0]]
            })))
            .mount(&server)
            .await;

        let docs = vec![
            Document {
                path: "a.rs".into(),
                content: "alpha".into(),
            },
            Document {
                path: "b.rs".into(),
                content: "beta".into(),
            },
        ];
        let vectors = embed_documents(&reqwest::Client::new(), &ollama_at(&server), &docs)
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_short_batch_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"embeddings": [[1.0]]})),
            )
            .mount(&server)
            .await;

        let texts = vec!["a".to_string(), "b".to_string()];
        let err = embed_batch(&reqwest::Client::new(), &ollama_at(&server), &texts)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("1 vectors for 2 inputs"));
    }
}
