use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::models::{ConversationTurn, Document};
use crate::search::VectorIndex;

use super::prompt::{build_context, build_prompt};

/// Load the index saved in `index_dir` and answer `query` against it.
pub async fn ask_question(
    client: &reqwest::Client,
    config: &Config,
    index_dir: &Path,
    query: &str,
    history: &[ConversationTurn],
) -> Result<String> {
    let dir = index_dir.to_path_buf();
    let index = tokio::task::spawn_blocking(move || VectorIndex::load(&dir)).await??;
    answer_from_index(client, config, &index, query, history).await
}

/// Retrieve the closest chunks for `query`, compress them, and ask the
/// chat model.
pub async fn answer_from_index(
    client: &reqwest::Client,
    config: &Config,
    index: &VectorIndex,
    query: &str,
    history: &[ConversationTurn],
) -> Result<String> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Query is required");
    }

    if index.embedding_model() != config.llm.embedding_model {
        tracing::warn!(
            "Index was built with {} but queries use {}; results may be meaningless",
            index.embedding_model(),
            config.llm.embedding_model
        );
    }

    let documents = retrieve(client, config, index, query).await?;
    tracing::info!("Retrieved {} chunks for question", documents.len());

    let raw_context = build_context(&documents);
    let context =
        crate::llm::compress_context(client, &config.compression, &raw_context, query).await;

    let prompt = build_prompt(&context, query, history);
    crate::llm::generate(client, &config.llm, &prompt)
        .await
        .context("Answer generation failed")
}

/// The `top_k` documents nearest to `query`.
pub async fn retrieve(
    client: &reqwest::Client,
    config: &Config,
    index: &VectorIndex,
    query: &str,
) -> Result<Vec<Document>> {
    let query_embedding = crate::llm::embed_single(client, &config.llm, query)
        .await
        .context("Failed to embed question")?;

    if index.dimension() != 0 && query_embedding.len() != index.dimension() {
        anyhow::bail!(
            "Question embedding has dimension {} but the index uses {}",
            query_embedding.len(),
            index.dimension()
        );
    }

    Ok(index
        .similarity_search(&query_embedding, config.index.top_k)
        .into_iter()
        .map(|hit| hit.document)
        .collect())
}
