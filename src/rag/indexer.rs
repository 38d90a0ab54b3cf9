use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::chunking::chunk_text;
use crate::config::Config;
use crate::models::Document;
use crate::repo::walk_repo_files;
use crate::search::VectorIndex;

/// The repo directory produced no non-blank chunks.
#[derive(Debug, thiserror::Error)]
#[error("No indexable files found in {}", .repo_dir.display())]
pub struct NothingToIndex {
    pub repo_dir: PathBuf,
}

/// Walk `repo_dir` and split every indexable file into documents.
/// Whitespace-only chunks are dropped.
pub fn collect_documents(repo_dir: &Path, config: &Config) -> Vec<Document> {
    let files = walk_repo_files(repo_dir, &config.index);
    tracing::info!("Found {} indexable files in {}", files.len(), repo_dir.display());

    let mut documents = Vec::new();
    for file in files {
        let path = file.path.to_string_lossy().to_string();
        for chunk in chunk_text(&file.content, config.index.chunk_size, config.index.chunk_overlap) {
            if chunk.trim().is_empty() {
                continue;
            }
            documents.push(Document {
                path: path.clone(),
                content: chunk,
            });
        }
    }
    documents
}

/// Chunk, embed and persist the repo at `repo_dir` into `index_dir`,
/// replacing any previous index. Returns the new index.
///
/// When nothing is indexable the previous index is left untouched and a
/// [`NothingToIndex`] error is returned.
pub async fn index_repo(
    client: &reqwest::Client,
    config: &Config,
    repo_dir: &Path,
    index_dir: &Path,
) -> Result<VectorIndex> {
    let walk_dir = repo_dir.to_path_buf();
    let walk_config = config.clone();
    let documents =
        tokio::task::spawn_blocking(move || collect_documents(&walk_dir, &walk_config)).await?;

    if documents.is_empty() {
        return Err(NothingToIndex {
            repo_dir: repo_dir.to_path_buf(),
        }
        .into());
    }

    tracing::info!("Created {} chunks, embedding", documents.len());

    let embeddings = crate::llm::embed_documents(client, &config.llm, &documents)
        .await
        .context("Embedding failed")?;

    let index = VectorIndex::from_documents(&config.llm.embedding_model, documents, embeddings)?;

    let target = index_dir.to_path_buf();
    let index = tokio::task::spawn_blocking(move || -> Result<VectorIndex> {
        replace_index_dir(&index, &target)?;
        Ok(index)
    })
    .await??;

    tracing::info!(
        "Indexed {} chunks into {}",
        index.len(),
        index_dir.display()
    );
    Ok(index)
}

/// Where a new index is written before it replaces `index_dir`.
pub fn staging_dir(index_dir: &Path) -> PathBuf {
    let name = index_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "index".to_string());
    index_dir.with_file_name(format!("{name}.staging"))
}

/// Write `index` next to `index_dir`, then swap it in. A failed write
/// leaves the current index on disk untouched.
fn replace_index_dir(index: &VectorIndex, index_dir: &Path) -> Result<()> {
    let staging = staging_dir(index_dir);
    if staging.is_dir() {
        crate::workspace::force_remove_dir_all(&staging)?;
    }
    index
        .save(&staging)
        .with_context(|| format!("Failed to write index to {}", staging.display()))?;

    crate::workspace::force_remove_dir_all(index_dir)?;
    std::fs::rename(&staging, index_dir)
        .with_context(|| format!("Failed to move index into {}", index_dir.display()))?;
    Ok(())
}
