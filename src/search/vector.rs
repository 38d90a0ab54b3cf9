use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::Document;

const INDEX_FILE: &str = "index.json";

/// A stored vector entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VectorEntry {
    path: String,
    content: String,
    embedding: Vec<f32>,
}

/// Brute-force cosine similarity index over embedded documents, persisted
/// as a single JSON file in the index directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    embedding_model: String,
    dimension: usize,
    entries: Vec<VectorEntry>,
}

#[derive(Debug, Clone)]
pub struct VectorHit {
    pub document: Document,
    pub score: f32,
}

impl VectorIndex {
    /// Pair documents with their embeddings. `embeddings` must be parallel
    /// with `documents` and all vectors must share one dimension.
    pub fn from_documents(
        embedding_model: &str,
        documents: Vec<Document>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if documents.len() != embeddings.len() {
            anyhow::bail!(
                "Got {} embeddings for {} documents",
                embeddings.len(),
                documents.len()
            );
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = embeddings.iter().position(|e| e.len() != dimension) {
            anyhow::bail!(
                "Embedding {bad} has dimension {}, expected {dimension}",
                embeddings[bad].len()
            );
        }

        let entries = documents
            .into_iter()
            .zip(embeddings)
            .map(|(doc, embedding)| VectorEntry {
                path: doc.path,
                content: doc.content,
                embedding,
            })
            .collect();

        Ok(Self {
            embedding_model: embedding_model.to_string(),
            dimension,
            entries,
        })
    }

    pub fn index_path(index_dir: &Path) -> PathBuf {
        index_dir.join(INDEX_FILE)
    }

    pub fn exists(index_dir: &Path) -> bool {
        Self::index_path(index_dir).is_file()
    }

    /// Load a previously saved index.
    pub fn load(index_dir: &Path) -> Result<Self> {
        let path = Self::index_path(index_dir);
        if !path.is_file() {
            anyhow::bail!(
                "No index found at {}; index a repository first",
                path.display()
            );
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let index: Self = serde_json::from_str(&data)
            .with_context(|| format!("Corrupt index file {}", path.display()))?;
        tracing::debug!(
            "Loaded index with {} entries ({})",
            index.entries.len(),
            index.embedding_model
        );
        Ok(index)
    }

    /// Persist to disk (atomic write via temp file + rename).
    pub fn save(&self, index_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(index_dir)?;
        let path = Self::index_path(index_dir);
        let tmp_path = path.with_extension("json.tmp");
        let data = serde_json::to_string(self)?;
        std::fs::write(&tmp_path, data)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to move index into {}", path.display()))?;
        Ok(())
    }

    /// The `k` documents most similar to `query_embedding`, best first.
    pub fn similarity_search(&self, query_embedding: &[f32], k: usize) -> Vec<VectorHit> {
        let mut scored: Vec<(f32, &VectorEntry)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(query_embedding, &e.embedding), e))
            .collect();

        // Sort descending by score
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(score, e)| VectorHit {
                document: Document {
                    path: e.path.clone(),
                    content: e.content.clone(),
                },
                score,
            })
            .collect()
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, content: &str) -> Document {
        Document {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    fn sample_index() -> VectorIndex {
        VectorIndex::from_documents(
            "test-embed",
            vec![
                doc("src/main.rs", "fn main()"),
                doc("src/db.rs", "database connection"),
                doc("src/handlers.rs", "http handler"),
            ],
            vec![
                vec![0.1, 0.2, 0.9],
                vec![0.9, 0.1, 0.1],
                vec![0.2, 0.8, 0.3],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = sample_index();
        let hits = index.similarity_search(&[0.95, 0.05, 0.05], 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].document.path, "src/db.rs");
        assert!(hits[0].score >= hits[1].score);
        assert!(hits[1].score >= hits[2].score);
    }

    #[test]
    fn test_search_respects_k() {
        let index = sample_index();
        assert_eq!(index.similarity_search(&[0.0, 1.0, 0.0], 2).len(), 2);
        assert_eq!(index.similarity_search(&[0.0, 1.0, 0.0], 10).len(), 3);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let index = sample_index();
        index.save(dir.path()).unwrap();
        assert!(VectorIndex::exists(dir.path()));

        let loaded = VectorIndex::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.dimension(), 3);
        assert_eq!(loaded.embedding_model(), "test-embed");
        let hits = loaded.similarity_search(&[0.1, 0.9, 0.2], 1);
        assert_eq!(hits[0].document.path, "src/handlers.rs");
    }

    #[test]
    fn test_load_missing_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = VectorIndex::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("No index found"));
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let result = VectorIndex::from_documents("m", vec![doc("a", "b")], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let result = VectorIndex::from_documents(
            "m",
            vec![doc("a", "1"), doc("b", "2")],
            vec![vec![1.0, 0.0], vec![1.0]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }
}
