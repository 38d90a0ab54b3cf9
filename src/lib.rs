//! # codebase-qa
//!
//! Ask natural-language questions about a source repository. A repo is
//! cloned from a git URL or uploaded as a zip, split into overlapping
//! fixed-size chunks, embedded, and stored in a vector index on disk.
//! Questions retrieve the nearest chunks, which are optionally compressed
//! by a remote service and handed to a chat model as context.
//!
//! ```text
//!  clone / upload ──► data/repo ──► chunk ──► embed ──► data/index
//!                                                          │
//!  question ──► embed ──► top-k ──► compress ──► prompt ──► LLM ──► answer
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration
//! - [`models`] - Shared data types and request/response bodies
//! - [`chunking`] - Fixed-size character chunking with overlap
//! - [`repo`] - git clone, zip extraction and file walking
//! - [`search::vector`] - Persisted cosine-similarity index
//! - [`llm`] - Embeddings, answer generation and context compression
//! - [`rag`] - `index_repo` / `ask_question` pipeline and prompt assembly
//! - [`workspace`] - On-disk layout and reset
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state

pub mod api;
pub mod chunking;
pub mod config;
pub mod llm;
pub mod models;
pub mod rag;
pub mod repo;
pub mod search;
pub mod state;
pub mod workspace;
