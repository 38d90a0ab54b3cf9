//! HTTP clients for the model backends: embeddings, answer generation, and
//! the remote context compressor.

pub mod compress;
pub mod embeddings;
pub mod generate;
pub mod provider;

pub use compress::compress_context;
pub use embeddings::{embed_batch, embed_documents, embed_single};
pub use generate::generate;
