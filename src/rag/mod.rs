//! The retrieval-augmented pipeline: build an index from a repo, then
//! answer questions from it.

pub mod indexer;
pub mod prompt;
pub mod query;

pub use indexer::{collect_documents, index_repo, staging_dir, NothingToIndex};
pub use prompt::{build_context, build_prompt, sanitize_for_prompt};
pub use query::{answer_from_index, ask_question, retrieve};
