//! Similarity search over embedded chunks.

pub mod vector;

pub use vector::{VectorHit, VectorIndex};
