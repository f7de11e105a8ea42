//! Embedding seam for semantic keyword matching.
//!
//! The analysis pipeline consumes sentence embeddings as a black box behind
//! the `Embedder` trait. `AppState` holds an `Arc<dyn Embedder>`, swapped at
//! startup, so a model-backed implementation can replace the default without
//! touching the keyword engine.

pub mod hashed;

use async_trait::async_trait;

pub use hashed::HashedNgramEmbedder;

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("embedding inference failed: {0}")]
    InferenceFailed(String),
}

/// Produces one vector per input text. Vectors from a single backend share a
/// dimension and are expected to be L2-normalized.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

/// Cosine similarity of two vectors. Zero when either vector is empty,
/// mismatched in length, or degenerate (zero norm).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
