use crate::errors::RagError;
use std::{future::Future, pin::Pin};

/// Provider interface for query embeddings.
///
/// The vectors must come from the same model that produced the index,
/// otherwise distances are meaningless.
pub trait EmbeddingsProvider: Send + Sync {
    /// Async embedding function.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>;
}

pub mod llm_embedder;
