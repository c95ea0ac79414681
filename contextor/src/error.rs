//! Typed error for the contextor crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Errors from the underlying rag-store crate (dataset, index, embedding).
    #[error("{0}")]
    Rag(#[from] rag_store::RagError),

    /// Answer generation failed.
    #[error("{0}")]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// Context records could not be serialized into the prompt.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
