use std::sync::Arc;

use ai_llm_service::{
    AiLlmError, LlmServiceProfiles,
    config::default_config::{config_embedding, config_generation},
};
use contextor::{AnswerProvider, ContextorConfig};
use rag_store::{EmbeddingsProvider, LlmEmbedder, RagConfig, RagError, RagStore};
use thiserror::Error;
use tracing::info;

/// Startup configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load booking data: {0}")]
    Rag(#[from] RagError),

    #[error("failed to configure LLM providers: {0}")]
    Llm(#[from] AiLlmError),
}

/// Shared state for all HTTP handlers. Read-only after startup.
pub struct AppState {
    /// Dataset and vector index.
    pub store: RagStore,
    /// Embeds `/ask` queries; must match the model that built the index.
    pub embedder: Arc<dyn EmbeddingsProvider>,
    /// Produces the final answer from the prompt.
    pub answerer: Arc<dyn AnswerProvider>,
    /// `k` used when `/ask` is called without one.
    pub default_top_k: i64,
}

impl AppState {
    /// Load dataset, index and provider clients from environment variables.
    ///
    /// # Errors
    /// A missing or unreadable index file and invalid provider settings are
    /// fatal. A missing dataset file is not.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store = RagStore::open(&RagConfig::from_env()?)?;

        let svc = Arc::new(LlmServiceProfiles::new(
            config_generation()?,
            config_embedding()?,
        )?);
        let embedder = LlmEmbedder::new(svc.clone()).with_dim(store.index().dim());

        let default_top_k = ContextorConfig::from_env().default_top_k;
        info!(
            rows = store.dataset().map(|d| d.len()).unwrap_or(0),
            vectors = store.index().len(),
            default_top_k,
            "application state ready"
        );

        Ok(Self {
            store,
            embedder: Arc::new(embedder),
            answerer: svc,
            default_top_k,
        })
    }
}
