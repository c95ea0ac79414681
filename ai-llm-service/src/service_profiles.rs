//! Shared LLM service with two profiles: `generation` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Builds one HTTP client per profile up front, so a bad config fails at
//!   startup instead of on the first request.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::config::default_config::{config_embedding, config_generation};
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(config_generation()?, config_embedding()?)?);
//! let emb = svc.embed("family room near the beach").await?;
//! let txt = svc.generate(&format!("{} dims", emb.len())).await?;
//! println!("{txt}");
//! # Ok(()) }
//! ```

use tracing::info;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    services::{
        gemini_service::GeminiService, ollama_service::OllamaService,
        open_ai_service::OpenAiService,
    },
};

/// A constructed provider client.
#[derive(Debug)]
enum Backend {
    Ollama(OllamaService),
    OpenAI(OpenAiService),
    Gemini(GeminiService),
}

impl Backend {
    fn new(cfg: &LlmModelConfig) -> Result<Self, AiLlmError> {
        Ok(match cfg.provider {
            LlmProvider::Ollama => Backend::Ollama(OllamaService::new(cfg.clone())?),
            LlmProvider::OpenAI => Backend::OpenAI(OpenAiService::new(cfg.clone())?),
            LlmProvider::Gemini => Backend::Gemini(GeminiService::new(cfg.clone())?),
        })
    }
}

/// Shared service that manages the **generation** and **embedding** profiles.
#[derive(Debug)]
pub struct LlmServiceProfiles {
    generation: LlmModelConfig,
    embedding: LlmModelConfig,
    generation_backend: Backend,
    embedding_backend: Backend,
}

impl LlmServiceProfiles {
    /// Creates the service and its HTTP clients.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if either profile is invalid (wrong endpoint,
    /// missing API key, empty model name).
    pub fn new(generation: LlmModelConfig, embedding: LlmModelConfig) -> Result<Self, AiLlmError> {
        for cfg in [&generation, &embedding] {
            if cfg.model.trim().is_empty() {
                return Err(crate::error_handler::ConfigError::EmptyModel.into());
            }
        }

        let generation_backend = Backend::new(&generation)?;
        let embedding_backend = Backend::new(&embedding)?;

        info!(
            generation_provider = generation.provider.as_str(),
            generation_model = %generation.model,
            embedding_provider = embedding.provider.as_str(),
            embedding_model = %embedding.model,
            "LLM profiles ready"
        );

        Ok(Self {
            generation,
            embedding,
            generation_backend,
            embedding_backend,
        })
    }

    /// Generates text for `prompt` using the **generation** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the provider call fails.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        match &self.generation_backend {
            Backend::Ollama(cli) => cli.generate(prompt).await,
            Backend::OpenAI(cli) => cli.generate(prompt).await,
            Backend::Gemini(cli) => cli.generate(prompt).await,
        }
    }

    /// Computes an embedding for `input` using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the provider call fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match &self.embedding_backend {
            Backend::Ollama(cli) => cli.embeddings(input).await,
            Backend::OpenAI(cli) => cli.embeddings(input).await,
            Backend::Gemini(cli) => cli.embeddings(input).await,
        }
    }

    /// Returns references to the current profiles `(generation, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.generation, &self.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://127.0.0.1:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn builds_mixed_profiles() {
        let gemini = LlmModelConfig {
            provider: LlmProvider::Gemini,
            model: "gemini-2.0-flash".into(),
            endpoint: "https://generativelanguage.googleapis.com".into(),
            api_key: Some("k".into()),
            ..ollama("x")
        };
        let svc = LlmServiceProfiles::new(gemini, ollama("all-minilm")).unwrap();
        let (generation, embedding) = svc.profiles();
        assert_eq!(generation.provider, LlmProvider::Gemini);
        assert_eq!(embedding.model, "all-minilm");
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = LlmServiceProfiles::new(ollama(" "), ollama("all-minilm")).unwrap_err();
        assert!(err.to_string().contains("model name must not be empty"));
    }

    #[test]
    fn missing_key_fails_at_construction() {
        let gemini = LlmModelConfig {
            provider: LlmProvider::Gemini,
            ..ollama("gemini-2.0-flash")
        };
        assert!(LlmServiceProfiles::new(gemini, ollama("all-minilm")).is_err());
    }

    #[tokio::test]
    async fn unreachable_provider_surfaces_transport_error() {
        let mut cfg = ollama("llama3.1:8b");
        cfg.endpoint = "http://127.0.0.1:9".into();
        let svc = LlmServiceProfiles::new(cfg.clone(), cfg).unwrap();
        let err = svc.generate("hello").await.unwrap_err();
        assert!(matches!(err, AiLlmError::HttpTransport(_)));
    }
}
