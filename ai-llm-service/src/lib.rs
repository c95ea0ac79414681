//! LLM provider clients for the booking backend.
//!
//! Two roles are served from one place: a **generation** profile that answers
//! prompts and an **embedding** profile that maps text to vectors. Providers
//! (Ollama, OpenAI, Gemini) are selected by configuration.

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use service_profiles::LlmServiceProfiles;
