//! Default LLM configs loaded strictly from environment variables.
//!
//! Two roles are supported:
//!
//! - **Generation** → the hosted model that answers questions (`LLM_*`)
//! - **Embedding**  → the model that turns text into vectors (`EMBEDDING_*`)
//!
//! # Environment variables
//!
//! Generation:
//! - `LLM_KIND`          = `gemini` (default) | `openai` | `ollama`
//! - `LLM_MODEL`         = model name (provider default if unset)
//! - `LLM_MAX_TOKENS`    = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS`  = optional request timeout (u64)
//!
//! Embedding:
//! - `EMBEDDING_KIND`         = `ollama` (default) | `openai` | `gemini`
//! - `EMBEDDING_MODEL`        = model name (provider default if unset)
//! - `EMBEDDING_TIMEOUT_SECS` = optional request timeout (u64)
//!
//! Provider endpoints and keys:
//! - `GEMINI_API_KEY` (required for Gemini), `GEMINI_URL` (optional)
//! - `OPENAI_API_KEY` (required for OpenAI), `OPENAI_URL` (optional)
//! - `OLLAMA_URL` or `OLLAMA_PORT` (required for Ollama)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_opt_u64, must_env, opt_env,
        validate_http_endpoint,
    },
};

pub const GEMINI_DEFAULT_URL: &str = "https://generativelanguage.googleapis.com";
pub const OPENAI_DEFAULT_URL: &str = "https://api.openai.com";

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = opt_env("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = opt_env("OLLAMA_PORT") {
        let _ = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Endpoint and API key for a provider.
fn provider_access(provider: LlmProvider) -> Result<(String, Option<String>), AiLlmError> {
    match provider {
        LlmProvider::Ollama => Ok((ollama_endpoint()?, None)),
        LlmProvider::OpenAI => {
            let endpoint = opt_env("OPENAI_URL").unwrap_or_else(|| OPENAI_DEFAULT_URL.into());
            validate_http_endpoint("OPENAI_URL", &endpoint)?;
            Ok((endpoint, Some(must_env("OPENAI_API_KEY")?)))
        }
        LlmProvider::Gemini => {
            let endpoint = opt_env("GEMINI_URL").unwrap_or_else(|| GEMINI_DEFAULT_URL.into());
            validate_http_endpoint("GEMINI_URL", &endpoint)?;
            Ok((endpoint, Some(must_env("GEMINI_API_KEY")?)))
        }
    }
}

fn provider_from_env(var: &'static str, default: LlmProvider) -> Result<LlmProvider, AiLlmError> {
    match opt_env(var) {
        Some(v) => Ok(v.parse::<LlmProvider>()?),
        None => Ok(default),
    }
}

/// Default generation model for a provider.
pub fn default_generation_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Gemini => "gemini-2.0-flash",
        LlmProvider::OpenAI => "gpt-4o-mini",
        LlmProvider::Ollama => "llama3.1:8b",
    }
}

/// Default embedding model for a provider.
///
/// `all-minilm` is the Ollama packaging of `all-MiniLM-L6-v2` (384 dims).
pub fn default_embedding_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Ollama => "all-minilm",
        LlmProvider::OpenAI => "text-embedding-3-small",
        LlmProvider::Gemini => "text-embedding-004",
    }
}

/// Constructs the config for the **generation** model (the Answer Provider).
///
/// # Env
/// - `LLM_KIND` (default `gemini`), `LLM_MODEL`, `LLM_MAX_TOKENS`, `LLM_TIMEOUT_SECS`
///
/// # Errors
/// Missing API keys/endpoints or malformed numbers.
pub fn config_generation() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("LLM_KIND", LlmProvider::Gemini)?;
    let (endpoint, api_key) = provider_access(provider)?;
    let model = opt_env("LLM_MODEL").unwrap_or_else(|| default_generation_model(provider).into());

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: None,
        top_p: None,
        timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?,
    })
}

/// Constructs the config for the **embedding** model.
///
/// # Env
/// - `EMBEDDING_KIND` (default `ollama`), `EMBEDDING_MODEL`, `EMBEDDING_TIMEOUT_SECS`
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("EMBEDDING_KIND", LlmProvider::Ollama)?;
    let (endpoint, api_key) = provider_access(provider)?;
    let model =
        opt_env("EMBEDDING_MODEL").unwrap_or_else(|| default_embedding_model(provider).into());

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: env_opt_u64("EMBEDDING_TIMEOUT_SECS")?,
    })
}
