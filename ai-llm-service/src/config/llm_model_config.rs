use crate::config::llm_provider::LlmProvider;

/// Configuration for an LLM model invocation.
///
/// One struct serves both roles of the service: text generation and
/// embeddings. Provider-specific fields that do not apply are ignored.
///
/// # Fields
///
/// - `provider`: Which backend to use (Ollama, OpenAI, Gemini).
/// - `model`: The model identifier (e.g., `"gemini-2.0-flash"`, `"all-minilm"`).
/// - `endpoint`: Base URL of the API (no trailing path).
/// - `api_key`: Optional API key for providers that require authentication.
/// - `max_tokens`: Maximum number of tokens to generate (if supported).
/// - `temperature`: Sampling temperature.
/// - `top_p`: Nucleus sampling cutoff.
/// - `timeout_secs`: Optional request timeout; `None` keeps the HTTP client default.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Gemini,
///     model: "gemini-2.0-flash".to_string(),
///     endpoint: "https://generativelanguage.googleapis.com".to_string(),
///     api_key: Some("secret".to_string()),
///     max_tokens: None,
///     temperature: None,
///     top_p: None,
///     timeout_secs: None,
/// };
/// assert_eq!(cfg.provider, LlmProvider::Gemini);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Base URL of the provider API.
    pub endpoint: String,

    /// Optional API key for authentication (OpenAI, Gemini).
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (controls creativity).
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Endpoint with surrounding whitespace and trailing slashes removed.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}
