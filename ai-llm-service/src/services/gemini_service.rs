//! Google Gemini service (Generative Language REST API).
//!
//! Endpoints, derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1beta/models/{model}:generateContent
//! - POST {endpoint}/v1beta/models/{model}:embedContent
//!
//! The API key travels in the `x-goog-api-key` header so it never shows up
//! in URLs, logs or error messages.

use std::time::Instant;

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind, is_http_endpoint},
    services::{build_client, ensure_success},
};

/// Thin client for Gemini models.
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
    url_embed: String,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not Gemini
    /// - `MissingApiKey` if `cfg.api_key` is `None`
    /// - `InvalidEndpoint` if `cfg.endpoint` is invalid
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Gemini {
            return Err(
                ProviderError::new(Provider::Gemini, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let api_key = cfg.api_key.clone().ok_or_else(|| {
            ProviderError::new(Provider::Gemini, ProviderErrorKind::MissingApiKey)
        })?;

        if !is_http_endpoint(&cfg.endpoint) {
            return Err(ProviderError::new(
                Provider::Gemini,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let mut key = header::HeaderValue::from_str(&api_key).map_err(|e| {
            ProviderError::new(
                Provider::Gemini,
                ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
            )
        })?;
        key.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert("x-goog-api-key", key);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = build_client(&cfg, headers)?;
        let model_path = model_path(&cfg.model);
        let base = cfg.base_url().to_string();

        info!(model = %cfg.model, endpoint = %cfg.endpoint, "GeminiService initialized");

        Ok(Self {
            client,
            url_generate: format!("{base}/v1beta/{model_path}:generateContent"),
            url_embed: format!("{base}/v1beta/{model_path}:embedContent"),
            cfg,
        })
    }

    /// Single-turn `generateContent` call; returns the concatenated text parts
    /// of the first candidate.
    ///
    /// # Errors
    /// - `HttpStatus` for non-2xx responses (bad key, quota, safety block)
    /// - `Decode` for unexpected JSON
    /// - `EmptyChoices` when no candidate carries text
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = GenerateContentRequest::from_cfg(&self.cfg, prompt);

        debug!(model = %self.cfg.model, prompt_len = prompt.len(), "POST {}", self.url_generate);

        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(
            Provider::Gemini,
            &self.cfg.model,
            &self.url_generate,
            started,
            resp,
        )
        .await?;

        let out: GenerateContentResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Gemini,
                ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `candidates[0].content.parts[].text`"
                )),
            )
        })?;

        let text = out
            .first_text()
            .ok_or_else(|| ProviderError::new(Provider::Gemini, ProviderErrorKind::EmptyChoices))?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "generateContent completed"
        );

        Ok(text)
    }

    /// Embeds a single text via `embedContent`.
    ///
    /// # Errors
    /// - `HttpStatus` for non-2xx responses
    /// - `Decode` for unexpected JSON
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let started = Instant::now();
        let body = EmbedContentRequest {
            content: Content {
                role: None,
                parts: vec![Part { text: input }],
            },
        };

        debug!(model = %self.cfg.model, input_len = input.len(), "POST {}", self.url_embed);

        let resp = self.client.post(&self.url_embed).json(&body).send().await?;
        let resp = ensure_success(
            Provider::Gemini,
            &self.cfg.model,
            &self.url_embed,
            started,
            resp,
        )
        .await?;

        let out: EmbedContentResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Gemini,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected `embedding.values`")),
            )
        })?;

        Ok(out.embedding.values)
    }
}

/// `gemini-2.0-flash` → `models/gemini-2.0-flash`; already-qualified names pass through.
fn model_path(model: &str) -> String {
    let m = model.trim();
    if m.starts_with("models/") || m.starts_with("tunedModels/") {
        m.to_string()
    } else {
        format!("models/{m}")
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_cfg(cfg: &LlmModelConfig, prompt: &'a str) -> Self {
        let gc = GenerationConfig {
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_output_tokens: cfg.max_tokens,
        };
        let has_gc =
            gc.temperature.is_some() || gc.top_p.is_some() || gc.max_output_tokens.is_some();

        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: has_gc.then_some(gc),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let parts = candidate.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Gemini,
            model: "gemini-2.0-flash".into(),
            endpoint: "https://generativelanguage.googleapis.com/".into(),
            api_key: Some("test-key".into()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn urls_use_models_path_and_no_key() {
        let svc = GeminiService::new(cfg()).unwrap();
        assert_eq!(
            svc.url_generate,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert!(svc.url_embed.ends_with("models/gemini-2.0-flash:embedContent"));
        assert!(!svc.url_generate.contains("test-key"));
    }

    #[test]
    fn request_body_shape() {
        let mut c = cfg();
        c.max_tokens = Some(256);
        let v = serde_json::to_value(GenerateContentRequest::from_cfg(&c, "Which hotel?")).unwrap();
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["contents"][0]["parts"][0]["text"], "Which hotel?");
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn text_parts_are_concatenated() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"City "},{"text":"Hotel"}],"role":"model"}}]}"#;
        let out: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(out.first_text().as_deref(), Some("City Hotel"));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let raw = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let out: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert!(out.first_text().is_none());
    }

    #[test]
    fn qualified_model_names_pass_through() {
        assert_eq!(model_path("models/text-embedding-004"), "models/text-embedding-004");
        assert_eq!(model_path("text-embedding-004"), "models/text-embedding-004");
    }
}
