//! Provider clients. Each one is a thin, non-streaming wrapper over the
//! provider's REST API exposing `generate` and `embeddings`.

pub mod gemini_service;
pub mod ollama_service;
pub mod open_ai_service;

use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use tracing::error;

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet},
};

/// Builds a `reqwest::Client` for a provider.
///
/// A timeout is set only when the config carries one.
pub(crate) fn build_client(
    cfg: &LlmModelConfig,
    headers: HeaderMap,
) -> Result<reqwest::Client, AiLlmError> {
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .gzip(true)
        .brotli(true)
        .deflate(true);
    if let Some(secs) = cfg.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Converts a non-2xx response into a [`ProviderError`], logging the snippet.
///
/// `url` must not contain credentials.
pub(crate) async fn ensure_success(
    provider: Provider,
    model: &str,
    url: &str,
    started: Instant,
    resp: reqwest::Response,
) -> Result<reqwest::Response, AiLlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let snippet = make_snippet(&text);

    error!(
        %provider,
        %status,
        %url,
        %snippet,
        %model,
        latency_ms = started.elapsed().as_millis(),
        "upstream returned non-success status"
    );

    Err(ProviderError::new(
        provider,
        ProviderErrorKind::HttpStatus(HttpError {
            status,
            url: url.to_string(),
            snippet,
        }),
    )
    .into())
}
