//! POST /ask — answers a question with retrieved booking rows as context.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderMap,
};
use contextor::AskOptions;
use tracing::{debug, error};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    middleware_layer::request_id::request_id_of,
    routes::ask::ask_request::{AskParams, AskResponse},
};

/// Handler: POST /ask
///
/// # Example
/// ```bash
/// curl -X POST 'http://127.0.0.1:8000/ask?query=Which%20hotel%20is%20most%20booked&k=5'
/// ```
pub async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Result<Query<AskParams>, QueryRejection>,
) -> AppResult<Json<AskResponse>> {
    let request_id = request_id_of(&headers).unwrap_or("-");
    let Query(p) = params.inspect_err(|err| {
        error!(request_id = %request_id, error = %err, "ask: invalid query string");
    })?;

    let opts = AskOptions {
        top_k: p.k.unwrap_or(state.default_top_k),
    };
    debug!(request_id = %request_id, query = %p.query, k = opts.top_k, "ask: start");

    let qa = contextor::ask(
        &state.store,
        state.embedder.as_ref(),
        state.answerer.as_ref(),
        &p.query,
        opts,
    )
    .await
    .inspect_err(|err| {
        error!(request_id = %request_id, error = %err, "ask: failed");
    })?;

    debug!(
        request_id = %request_id,
        response_time = qa.response_time,
        "ask: success"
    );
    Ok(Json(qa.into()))
}
