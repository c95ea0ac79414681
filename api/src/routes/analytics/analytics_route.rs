//! POST /analytics — descriptive statistics over the whole dataset.

use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use tracing::{debug, error};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    middleware_layer::request_id::request_id_of,
    routes::analytics::analytics_response::AnalyticsResponse,
};

/// Handler: POST /analytics
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/analytics
/// ```
pub async fn analytics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<AnalyticsResponse>> {
    let request_id = request_id_of(&headers).unwrap_or("-");
    debug!(request_id = %request_id, "analytics: start");

    let analytics = state.store.report().inspect_err(|err| {
        error!(request_id = %request_id, error = %err, "analytics: report failed");
    })?;

    debug!(
        request_id = %request_id,
        total_bookings = analytics.total_bookings,
        "analytics: success"
    );
    Ok(Json(AnalyticsResponse { analytics }))
}
