//! GET / — liveness message.

use axum::Json;
use serde::Serialize;

pub const WELCOME_MESSAGE: &str =
    "Hotel booking API is running. Use /analytics for reports and /ask for Q&A.";

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub message: &'static str,
}

/// Handler: GET /
pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: WELCOME_MESSAGE,
    })
}
