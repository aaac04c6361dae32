//! Health check handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Current server time.
pub async fn root() -> String {
    Utc::now().to_rfc3339()
}

/// Health check endpoint - verifies the user store answers.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let (status, users, error) = match state.users.count().await {
        Ok(count) => (StatusCode::OK, Some(count), None),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, None, Some(e.user_message())),
    };

    let response = HealthResponse {
        status: if status == StatusCode::OK { "healthy" } else { "unhealthy" }.to_string(),
        service: state.config.service.service_name.clone(),
        time: Utc::now(),
        users,
        error,
    };

    (status, Json(response)).into_response()
}
