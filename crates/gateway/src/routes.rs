//! Route configuration.

use axum::{middleware, response::Json, routing::get, Router};
use tower::{Layer, ServiceBuilder};
use tower_http::{
    normalize_path::{NormalizePath, NormalizePathLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::handlers::{health_routes, root, user_routes};
use crate::middleware::{client_ip_middleware, make_request_span};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// The served application: [`create_router`] with trailing slashes trimmed,
/// so `/api/v1/users/` and `/api/v1/users/1/` reach the same handlers.
pub fn create_app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(create_router(state))
}

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/", get(root))
        .nest("/health", health_routes())
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1/users", user_routes())
        // Outermost first
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(make_request_span)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(client_ip_middleware))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
