//! Per-request tracing span.

use axum::{body::Body, http::Request};
use tracing::Span;

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Span for one request, tagged with its id. `client_ip` is filled in later.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
        client_ip = tracing::field::Empty,
    )
}
