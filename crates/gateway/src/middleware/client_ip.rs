//! Client address resolution.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

/// Address of the client that issued the request, as seen through proxies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

/// Resolve the client address and attach it as a [`ClientIp`] extension.
pub async fn client_ip_middleware(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let ip = resolve_client_ip(request.headers(), connect_info.map(|ci| ci.0));
    tracing::Span::current().record("client_ip", ip.as_str());
    request.extensions_mut().insert(ClientIp(ip));

    next.run(request).await
}

/// `X-Real-IP`, then the first `X-Forwarded-For` hop, then the socket peer.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(real_ip) = headers
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return real_ip.to_string();
    }

    if let Some(forwarded) = headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return forwarded.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
