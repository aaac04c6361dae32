//! Middleware for request tracing and client address resolution.

mod client_ip;
mod trace;

pub use client_ip::{client_ip_middleware, ClientIp};
pub use trace::{make_request_span, REQUEST_ID_HEADER};
