//! # tlab-edge -- Edge Host Router
//!
//! Terminates requests for the public hostnames and forwards them to the
//! single origin server, which is addressed by IP and routes by `Host`.
//! Unknown hosts are refused with 404 before anything leaves the edge.
//!
//! The router has no local routes: every method and path is handled by
//! [`proxy::handle`].

pub mod config;
pub mod proxy;

pub use config::{EdgeConfig, EdgeConfigError, RouteRule, RouteTable};
pub use proxy::{EdgeError, EdgeState};

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the router with request tracing.
pub fn app(state: EdgeState) -> Router {
    Router::new()
        .fallback(proxy::handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
