//! # Host-Routed Forwarding
//!
//! Per request, with no state carried between requests:
//!
//! 1. **Match** the inbound hostname against the [`RouteTable`]. No match
//!    answers `404 Not found` without contacting the upstream.
//! 2. **Forward** method, path, query, headers, and body to the matched
//!    origin. `Host` is replaced by the inbound hostname so the origin's
//!    virtual hosts can route by name. Redirects are not followed.
//! 3. **Respond** with the upstream status, headers, and body as received.
//! 4. Any transport failure on the way becomes
//!    `502 Origin server error: <message>`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;

use crate::config::{normalize_host, EdgeConfig, RouteTable};

/// Headers describing the framing of a message. The body is buffered and
/// re-framed on each hop, so these are never copied across.
const FRAMING_HEADERS: [axum::http::HeaderName; 3] = [CONNECTION, TRANSFER_ENCODING, CONTENT_LENGTH];

/// Shared, read-only router state.
#[derive(Clone)]
pub struct EdgeState {
    inner: Arc<Inner>,
}

struct Inner {
    routes: RouteTable,
    http: reqwest::Client,
    max_body_bytes: usize,
}

impl std::fmt::Debug for EdgeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeState")
            .field("routes", &self.inner.routes.rules().len())
            .field("max_body_bytes", &self.inner.max_body_bytes)
            .finish()
    }
}

impl EdgeState {
    pub fn new(config: &EdgeConfig) -> Result<Self, EdgeError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(EdgeError::Client)?;
        Ok(Self {
            inner: Arc::new(Inner {
                routes: config.routes.clone(),
                http,
                max_body_bytes: config.max_body_bytes,
            }),
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }

    async fn forward(&self, req: Request) -> Result<Response, EdgeError> {
        let host = request_host(&req).map(normalize_host).unwrap_or_default();
        let Some(rule) = self.inner.routes.resolve(&host) else {
            tracing::debug!(%host, "no route for host");
            return Err(EdgeError::UnknownHost(host));
        };

        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = rule
            .upstream_url(path_and_query)
            .map_err(|e| EdgeError::Target(e.to_string()))?;

        let body = to_bytes(body, self.inner.max_body_bytes)
            .await
            .map_err(body_error)?;

        let mut headers = parts.headers;
        strip_framing(&mut headers);
        headers.remove(HOST);
        let host_value =
            HeaderValue::from_str(&rule.match_host).map_err(|e| EdgeError::Target(e.to_string()))?;
        headers.insert(HOST, host_value);

        tracing::debug!(method = %parts.method, %host, upstream = %url, "forwarding");
        let mut upstream = self.inner.http.request(parts.method, url).headers(headers);
        if !body.is_empty() {
            upstream = upstream.body(body);
        }
        let resp = upstream.send().await.map_err(EdgeError::Upstream)?;

        let status = resp.status();
        let mut headers = resp.headers().clone();
        strip_framing(&mut headers);
        let bytes = resp.bytes().await.map_err(EdgeError::Upstream)?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Fallback handler: every method and path of every request goes here.
pub async fn handle(State(state): State<EdgeState>, req: Request) -> Response {
    match state.forward(req).await {
        Ok(resp) => resp,
        Err(e) => {
            if e.is_upstream_failure() {
                tracing::warn!("upstream request failed: {e}");
            }
            e.into_response()
        }
    }
}

/// Inbound hostname: the `Host` header, else the URI authority.
fn request_host(req: &Request) -> Option<&str> {
    req.headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
}

/// 413 when the body went over the limit, 400 for any other read failure.
fn body_error(err: axum::Error) -> EdgeError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return EdgeError::BodyTooLarge(err.to_string());
        }
        source = cause.source();
    }
    EdgeError::Body(err.to_string())
}

fn strip_framing(headers: &mut HeaderMap) {
    for name in FRAMING_HEADERS {
        headers.remove(name);
    }
}

/// `err: cause: root cause`, since reqwest keeps the interesting part
/// (connection refused, certificate rejected) in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    #[error("no route for host {0:?}")]
    UnknownHost(String),
    #[error("request body too large: {0}")]
    BodyTooLarge(String),
    #[error("failed to read request body: {0}")]
    Body(String),
    #[error("{0}")]
    Target(String),
    #[error("{}", error_chain(.0))]
    Upstream(#[source] reqwest::Error),
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

impl EdgeError {
    /// Whether the origin could not be reached (answered with 502).
    pub fn is_upstream_failure(&self) -> bool {
        matches!(self, EdgeError::Upstream(_) | EdgeError::Target(_))
    }
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        match self {
            EdgeError::UnknownHost(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
            EdgeError::BodyTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()).into_response()
            }
            EdgeError::Body(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            EdgeError::Target(_) | EdgeError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                format!("Origin server error: {self}"),
            )
                .into_response(),
            EdgeError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
