//! # Authenticated Fetch Client
//!
//! The single entry point for backend calls. Each invocation:
//!
//! 1. Merges caller headers with `Content-Type: application/json` (when a
//!    body is present and the caller did not choose a type) and
//!    `Authorization: Bearer <token>` (only while the session is live).
//! 2. Issues exactly one request. There is no retry at this layer.
//! 3. On 401 clears the session, navigates to the login page, and fails
//!    with [`ApiError::Unauthorized`]. Login and registration send no
//!    bearer; their 401 clears the session without navigating.
//! 4. On 204 succeeds with [`Payload::Empty`] without touching the body.
//! 5. Otherwise reads the body as text. An empty body is
//!    [`Payload::Empty`] on success and `HTTP <status>` on failure.
//! 6. A non-empty body is parsed as JSON. Failures carry the backend's
//!    `message`/`error` field (or the raw text); successes return the
//!    parsed JSON, or the raw text when it is not JSON.
//!
//! Side effects beyond the return value are limited to clearing the
//! session store and the navigation in step 3.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::navigator::{Navigator, LOGIN_PAGE};
use crate::session::SessionStore;

/// Successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 204, or a success status with an empty body.
    Empty,
    /// A body that parsed as JSON.
    Json(Value),
    /// A success body that did not parse as JSON (degraded result).
    Text(String),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Collapse into a JSON value: `Empty` becomes `null`, text becomes a
    /// JSON string.
    pub fn into_json(self) -> Value {
        match self {
            Payload::Empty => Value::Null,
            Payload::Json(v) => v,
            Payload::Text(t) => Value::String(t),
        }
    }

    /// Deserialize into `T`. `Empty` is offered to `T` as `null`, so
    /// `Option<_>` and `()` targets accept it.
    pub fn decode<T: DeserializeOwned>(self, endpoint: &str) -> Result<T, ApiError> {
        serde_json::from_value(self.into_json()).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

/// How a 401 is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnUnauthorized {
    /// The session was rejected: clear it and redirect to login.
    ExpireSession,
    /// The credentials in this very request were rejected (login form).
    /// No bearer is sent; a 401 still clears any earlier session but does
    /// not redirect.
    RejectCredentials,
}

/// HTTP client that injects the session's bearer token and normalizes
/// responses.
#[derive(Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    config: ApiConfig,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    pub fn new(
        config: ApiConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Network {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            config,
            session,
            navigator,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Issue one request against `path` (relative to the API base URL).
    ///
    /// `body` is sent verbatim; it is expected to be serialized JSON.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<Payload, ApiError> {
        self.execute(method, path, headers, body, OnUnauthorized::ExpireSession)
            .await
    }

    /// `GET path`.
    pub async fn get(&self, path: &str) -> Result<Payload, ApiError> {
        self.request(Method::GET, path, HeaderMap::new(), None).await
    }

    /// `GET path`, deserialized into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let payload = self.get(path).await?;
        payload.decode(&format!("GET {path}"))
    }

    /// Send `body` as JSON with `method` and deserialize the answer.
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = format!("{method} {path}");
        let raw = encode_body(&endpoint, body)?;
        let payload = self.request(method, path, HeaderMap::new(), Some(raw)).await?;
        payload.decode(&endpoint)
    }

    /// Issue a request whose answer carries no interesting body.
    pub async fn send_empty(&self, method: Method, path: &str) -> Result<Payload, ApiError> {
        self.request(method, path, HeaderMap::new(), None).await
    }

    pub(crate) async fn send_credentials<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = format!("POST {path}");
        let raw = encode_body(&endpoint, body)?;
        let payload = self
            .execute(
                Method::POST,
                path,
                HeaderMap::new(),
                Some(raw),
                OnUnauthorized::RejectCredentials,
            )
            .await?;
        payload.decode(&endpoint)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        mut headers: HeaderMap,
        body: Option<String>,
        on_unauthorized: OnUnauthorized,
    ) -> Result<Payload, ApiError> {
        let endpoint = format!("{method} {path}");
        let url = self.config.endpoint(path)?;

        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let bearer = match on_unauthorized {
            OnUnauthorized::ExpireSession => self.session.token(),
            OnUnauthorized::RejectCredentials => None,
        };
        if let Some(token) = bearer {
            match HeaderValue::from_str(&format!("Bearer {}", token.as_str())) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("stored token is not a valid header value; sending unauthenticated"),
            }
        }

        let mut req = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }

        let resp = req.send().await.map_err(|source| ApiError::Network {
            endpoint: endpoint.clone(),
            source,
        })?;
        let status = resp.status();
        tracing::debug!(%endpoint, status = status.as_u16(), "backend responded");

        if status == StatusCode::UNAUTHORIZED {
            return Err(self.unauthorized(&endpoint, resp, on_unauthorized).await);
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Payload::Empty);
        }

        let text = resp.text().await.map_err(|source| ApiError::Network {
            endpoint: endpoint.clone(),
            source,
        })?;
        classify(status, &text)
    }

    async fn unauthorized(
        &self,
        endpoint: &str,
        resp: reqwest::Response,
        on_unauthorized: OnUnauthorized,
    ) -> ApiError {
        match on_unauthorized {
            OnUnauthorized::ExpireSession => {
                tracing::warn!(%endpoint, "session rejected by backend; clearing and redirecting to login");
                self.session.clear();
                self.navigator.navigate(LOGIN_PAGE);
                ApiError::Unauthorized
            }
            OnUnauthorized::RejectCredentials => {
                self.session.clear();
                let text = resp.text().await.unwrap_or_default();
                let message = error_message(&text)
                    .unwrap_or_else(|| "invalid email or password".to_string());
                ApiError::Status {
                    status: StatusCode::UNAUTHORIZED.as_u16(),
                    message,
                }
            }
        }
    }
}

/// Append URL-encoded query parameters to `path`. Empty values are skipped.
pub fn path_with_query(path: &str, params: &[(&str, &str)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
        query.append_pair(key, value);
        any = true;
    }
    if any {
        format!("{path}?{}", query.finish())
    } else {
        path.to_string()
    }
}

fn encode_body<B: Serialize + ?Sized>(endpoint: &str, body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Turn a status and body text into a payload or a normalized error.
///
/// Does not handle 401, which needs session access.
pub fn classify(status: StatusCode, text: &str) -> Result<Payload, ApiError> {
    if status == StatusCode::NO_CONTENT {
        return Ok(Payload::Empty);
    }
    let success = status.is_success();

    if text.trim().is_empty() {
        return if success {
            Ok(Payload::Empty)
        } else {
            Err(generic_status_error(status))
        };
    }

    match serde_json::from_str::<Value>(text) {
        Ok(json) if success => Ok(Payload::Json(json)),
        Ok(json) => Err(ApiError::Status {
            status: status.as_u16(),
            message: message_field(&json)
                .unwrap_or_else(|| generic_message(status)),
        }),
        Err(_) if success => Ok(Payload::Text(text.to_string())),
        Err(_) => Err(ApiError::Status {
            status: status.as_u16(),
            message: text.trim().to_string(),
        }),
    }
}

/// Extract the backend's error message from a body, JSON or not.
fn error_message(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(json) => message_field(&json),
        Err(_) => Some(text.trim().to_string()),
    }
}

/// Accepted error fields, in order: `message`, `error` (string), and
/// `error.message` (nested error object).
fn message_field(json: &Value) -> Option<String> {
    let non_blank = |v: &Value| {
        v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    json.get("message")
        .and_then(non_blank)
        .or_else(|| json.get("error").and_then(non_blank))
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(non_blank)
        })
}

fn generic_message(status: StatusCode) -> String {
    format!("HTTP {}", status.as_u16())
}

fn generic_status_error(status: StatusCode) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        message: generic_message(status),
    }
}
