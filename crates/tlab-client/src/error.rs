//! API client error types.
//!
//! Every failure a caller can observe from the fetch client lands in
//! [`ApiError`]. Non-success responses are normalized into a
//! human-readable message plus the original status code so page-level
//! code can branch on, say, 403 versus a generic failure.

use serde::Serialize;

/// Uniform error shape: a message and, where one was observed, the HTTP
/// status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Errors from backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered 401. The session has already been cleared
    /// and the login redirect triggered when this is returned.
    #[error("unauthorized: session is no longer valid")]
    Unauthorized,
    /// The backend returned a non-success status other than 401.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The request never completed.
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The response arrived but did not have the expected shape.
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ApiError {
    /// The HTTP status code behind this error, if one was observed.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Project into the uniform error shape.
    pub fn normalized(&self) -> NormalizedError {
        NormalizedError {
            message: self.message(),
            status_code: self.status_code(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status_code() == Some(403)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_message_only() {
        let err = ApiError::Status {
            status: 409,
            message: "Workshop is full".into(),
        };
        assert_eq!(err.to_string(), "Workshop is full");
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(
            err.normalized(),
            NormalizedError {
                message: "Workshop is full".into(),
                status_code: Some(409),
            }
        );
    }

    #[test]
    fn forbidden_is_distinguishable() {
        let err = ApiError::Status {
            status: 403,
            message: "Access denied".into(),
        };
        assert!(err.is_forbidden());
        assert!(!err.is_unauthorized());
        assert!(ApiError::Unauthorized.is_unauthorized());
    }

    #[test]
    fn validation_has_no_status() {
        let err = ApiError::Validation("invalid email".into());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.message(), "invalid email");
    }
}
