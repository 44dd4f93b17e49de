//! API client configuration.
//!
//! Selects the backend base URL from the hostname the client runs under,
//! mirroring how the web front end picked its API origin: a local
//! development host talks to the local backend, everything else talks to
//! production. Override via environment variables or explicit
//! construction for staging/testing.

use url::Url;

/// Base URL used when running against a local development backend.
pub const LOCAL_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Base URL of the production API.
pub const PRODUCTION_BASE_URL: &str = "https://api.tlab29.com/api/v1";

/// Hostname assumed when nothing else is configured.
pub const PRODUCTION_HOSTNAME: &str = "tlab29.com";

/// Configuration for connecting to the booking API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL including the `/api/v1` prefix.
    pub base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl ApiConfig {
    /// Build the configuration for a client served from `hostname`.
    ///
    /// `localhost` and `127.0.0.1` select [`LOCAL_BASE_URL`]; any other
    /// hostname selects [`PRODUCTION_BASE_URL`].
    pub fn for_host(hostname: &str) -> Result<Self, ConfigError> {
        let raw = if is_local_host(hostname) {
            LOCAL_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        };
        Self::with_base_url(raw)
    }

    /// Build a configuration with an explicit base URL.
    pub fn with_base_url(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base(raw, "base_url")?,
            timeout_secs: 30,
            user_agent: default_user_agent(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TLAB_API_BASE_URL` (overrides host-based selection entirely)
    /// - `TLAB_HOSTNAME` (default: `tlab29.com`)
    /// - `TLAB_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("TLAB_API_BASE_URL") {
            Ok(raw) if !raw.trim().is_empty() => Self {
                base_url: parse_base(raw.trim(), "TLAB_API_BASE_URL")?,
                timeout_secs: 30,
                user_agent: default_user_agent(),
            },
            _ => {
                let host = std::env::var("TLAB_HOSTNAME")
                    .unwrap_or_else(|_| PRODUCTION_HOSTNAME.to_string());
                Self::for_host(&host)?
            }
        };
        if let Some(secs) = std::env::var("TLAB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.timeout_secs = secs;
        }
        Ok(config)
    }

    /// Resolve a resource path against the base URL.
    ///
    /// `path` may start with or without `/` and may carry a query string;
    /// the `/api/v1` prefix of the base URL is always kept.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        let relative = path.trim_start_matches('/');
        self.base_url
            .join(relative)
            .map_err(|e| ConfigError::InvalidUrl(path.to_string(), e.to_string()))
    }
}

fn is_local_host(hostname: &str) -> bool {
    let host = hostname.trim().to_ascii_lowercase();
    host == "localhost" || host == "127.0.0.1"
}

fn default_user_agent() -> String {
    format!("tlab-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse a base URL and make sure it ends with `/` so that
/// [`Url::join`] appends instead of replacing the last segment.
fn parse_base(raw: &str, origin: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| ConfigError::InvalidUrl(origin.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_selects_local_backend() {
        let cfg = ApiConfig::for_host("localhost").unwrap();
        assert_eq!(cfg.base_url.as_str(), "http://localhost:8080/api/v1/");
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn any_other_host_selects_production() {
        for host in ["tlab29.com", "www.tlab29.com", "example.org"] {
            let cfg = ApiConfig::for_host(host).unwrap();
            assert_eq!(cfg.base_url.as_str(), "https://api.tlab29.com/api/v1/");
        }
    }

    #[test]
    fn endpoint_keeps_api_prefix() {
        let cfg = ApiConfig::for_host("localhost").unwrap();
        let url = cfg.endpoint("/workshops/7").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/workshops/7");
        let url = cfg.endpoint("users/search?query=anna").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/users/search?query=anna");
    }

    #[test]
    fn explicit_base_url_without_trailing_slash() {
        let cfg = ApiConfig::with_base_url("http://127.0.0.1:9000/api/v1").unwrap();
        let url = cfg.endpoint("venues").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/api/v1/venues");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(ApiConfig::with_base_url("not a url").is_err());
    }
}
