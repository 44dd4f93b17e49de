//! # Edge Configuration
//!
//! Loaded once at start-up. The route table is immutable afterwards.
//!
//! | Variable                     | Default                       |
//! |------------------------------|-------------------------------|
//! | `EDGE_PORT`                  | `8787`                        |
//! | `EDGE_UPSTREAM`              | `https://5.147.111.121:8443`  |
//! | `EDGE_HOSTS`                 | `tlab29.com,www.tlab29.com,api.tlab29.com` |
//! | `EDGE_ACCEPT_INVALID_CERTS`  | `false`                       |
//! | `EDGE_MAX_BODY_BYTES`        | `10485760`                    |
//! | `EDGE_LOG_JSON`              | `false`                       |

use url::Url;

/// Origin server all default hosts are forwarded to.
pub const DEFAULT_UPSTREAM: &str = "https://5.147.111.121:8443";

/// Hostnames served by default.
pub const DEFAULT_HOSTS: [&str; 3] = ["tlab29.com", "www.tlab29.com", "api.tlab29.com"];

pub const DEFAULT_PORT: u16 = 8787;

pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// One allow-listed hostname and the origin it is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// Normalized hostname (lowercase, no port).
    pub match_host: String,
    /// `scheme://host[:port]` of the upstream. Its path is ignored.
    pub upstream_origin: Url,
}

impl RouteRule {
    pub fn new(host: &str, upstream_origin: Url) -> Self {
        Self {
            match_host: normalize_host(host),
            upstream_origin,
        }
    }

    /// Upstream URL for an inbound path and query.
    pub fn upstream_url(&self, path_and_query: &str) -> Result<Url, url::ParseError> {
        let origin = self.upstream_origin.origin().ascii_serialization();
        let tail = if path_and_query.starts_with('/') {
            path_and_query.to_string()
        } else {
            format!("/{path_and_query}")
        };
        Url::parse(&format!("{origin}{tail}"))
    }
}

/// Static allow-list of hosts.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Every host in `hosts` forwarded to the same origin.
    pub fn single_origin<I, S>(hosts: I, origin: Url) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            hosts
                .into_iter()
                .filter(|h| !h.as_ref().trim().is_empty())
                .map(|h| RouteRule::new(h.as_ref(), origin.clone()))
                .collect(),
        )
    }

    /// The production table: [`DEFAULT_HOSTS`] to [`DEFAULT_UPSTREAM`].
    pub fn defaults() -> Result<Self, EdgeConfigError> {
        Ok(Self::single_origin(
            DEFAULT_HOSTS,
            parse_origin("default upstream", DEFAULT_UPSTREAM)?,
        ))
    }

    /// Rule for an inbound hostname, if it is allow-listed.
    pub fn resolve(&self, host: &str) -> Option<&RouteRule> {
        let host = normalize_host(host);
        self.rules.iter().find(|r| r.match_host == host)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

/// Lowercase, strip the port and any trailing dot.
pub fn normalize_host(raw: &str) -> String {
    let raw = raw.trim();
    let host = if let Some(rest) = raw.strip_prefix('[') {
        // IPv6 literal: keep the brackets, drop the port.
        match rest.find(']') {
            Some(end) => &raw[..end + 2],
            None => raw,
        }
    } else {
        raw.rsplit_once(':').map(|(h, _)| h).unwrap_or(raw)
    };
    host.trim_end_matches('.').to_ascii_lowercase()
}

#[derive(Debug, Clone)]
pub struct EdgeConfig {
    pub port: u16,
    pub routes: RouteTable,
    /// The origin is addressed by IP, so its certificate usually does not
    /// name it.
    pub accept_invalid_certs: bool,
    pub max_body_bytes: usize,
    pub log_json: bool,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            routes: RouteTable::default(),
            accept_invalid_certs: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_json: false,
        }
    }
}

impl EdgeConfig {
    pub fn from_env() -> Result<Self, EdgeConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EdgeConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("EDGE_PORT") {
            Some(raw) => parse_number("EDGE_PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        let origin = match var("EDGE_UPSTREAM") {
            Some(raw) => parse_origin("EDGE_UPSTREAM", raw.trim())?,
            None => parse_origin("default upstream", DEFAULT_UPSTREAM)?,
        };
        let routes = match var("EDGE_HOSTS") {
            Some(raw) => RouteTable::single_origin(raw.split(','), origin),
            None => RouteTable::single_origin(DEFAULT_HOSTS, origin),
        };
        if routes.rules().is_empty() {
            return Err(EdgeConfigError::NoHosts);
        }
        let max_body_bytes = match var("EDGE_MAX_BODY_BYTES") {
            Some(raw) => parse_number("EDGE_MAX_BODY_BYTES", &raw)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            port,
            routes,
            accept_invalid_certs: var("EDGE_ACCEPT_INVALID_CERTS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            max_body_bytes,
            log_json: var("EDGE_LOG_JSON").map(|v| parse_flag(&v)).unwrap_or(false),
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, EdgeConfigError> {
    raw.trim().parse().map_err(|_| EdgeConfigError::InvalidValue {
        var: var.to_string(),
        value: raw.to_string(),
    })
}

fn parse_origin(var: &str, raw: &str) -> Result<Url, EdgeConfigError> {
    let url = Url::parse(raw).map_err(|e| EdgeConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if url.host_str().is_none() || !matches!(url.scheme(), "http" | "https") {
        return Err(EdgeConfigError::InvalidUrl(
            var.to_string(),
            "expected an http(s) origin".into(),
        ));
    }
    Ok(url)
}

#[derive(Debug, thiserror::Error)]
pub enum EdgeConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
    #[error("EDGE_HOSTS names no hosts")]
    NoHosts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_cover_the_three_hosts() {
        let config = EdgeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8787);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        for host in DEFAULT_HOSTS {
            let rule = config.routes.resolve(host).unwrap();
            assert_eq!(rule.upstream_origin.as_str(), "https://5.147.111.121:8443/");
        }
        assert!(config.routes.resolve("evil.com").is_none());
        assert!(config.routes.resolve("sub.tlab29.com").is_none());
    }

    #[test]
    fn host_matching_ignores_case_and_port() {
        let table = RouteTable::defaults().unwrap();
        assert!(table.resolve("WWW.TLAB29.COM").is_some());
        assert!(table.resolve("api.tlab29.com:443").is_some());
        assert!(table.resolve("tlab29.com.").is_some());
    }

    #[test]
    fn normalize_host_variants() {
        assert_eq!(normalize_host("Example.COM:8080"), "example.com");
        assert_eq!(normalize_host("[::1]:8787"), "[::1]");
        assert_eq!(normalize_host(" tlab29.com "), "tlab29.com");
    }

    #[test]
    fn overrides_from_environment() {
        let config = EdgeConfig::from_lookup(lookup(&[
            ("EDGE_PORT", "9000"),
            ("EDGE_UPSTREAM", "http://127.0.0.1:8080"),
            ("EDGE_HOSTS", "a.test, b.test,"),
            ("EDGE_ACCEPT_INVALID_CERTS", "true"),
            ("EDGE_LOG_JSON", "1"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.routes.rules().len(), 2);
        assert!(config.routes.resolve("b.test").is_some());
        assert!(config.routes.resolve("tlab29.com").is_none());
        assert!(config.accept_invalid_certs);
        assert!(config.log_json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            EdgeConfig::from_lookup(lookup(&[("EDGE_PORT", "eighty")])),
            Err(EdgeConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            EdgeConfig::from_lookup(lookup(&[("EDGE_UPSTREAM", "not a url")])),
            Err(EdgeConfigError::InvalidUrl(..))
        ));
        assert!(matches!(
            EdgeConfig::from_lookup(lookup(&[("EDGE_HOSTS", " , ")])),
            Err(EdgeConfigError::NoHosts)
        ));
    }

    #[test]
    fn upstream_url_keeps_path_and_query() {
        let rule = RouteRule::new(
            "tlab29.com",
            Url::parse("https://5.147.111.121:8443/ignored").unwrap(),
        );
        assert_eq!(
            rule.upstream_url("/api/v1/workshops?upcoming=true").unwrap().as_str(),
            "https://5.147.111.121:8443/api/v1/workshops?upcoming=true"
        );
    }
}
