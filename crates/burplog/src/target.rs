//! Request URL resolution.

use serde::{Serialize, Serializer};
use std::fmt;
use url::Url;

/// URL of a captured request.
///
/// Absolute when the record's host is an absolute URL. Otherwise the path is
/// kept as-is, rooted at `/`.
///
/// Absolute URLs are normalized by [`Url`], which drops a port that matches
/// the scheme's default: host `https://example.com:443` resolves to
/// `https://example.com/...`. Non-default ports are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestUrl {
    Absolute(Url),
    Relative(String),
}

impl RequestUrl {
    /// Join `host` (e.g. `https://example.com:443`) with a request path.
    pub fn resolve(host: Option<&str>, path: &str) -> Self {
        let Some(host) = host else {
            return RequestUrl::Relative(path.to_string());
        };

        match Url::parse(host).and_then(|base| base.join(path)) {
            Ok(url) => RequestUrl::Absolute(url),
            Err(e) => {
                tracing::debug!(host, path, error = %e, "host is not an absolute URL");
                RequestUrl::Relative(path.to_string())
            }
        }
    }

    /// Scheme of an absolute URL, `None` for a relative one.
    pub fn scheme(&self) -> Option<&str> {
        match self {
            RequestUrl::Absolute(url) => Some(url.scheme()),
            RequestUrl::Relative(_) => None,
        }
    }

    /// Query string without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        match self {
            RequestUrl::Absolute(url) => url.query(),
            RequestUrl::Relative(path) => path
                .split_once('?')
                .map(|(_, rest)| rest.split('#').next().unwrap_or_default()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RequestUrl::Absolute(url) => url.as_str(),
            RequestUrl::Relative(path) => path,
        }
    }
}

impl fmt::Display for RequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RequestUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute() {
        let url = RequestUrl::resolve(Some("https://example.com:443"), "/login?next=%2F");
        assert_eq!(url.as_str(), "https://example.com/login?next=%2F");
        assert_eq!(url.scheme(), Some("https"));
        assert_eq!(url.query(), Some("next=%2F"));
    }

    #[test]
    fn test_resolve_drops_default_port() {
        let url = RequestUrl::resolve(Some("http://example.com:80"), "/a");
        assert_eq!(url.as_str(), "http://example.com/a");

        let url = RequestUrl::resolve(Some("https://example.com:443"), "/");
        assert_eq!(url.as_str(), "https://example.com/");
        assert_eq!(url.scheme(), Some("https"));
    }

    #[test]
    fn test_resolve_keeps_non_default_port() {
        let url = RequestUrl::resolve(Some("http://10.0.0.5:8080"), "/api");
        assert_eq!(url.as_str(), "http://10.0.0.5:8080/api");
        assert_eq!(url.scheme(), Some("http"));
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_resolve_without_host_is_relative() {
        let url = RequestUrl::resolve(None, "/search?q=rust");
        assert_eq!(url, RequestUrl::Relative("/search?q=rust".to_string()));
        assert_eq!(url.scheme(), None);
        assert_eq!(url.query(), Some("q=rust"));
    }

    #[test]
    fn test_resolve_bare_hostname_is_relative() {
        let url = RequestUrl::resolve(Some("www.example.com"), "/");
        assert_eq!(url, RequestUrl::Relative("/".to_string()));
    }
}
