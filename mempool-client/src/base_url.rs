//! Base URL validation and normalization.

use std::fmt;

use reqwest::Url;

use crate::error::InvalidBaseUrl;

/// Default public instance.
pub const DEFAULT_BASE_URL: &str = "https://mempool.space";

/// A validated, normalized API base URL.
///
/// Normalization trims whitespace and strips trailing `/` so endpoint paths
/// can be appended verbatim. Only absolute `http`/`https` URLs are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl {
    normalized: String,
    host: Option<String>,
}

impl BaseUrl {
    /// Validate and normalize a user-supplied base URL.
    pub fn parse(raw: &str) -> Result<Self, InvalidBaseUrl> {
        let normalized = raw.trim().trim_end_matches('/').to_string();
        let invalid = |reason: String| InvalidBaseUrl {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query strings and fragments are not allowed".into()));
        }

        Ok(Self {
            host: url.host_str().map(str::to_string),
            normalized,
        })
    }

    /// The normalized URL, without a trailing separator.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Stable identifier for this endpoint: the hostname, or the whole URL
    /// when it has none.
    pub fn unique_id(&self) -> &str {
        self.host.as_deref().unwrap_or(&self.normalized)
    }

    /// Join an absolute API path (starting with `/`) onto the base.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.normalized, path)
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self {
            normalized: DEFAULT_BASE_URL.to_string(),
            host: Some("mempool.space".to_string()),
        }
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl std::str::FromStr for BaseUrl {
    type Err = InvalidBaseUrl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_separators_are_stripped() {
        let url = BaseUrl::parse("https://mempool.space/").unwrap();
        assert_eq!(url.as_str(), "https://mempool.space");

        let url = BaseUrl::parse("  http://umbrel.local:3006/mempool// ").unwrap();
        assert_eq!(url.as_str(), "http://umbrel.local:3006/mempool");
    }

    #[test]
    fn unique_id_is_hostname() {
        let url = BaseUrl::parse("http://umbrel.local:3006/").unwrap();
        assert_eq!(url.unique_id(), "umbrel.local");
    }

    #[test]
    fn join_appends_path() {
        let url = BaseUrl::parse("https://mempool.space/").unwrap();
        assert_eq!(
            url.join("/api/v1/prices"),
            "https://mempool.space/api/v1/prices"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(BaseUrl::parse("ftp://mempool.space").is_err());
        assert!(BaseUrl::parse("mempool.space").is_err());
        assert!(BaseUrl::parse("").is_err());
        assert!(BaseUrl::parse("https://mempool.space/?x=1").is_err());
    }

    #[test]
    fn default_matches_parsed_default() {
        assert_eq!(BaseUrl::default(), BaseUrl::parse(DEFAULT_BASE_URL).unwrap());
    }
}
