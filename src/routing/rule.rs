//! A compiled proxy rule.

use axum::http::{HeaderValue, Uri};
use thiserror::Error;
use url::Url;

use crate::config::ProxyTargetConfig;
use crate::routing::matcher::PathPrefixMatcher;

/// Why a proxy table entry could not be compiled.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("proxy path prefix must not be empty")]
    EmptyPrefix,

    #[error("proxy path prefix `{prefix}` must start with `/`")]
    PrefixNotAbsolute { prefix: String },

    #[error("proxy `{prefix}`: invalid target `{target}`: {source}")]
    InvalidTarget {
        prefix: String,
        target: String,
        source: url::ParseError,
    },

    #[error("proxy `{prefix}`: unsupported target scheme `{scheme}` (expected http or https)")]
    UnsupportedScheme { prefix: String, scheme: String },

    #[error("proxy `{prefix}`: target `{target}` has no host")]
    MissingHost { prefix: String, target: String },

    #[error("proxy `{prefix}`: target `{target}` must not carry a query or fragment")]
    TargetHasQuery { prefix: String, target: String },

    #[error("proxy `{prefix}`: target `{target}` does not form a valid upstream URI: {reason}")]
    InvalidUpstream {
        prefix: String,
        target: String,
        reason: String,
    },
}

/// Whether certificate checks apply to a rule's upstream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVerification {
    /// https target, `secure = true`.
    Enforced,
    /// https target, `secure = false`: certificates and hostnames are not checked.
    Disabled,
    /// Plain http target; `secure` has no effect.
    NotApplicable,
}

impl TlsVerification {
    pub fn as_str(&self) -> &'static str {
        match self {
            TlsVerification::Enforced => "enforced",
            TlsVerification::Disabled => "disabled",
            TlsVerification::NotApplicable => "not-applicable",
        }
    }
}

/// One entry of the rule table. Immutable once built.
#[derive(Debug, Clone)]
pub struct ProxyRule {
    matcher: PathPrefixMatcher,
    target: Url,
    secure: bool,
    authority: String,
    host_header: HeaderValue,
}

impl ProxyRule {
    /// Compile a table entry, checking the prefix and target URL.
    pub fn parse(prefix: &str, config: &ProxyTargetConfig) -> Result<Self, RouteError> {
        if prefix.is_empty() {
            return Err(RouteError::EmptyPrefix);
        }
        if !prefix.starts_with('/') {
            return Err(RouteError::PrefixNotAbsolute {
                prefix: prefix.to_string(),
            });
        }

        let raw = config.target();
        let target = Url::parse(raw).map_err(|source| RouteError::InvalidTarget {
            prefix: prefix.to_string(),
            target: raw.to_string(),
            source,
        })?;

        match target.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RouteError::UnsupportedScheme {
                    prefix: prefix.to_string(),
                    scheme: other.to_string(),
                })
            }
        }

        let host = target
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| RouteError::MissingHost {
                prefix: prefix.to_string(),
                target: raw.to_string(),
            })?;

        if target.query().is_some() || target.fragment().is_some() {
            return Err(RouteError::TargetHasQuery {
                prefix: prefix.to_string(),
                target: raw.to_string(),
            });
        }

        let authority = match target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let host_header =
            HeaderValue::from_str(&authority).map_err(|e| RouteError::InvalidUpstream {
                prefix: prefix.to_string(),
                target: raw.to_string(),
                reason: e.to_string(),
            })?;

        let rule = Self {
            matcher: PathPrefixMatcher::new(prefix),
            target,
            secure: config.secure(),
            authority,
            host_header,
        };

        // Surface URI construction problems at startup, not per request.
        rule.upstream_uri(&Uri::from_static("/"))
            .map_err(|e| RouteError::InvalidUpstream {
                prefix: prefix.to_string(),
                target: raw.to_string(),
                reason: e.to_string(),
            })?;

        Ok(rule)
    }

    pub fn path_prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn matcher(&self) -> &PathPrefixMatcher {
        &self.matcher
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    pub fn is_tls(&self) -> bool {
        self.target.scheme() == "https"
    }

    pub fn tls_verification(&self) -> TlsVerification {
        match (self.is_tls(), self.secure) {
            (false, _) => TlsVerification::NotApplicable,
            (true, true) => TlsVerification::Enforced,
            (true, false) => TlsVerification::Disabled,
        }
    }

    /// Value for the forwarded Host header: the target's authority.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Map an inbound request URI onto the target.
    ///
    /// The matched prefix is kept. A base path on the target is prepended.
    pub fn upstream_uri(&self, original: &Uri) -> Result<Uri, axum::http::Error> {
        let base = self.target.path().trim_end_matches('/');
        let path_and_query = match original.query() {
            Some(query) => format!("{}{}?{}", base, original.path(), query),
            None => format!("{}{}", base, original.path()),
        };

        Uri::builder()
            .scheme(self.target.scheme())
            .authority(self.authority.as_str())
            .path_and_query(path_and_query)
            .build()
    }
}
