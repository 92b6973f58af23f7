//! Proxy rule value objects
//!
//! A rule associates a literal path prefix with an upstream origin and a
//! built-in rewrite strategy. Rules are plain serde values so they can be
//! validated and tested without the server runtime.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::service::ConfigError;

fn default_true() -> bool {
    true
}

/// A single dev-proxy rule, constructed once at startup and held immutable
/// for the lifetime of the server process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyRule {
    /// Literal path prefix that activates the rule. Not a pattern language.
    pub prefix: String,

    /// Destination scheme://host:port for forwarded requests
    pub upstream: String,

    /// Override the Host header to match the upstream authority
    #[serde(default = "default_true")]
    pub change_origin: bool,

    /// When false, accept invalid/self-signed upstream certificates
    #[serde(default = "default_true")]
    pub verify_tls: bool,

    /// Path transformation applied before forwarding
    #[serde(default)]
    pub rewrite: RewriteStrategy,
}

/// Built-in path rewrite strategies.
///
/// Each strategy is a pure, total function over path strings. The rewrite
/// runs exactly once, at match time; a path that no longer carries the
/// prefix passes through unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteStrategy {
    /// Remove the leading prefix occurrence (the dev-proxy default)
    #[default]
    StripPrefix,
    /// Forward the path untouched
    KeepPath,
    /// Remove the leading prefix and prepend a replacement segment
    ReplacePrefix { replacement: String },
}

impl RewriteStrategy {
    /// Apply the strategy to `path` for a rule matching `prefix`.
    ///
    /// An empty result is normalized to "/", and a missing leading slash
    /// is restored, so the forwarded path is always a valid origin-form
    /// path.
    pub fn apply<'a>(&self, prefix: &str, path: &'a str) -> Cow<'a, str> {
        match self {
            RewriteStrategy::KeepPath => Cow::Borrowed(path),
            RewriteStrategy::StripPrefix => match path.strip_prefix(prefix) {
                Some(rest) => normalize(Cow::Borrowed(rest)),
                None => Cow::Borrowed(path),
            },
            RewriteStrategy::ReplacePrefix { replacement } => match path.strip_prefix(prefix) {
                Some(rest) => normalize(Cow::Owned(format!("{replacement}{rest}"))),
                None => Cow::Borrowed(path),
            },
        }
    }
}

fn normalize(path: Cow<'_, str>) -> Cow<'_, str> {
    if path.is_empty() {
        Cow::Borrowed("/")
    } else if !path.starts_with('/') {
        Cow::Owned(format!("/{path}"))
    } else {
        path
    }
}

impl ProxyRule {
    /// True when `path` activates this rule
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// The rewritten path this rule forwards for an inbound `path`
    pub fn rewritten<'a>(&self, path: &'a str) -> Cow<'a, str> {
        self.rewrite.apply(&self.prefix, path)
    }

    /// Parse and return the upstream origin URL
    pub fn upstream_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.upstream).map_err(|e| ConfigError::InvalidUpstream {
            prefix: self.prefix.clone(),
            upstream: self.upstream.clone(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUpstream {
                prefix: self.prefix.clone(),
                upstream: self.upstream.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUpstream {
                prefix: self.prefix.clone(),
                upstream: self.upstream.clone(),
                reason: "missing host".to_string(),
            });
        }

        Ok(url)
    }

    /// Validate the rule shape without touching the network
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.prefix.starts_with('/') {
            return Err(ConfigError::InvalidPrefix {
                prefix: self.prefix.clone(),
            });
        }
        self.upstream_url().map(|_| ())
    }
}
