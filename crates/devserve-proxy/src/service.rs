//! Proxy service
//!
//! Compiles configured rules into an immutable table of (rule, upstream
//! URL, HTTP client) entries. Built once at startup, shared via `Arc`,
//! never mutated at runtime.

use devserve_config::{ConfigError, ProxyRule};
use tracing::debug;
use url::Url;

use crate::forward::ProxyError;

/// One compiled rule. The client is constructed per rule so that the
/// TLS-verification toggle applies to exactly the upstream it was
/// configured for.
#[derive(Debug)]
pub(crate) struct RuleEntry {
    pub rule: ProxyRule,
    pub upstream: Url,
    pub client: reqwest::Client,
}

/// A matched rule together with the rewritten path to forward
pub struct RuleMatch<'a> {
    pub(crate) entry: &'a RuleEntry,
    pub path: String,
}

impl RuleMatch<'_> {
    pub fn prefix(&self) -> &str {
        &self.entry.rule.prefix
    }

    pub fn upstream(&self) -> &Url {
        &self.entry.upstream
    }
}

/// Immutable, declaration-ordered table of compiled proxy rules
#[derive(Debug)]
pub struct ProxyService {
    entries: Vec<RuleEntry>,
}

impl ProxyService {
    /// Compile the configured rules. Fails fast on a malformed upstream
    /// origin or an unbuildable client.
    pub fn from_rules(rules: &[ProxyRule]) -> Result<Self, ProxyError> {
        let entries = rules
            .iter()
            .map(|rule| {
                let upstream = rule.upstream_url()?;
                let client = build_client(rule)?;
                debug!(
                    prefix = %rule.prefix,
                    upstream = %upstream,
                    verify_tls = rule.verify_tls,
                    "compiled proxy rule"
                );
                Ok(RuleEntry {
                    rule: rule.clone(),
                    upstream,
                    client,
                })
            })
            .collect::<Result<Vec<_>, ProxyError>>()?;

        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Find the rule for an inbound path, in declaration order.
    ///
    /// Returns the rewritten path alongside the matched entry; the
    /// rewrite is applied here, exactly once, and never reapplied
    /// downstream.
    pub fn resolve(&self, path: &str) -> Option<RuleMatch<'_>> {
        self.entries
            .iter()
            .find(|entry| entry.rule.matches(path))
            .map(|entry| RuleMatch {
                entry,
                path: entry.rule.rewritten(path).into_owned(),
            })
    }
}

fn build_client(rule: &ProxyRule) -> Result<reqwest::Client, ProxyError> {
    // A proxy passes redirects through to the caller rather than
    // following them
    let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());

    if !rule.verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(|e| ProxyError::ClientBuild {
        prefix: rule.prefix.clone(),
        source: e,
    })
}

impl From<ConfigError> for ProxyError {
    fn from(e: ConfigError) -> Self {
        ProxyError::Config(e)
    }
}
