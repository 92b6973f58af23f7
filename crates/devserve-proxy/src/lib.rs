//! devserve proxy - prefix-matching dev-proxy rules
//!
//! This crate provides the request-forwarding half of the dev server:
//! - An immutable rule table consulted per request (declaration order,
//!   first match wins)
//! - Pure path rewriting applied exactly once at match time
//! - Per-rule HTTP clients, including the insecure-TLS escape hatch for
//!   local upstreams with self-signed certificates
//! - Streaming request/response forwarding with hop-by-hop header
//!   stripping

pub mod forward;
pub mod service;


// Re-export main types
pub use forward::ProxyError;
pub use service::{ProxyService, RuleMatch};
