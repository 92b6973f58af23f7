mod rules;
mod service;

pub use rules::{ProxyRule, RewriteStrategy};
pub use service::{ConfigError, ServerConfig};
