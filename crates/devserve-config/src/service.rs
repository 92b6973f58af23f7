//! Server configuration loading and validation
//!
//! Configuration is read once at process start. Anything malformed fails
//! fast with a [`ConfigError`] and the process does not start.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use devserve_core::{DEFAULT_ADDRESS, DEFAULT_INDEX, DEFAULT_ROOT};

use crate::rules::ProxyRule;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid bind address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("Invalid proxy prefix '{prefix}': must start with '/'")]
    InvalidPrefix { prefix: String },

    #[error("Invalid upstream '{upstream}' for prefix '{prefix}': {reason}")]
    InvalidUpstream {
        prefix: String,
        upstream: String,
        reason: String,
    },

    #[error("Static root '{root}' does not exist or is not a directory")]
    MissingRoot { root: PathBuf },
}

/// Whole-server configuration
/// All fields have defaults so a bare `devserve serve` works in a
/// directory holding a `public/` folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub address: String,

    /// Directory served for requests no proxy rule claims
    pub root: PathBuf,

    /// Index document used for SPA-style navigation fallback
    pub index: String,

    /// Apply a permissive CORS layer for local development
    pub cors: bool,

    /// Proxy rules, consulted in declaration order
    pub proxy: Vec<ProxyRule>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            root: PathBuf::from(DEFAULT_ROOT),
            index: DEFAULT_INDEX.to_string(),
            cors: true,
            proxy: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ServerConfig =
            serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        debug!(path = %path.display(), rules = config.proxy.len(), "loaded configuration");
        Ok(config)
    }

    /// Validate the configuration shape without touching the filesystem
    /// or the network
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        for rule in &self.proxy {
            rule.validate()?;
        }
        Ok(())
    }

    /// Parse the configured bind address
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address
            .parse()
            .map_err(|e| ConfigError::InvalidAddress {
                address: self.address.clone(),
                source: e,
            })
    }

    /// Ensure the static root exists before serving from it
    pub fn ensure_root(&self) -> Result<(), ConfigError> {
        if !self.root.is_dir() {
            return Err(ConfigError::MissingRoot {
                root: self.root.clone(),
            });
        }
        Ok(())
    }
}
