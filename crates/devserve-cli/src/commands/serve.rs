use std::path::{Path, PathBuf};

use clap::Args;
use devserve_config::ServerConfig;
use devserve_core::DEFAULT_CONFIG_FILE;
use tracing::info;

use crate::server;

#[derive(Args)]
pub struct ServeCommand {
    /// Path to the configuration file
    #[arg(long, env = "DEVSERVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind the server to (overrides the config file)
    #[arg(long, env = "DEVSERVE_ADDRESS")]
    pub address: Option<String>,

    /// Static root directory (overrides the config file)
    #[arg(long, env = "DEVSERVE_ROOT")]
    pub root: Option<PathBuf>,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let config = self.resolve_config()?;
        config.ensure_root()?;
        let addr = config.bind_addr()?;

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async move {
            let router = server::build_router(&config)?;
            let listener = tokio::net::TcpListener::bind(addr).await?;

            info!("devserve listening on http://{}", addr);
            info!(
                root = %config.root.display(),
                rules = config.proxy.len(),
                cors = config.cors,
                "serving"
            );

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            Ok(())
        })
    }

    /// File values first, then CLI/env overrides. Overrides are
    /// revalidated so a bad --address fails as fast as a bad file.
    fn resolve_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    ServerConfig::load(default)?
                } else {
                    ServerConfig::default()
                }
            }
        };

        if let Some(address) = &self.address {
            config.address = address.clone();
        }
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c signal");
    info!("Received Ctrl+C, shutting down");
}
