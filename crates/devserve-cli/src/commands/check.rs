use std::path::PathBuf;

use clap::Args;
use devserve_config::ServerConfig;
use devserve_core::DEFAULT_CONFIG_FILE;

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the configuration file
    #[arg(long, env = "DEVSERVE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

impl CheckCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let config = ServerConfig::load(&self.config)?;

        println!("{}: ok", self.config.display());
        println!("  address: {}", config.address);
        println!("  root:    {}", config.root.display());
        println!("  cors:    {}", config.cors);
        for rule in &config.proxy {
            println!(
                "  proxy:   {} -> {} (change_origin: {}, verify_tls: {})",
                rule.prefix, rule.upstream, rule.change_origin, rule.verify_tls
            );
        }
        Ok(())
    }
}
