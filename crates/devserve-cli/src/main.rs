//! devserve - local development server
//!
//! Serves a static asset directory and forwards prefix-matched requests
//! to configured upstream backends.

mod commands;
mod server;

use clap::{Parser, Subcommand};
use commands::{CheckCommand, ServeCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "DEVSERVE_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "DEVSERVE_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the development server
    Serve(ServeCommand),
    /// Validate a configuration file and exit
    Check(CheckCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = cli.log_level.clone();

    // If RUST_LOG is set, use it directly; otherwise use our default filter
    let filter = if std::env::var("RUST_LOG").is_ok() {
        // RUST_LOG is set, use it as-is (user wants full control)
        tracing_subscriber::EnvFilter::try_from_default_env()
            .expect("Invalid RUST_LOG environment variable")
    } else {
        // All devserve crates at the requested level, noisy dependencies
        // at warn
        tracing_subscriber::EnvFilter::new(format!(
            "devserve_cli={level},\
             devserve_core={level},\
             devserve_config={level},\
             devserve_proxy={level},\
             devserve_static_files={level},\
             tower=warn,\
             tower_http=warn,\
             hyper=warn,\
             reqwest=warn,\
             rustls=warn,\
             h2=warn",
            level = log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");

    match cli.command {
        Commands::Serve(serve_cmd) => serve_cmd.execute(),
        Commands::Check(check_cmd) => check_cmd.execute(),
    }
}
