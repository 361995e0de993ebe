//! socks5d - SOCKS5 proxy server
//!
//! This is the main entry point for the socks5d application.

use anyhow::Result;
use clap::{Parser, Subcommand};
use socks5d::config::{load_config, Config};
use socks5d::server::run_server;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// socks5d - SOCKS5 proxy server with username/password authentication
#[derive(Parser, Debug)]
#[command(name = "socks5d")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the SOCKS5 server
    Start {
        /// Path to configuration file; built-in defaults are used without it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address, overrides the configuration file
        #[arg(long)]
        listen: Option<String>,

        /// File of `username:password` lines, overrides the configuration file
        #[arg(long)]
        users_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level, args.json_log)?;

    match args.command {
        Command::Start {
            config,
            listen,
            users_file,
        } => {
            let mut config = match &config {
                Some(path) => {
                    let config = load_config(path)?;
                    info!("Configuration loaded from: {:?}", path);
                    config
                }
                None => Config::default(),
            };
            if let Some(listen) = listen {
                config.server.listen_addr = listen;
            }
            if let Some(users_file) = users_file {
                config.server.users_file = Some(users_file);
            }

            info!("socks5d v{}", socks5d::VERSION);
            info!("Listen address: {}", config.server.listen_addr);
            info!(
                "Authentication methods: {}",
                config
                    .server
                    .auth_methods
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
            tokio::spawn(async move {
                wait_for_signal().await;
                let _ = shutdown_tx.send(true);
            });

            run_server(config, shutdown_rx).await
        }
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                error!("Failed to setup SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                info!("Received Ctrl+C, shutting down...");
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        // On Windows, only handle Ctrl+C
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C, shutting down...");
    }
}

/// Setup logging based on configuration
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
