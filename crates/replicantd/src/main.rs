//! Replicant Daemon (replicantd)
//!
//! The authoritative process for the Replicant engine: owns the registry,
//! persists snapshots, and serves remote sessions over WebSocket.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (WebSocket on 9090, snapshots under ./db)
//! replicantd
//!
//! # Custom port and data directory
//! replicantd --ws-port 7001 --data-dir /var/lib/replicant
//!
//! # In-memory only, nothing written to disk
//! replicantd --ephemeral
//!
//! # With a configuration file
//! replicantd --config /etc/replicant/replicantd.toml
//! ```

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use replicant_core::Registry;
use replicant_storage::FileStore;
use replicant_transport::WebSocketServer;

/// Replicant Daemon - authoritative replicant registry server
#[derive(Parser, Debug)]
#[command(name = "replicantd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address
    #[arg(long, env = "REPLICANT_BIND")]
    bind: Option<String>,

    /// WebSocket port to listen on
    #[arg(long, env = "REPLICANT_WS_PORT")]
    ws_port: Option<u16>,

    /// Data directory; snapshots land under <data-dir>/replicants
    #[arg(long, env = "REPLICANT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REPLICANT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Configuration file path; CLI flags take precedence
    #[arg(short, long, env = "REPLICANT_CONFIG")]
    config: Option<PathBuf>,

    /// Disable persistence entirely (in-memory only)
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let bind = args
        .bind
        .or(file.bind)
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let ws_port = args.ws_port.or(file.ws_port).unwrap_or(9090);
    let data_dir = args
        .data_dir
        .or(file.data_dir)
        .unwrap_or_else(|| PathBuf::from("./db"));
    let log_level = args
        .log_level
        .or(file.log_level)
        .unwrap_or_else(|| "info".to_string());
    let ephemeral = args.ephemeral || file.ephemeral.unwrap_or(false);

    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .init();

    let registry = if ephemeral {
        info!("Persistence disabled (--ephemeral)");
        Arc::new(Registry::new())
    } else {
        let root = data_dir.join("replicants");
        info!(path = %root.display(), "Snapshot persistence enabled");
        Arc::new(Registry::with_store(Arc::new(FileStore::new(root))))
    };

    let ws_addr: SocketAddr = format!("{}:{}", bind, ws_port).parse()?;
    info!(addr = %ws_addr, "Starting replicantd");

    let server = WebSocketServer::new(registry.clone(), ws_addr);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "WebSocket server error");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    server_handle.abort();

    Ok(())
}
