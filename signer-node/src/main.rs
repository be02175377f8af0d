//! Dilithium Signer Node Main Program
//!
//! 1. Load configuration
//! 2. Prepare storage and the document index
//! 3. Serve the HTTP API until Ctrl+C
//! 4. Flush the document index and exit

use anyhow::{Context, Result};
use clap::Parser;
use signer_node::{api::build_router, config, AppContext, ServiceConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Post-quantum (CRYSTALS-Dilithium) signature service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Listen address (overrides config file)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Initialize logging
    init_logging(&args.log_level)?;

    info!("🚀 Starting Dilithium Signer Node v{}", env!("CARGO_PKG_VERSION"));
    info!("──────────────────────────────────────────────");

    // 2. Load configuration, command line arguments win
    let mut config = load_configuration(&args.config)?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    log_configuration(&config);

    // 3. Shared state
    let context = Arc::new(
        AppContext::init(config)
            .await
            .context("Failed to initialize node")?,
    );
    info!("✅ Node context ready");

    // 4. Serve
    let address = format!("{}:{}", context.config.host, context.config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("🌐 Listening on http://{}", address);

    let served = axum::serve(listener, build_router(context.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // 5. Flush state even if the server stopped with an error
    if let Err(e) = context.shutdown().await {
        error!("❌ Failed to flush document index: {}", e);
    }
    served.context("HTTP server failed")?;

    info!("👋 Signer node shut down gracefully");
    Ok(())
}

/// Initialize logging system
fn init_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("⚠️  Unknown log level: {}, using INFO", log_level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

/// Load configuration file
fn load_configuration(config_path: &Path) -> Result<ServiceConfig> {
    info!("📋 Loading configuration: {}", config_path.display());

    if !config_path.exists() {
        warn!("Configuration file does not exist, using SIGNER_* environment and defaults");
        return config::load_config_from_env().context("Failed to load configuration from env");
    }

    config::load_config(config_path).context("Failed to load configuration")
}

fn log_configuration(config: &ServiceConfig) {
    info!("🔍 Configuration:");
    info!("   - Fetch timeout: {} seconds", config.fetch_timeout_secs);
    info!("   - Max fetch size: {} bytes", config.max_fetch_bytes);
    info!("   - Max upload size: {} bytes", config.max_upload_bytes);
    info!("   - Storage dir: {}", config.storage_dir);
    info!("   - Document index: {}", config.document_index_path);
    if !config.public_storage_url.is_empty() {
        info!("   - Public storage URL: {}", config.public_storage_url);
    }
}

/// Resolve on Ctrl+C
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("🛑 Received Ctrl+C signal, preparing to shutdown..."),
        Err(err) => {
            error!("❌ Cannot listen to shutdown signal: {}", err);
            // Keep serving rather than exiting immediately
            std::future::pending::<()>().await
        }
    }
}
