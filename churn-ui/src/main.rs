//! churn-ui (Client) - Main entry point
//!
//! Serves the prediction form. Starting does not require the prediction
//! service to be up; an unreachable backend only shows as an error banner.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use churn_common::config::TomlConfig;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use churn_ui::{build_router, AppState, PredictionClient, SessionStore};

/// Command-line arguments for churn-ui
#[derive(Parser, Debug)]
#[command(name = "churn-ui")]
#[command(about = "Churn prediction form client")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CHURN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "CHURN_UI_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CHURN_UI_PORT")]
    port: Option<u16>,

    /// Full URL of the prediction endpoint
    #[arg(short, long, env = "CHURN_BACKEND_URL")]
    backend_url: Option<String>,

    /// Request timeout towards the prediction service, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Drop a session after this many idle seconds
    #[arg(long)]
    session_ttl_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_origin) = TomlConfig::load_or_default(args.config.as_deref())?;

    churn_common::logging::init_tracing(&config.logging.level);

    info!("Starting churn-ui v{}", env!("CARGO_PKG_VERSION"));
    config_origin.log();

    let host = args.host.unwrap_or(config.ui.host);
    let port = args.port.unwrap_or(config.ui.port);
    let backend_url = args.backend_url.unwrap_or(config.ui.backend_url);
    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(config.ui.timeout_secs));

    let client = PredictionClient::new(backend_url.clone(), timeout)
        .context("Failed to build HTTP client")?;
    info!("Prediction service: {} (timeout {:?})", backend_url, timeout);

    let session_ttl =
        Duration::from_secs(args.session_ttl_secs.unwrap_or(config.ui.session_ttl_secs));
    info!("Idle sessions expire after {:?}", session_ttl);

    let app = build_router(AppState::with_sessions(
        client,
        SessionStore::with_idle_ttl(session_ttl),
    ));

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("churn-ui listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
