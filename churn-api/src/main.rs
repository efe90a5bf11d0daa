//! churn-api (Prediction Service) - Main entry point
//!
//! Loads the model artifact, then serves `POST /predict` and `GET /health`.
//! If the artifact is missing or corrupt the process exits before binding
//! its listener.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use churn_common::config::TomlConfig;
use churn_common::PipelineModel;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use churn_api::{build_router, AppState};

/// Command-line arguments for churn-api
#[derive(Parser, Debug)]
#[command(name = "churn-api")]
#[command(about = "Churn prediction service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CHURN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "CHURN_API_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CHURN_API_PORT")]
    port: Option<u16>,

    /// Model artifact to serve
    #[arg(short, long, env = "CHURN_MODEL_PATH")]
    model: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_origin) = TomlConfig::load_or_default(args.config.as_deref())?;

    churn_common::logging::init_tracing(&config.logging.level);

    info!(
        "Starting churn-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_origin.log();

    let host = args.host.unwrap_or(config.api.host);
    let port = args.port.unwrap_or(config.api.port);
    let model_path = args.model.unwrap_or(config.api.model_path);

    // Fail fast: no model, no listener
    let model = match PipelineModel::load(&model_path) {
        Ok(model) => {
            info!("✓ Model loaded from {}", model_path.display());
            model
        }
        Err(e) => {
            error!("Cannot start without a model: {}", e);
            return Err(e).context("Failed to load model artifact");
        }
    };

    let state = AppState::new(Arc::new(model));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("churn-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
