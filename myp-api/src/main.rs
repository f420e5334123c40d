//! myp-api - Music release year prediction service
//!
//! Endpoints:
//! - `GET /health` service and model status
//! - `POST /predict` year estimate with a confidence band
//! - `GET /` interactive slider page (plus `/static/*` assets)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use myp_api::{build_router, AppState};
use myp_common::config::{resolve_config_path, TomlConfig, CONFIG_ENV_VAR};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for myp-api
#[derive(Parser, Debug)]
#[command(name = "myp-api")]
#[command(about = "Serve music release year predictions over HTTP")]
#[command(version)]
struct Args {
    /// Config file (defaults to ./myp.toml when present)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "MYP_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MYP_PORT")]
    port: Option<u16>,

    /// Model artifact to load
    #[arg(long, env = "MYP_MODEL_PATH")]
    model_path: Option<PathBuf>,

    /// Feature-name list to load
    #[arg(long, env = "MYP_FEATURE_NAMES_PATH")]
    feature_names_path: Option<PathBuf>,

    /// Directory with index.html and UI assets
    #[arg(long, env = "MYP_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let mut config = TomlConfig::load(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    // Build identification first, before the model load can take time
    info!(
        "Starting myp-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => warn!("No config file found; using built-in defaults"),
    }

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(model) = args.model_path {
        config.artifacts.model = model;
    }
    if let Some(feature_names) = args.feature_names_path {
        config.artifacts.feature_names = feature_names;
    }
    if let Some(static_dir) = args.static_dir {
        config.server.static_dir = static_dir;
    }

    if !config.server.static_dir.join("index.html").is_file() {
        warn!(
            "UI page not found at {}; GET / will return 404",
            config.server.static_dir.join("index.html").display()
        );
    }

    let state = AppState::load(&config.artifacts, config.server.static_dir.clone());
    if !state.model.is_ready() {
        error!("Model unavailable; run myp-train to produce the artifacts");
    }
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!("Failed to bind to {}:{}", config.server.host, config.server.port)
        })?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    info!("myp-api listening on http://{}", addr);
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
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
