//! TrackIt attendance server - main entry point
//!
//! Serves the attendance HTTP API and the room relay WebSocket on one port.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use trackit_common::config::{
    default_config_path, load_toml_config, prepare_root_folder, resolve_root_folder,
    InsightProviderKind, LoggingConfig,
};
use trackit_server::insight::{CannedInsightProvider, CompletionInsightProvider, InsightProvider};
use trackit_server::relay::RelayHub;
use trackit_server::{build_router, AppState};

/// Command-line arguments for trackit-server
#[derive(Parser, Debug)]
#[command(name = "trackit-server")]
#[command(about = "Attendance tracking API with real-time room relay")]
#[command(version)]
struct Args {
    /// Bootstrap configuration file
    #[arg(short, long, env = "TRACKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database (overrides config file)
    #[arg(short, long, env = "TRACKIT_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "TRACKIT_PORT")]
    port: Option<u16>,

    /// Interface to bind (overrides config file)
    #[arg(short, long, env = "TRACKIT_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = load_toml_config(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    init_tracing(&config.logging)?;

    info!(
        "Starting TrackIt server (trackit-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if config_path.exists() {
        info!("Configuration: {}", config_path.display());
    } else {
        warn!("No configuration file at {}, using defaults", config_path.display());
    }

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let db_path = prepare_root_folder(&root_folder)?;
    info!("Database path: {}", db_path.display());

    let pool = trackit_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let insight: Arc<dyn InsightProvider> = match config.insight.provider {
        InsightProviderKind::Canned => Arc::new(CannedInsightProvider),
        InsightProviderKind::Completion => {
            match CompletionInsightProvider::from_config(&config.insight) {
                Ok(provider) => {
                    info!(endpoint = provider.endpoint(), "Using completion insight provider");
                    Arc::new(provider)
                }
                Err(e) => {
                    error!("Completion provider unavailable ({}), using canned insights", e);
                    Arc::new(CannedInsightProvider)
                }
            }
        }
    };

    let hub = Arc::new(RelayHub::new(config.relay.outbox_capacity));
    let state = AppState::new(pool, hub, insight);
    let app = build_router(state);

    let bind = args.bind.unwrap_or(config.bind_addr);
    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("trackit-server listening on http://{}", addr);
    info!("Relay WebSocket: ws://{}/ws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// EnvFilter from `RUST_LOG`, else the configured level; optional log file
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", logging.level)));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
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
