//! sonicstride-server - audio experiment authoring backend
//!
//! Serves the configs/tracks/events/actions API, the audio file library and
//! experiment music uploads from one SQLite database under the root folder.

use anyhow::{Context, Result};
use clap::Parser;
use sonicstride_common::config::{ConfigOverrides, ServerConfig, TomlConfig};
use sonicstride_common::db::init_database;
use sonicstride_server::{build_router, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments; each flag also reads its environment variable
#[derive(Parser, Debug)]
#[command(name = "sonicstride-server")]
#[command(about = "Sonicstride audio experiment authoring backend")]
#[command(version)]
struct Args {
    /// Root folder holding the database and uploaded files
    #[arg(short, long, env = "SONICSTRIDE_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "SONICSTRIDE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SONICSTRIDE_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SONICSTRIDE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(short, long, env = "SONICSTRIDE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => TomlConfig::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => TomlConfig::discover(),
    };

    let config = ServerConfig::resolve(
        ConfigOverrides {
            root_folder: args.root_folder,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
        },
        file_config,
    );

    init_tracing(&config.log_level);

    info!(
        "Starting Sonicstride server v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Root folder: {}", config.root_folder.display());

    let db_path = config.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database ready: {}", db_path.display());

    let state = AppState::from_config(pool, &config);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sonicstride_server={level},sonicstride_common={level},tower_http={level}",
            level = log_level
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
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
            Ok(mut stream) => {
                stream.recv().await;
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
