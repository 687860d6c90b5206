//! msform-api - Multi-step form submission service
//!
//! Receives wizard submissions over HTTP, stores them in SQLite and
//! serves them back for review.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use msform_api::{build_router, AppState};
use msform_common::config::{BootstrapConfig, CliOverrides};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for msform-api
#[derive(Parser, Debug)]
#[command(name = "msform-api")]
#[command(about = "Multi-step form submission service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides MSFORM_PORT / PORT and config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Storage connection string, e.g. sqlite:///var/lib/msform/msform.db
    #[arg(short, long)]
    database_url: Option<String>,

    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = BootstrapConfig::resolve(&CliOverrides {
        port: args.port,
        database_url: args.database_url,
        config_file: args.config,
    })
    .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "msform_api={level},msform_common={level},tower_http={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting msform-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let pool = match msform_common::db::init_database(&config.database_url).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    // repository → service → router, constructed once
    let state = AppState::with_pool(pool);
    let app = build_router(state);

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("msform-api listening on http://{}", addr);
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
            info!("Received SIGTERM, shutting down");
        },
    }
}
