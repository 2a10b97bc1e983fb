//! jeonse-analyzer - Jeonse risk analysis service
//!
//! Resolves a region to a district, pulls recent sale and lease records from
//! the public transaction registry, pairs them per building and reports a
//! jeonse-rate based risk for each property.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use jeonse_analyzer::config::RegistrySettings;
use jeonse_analyzer::db::purge::purge_region;
use jeonse_analyzer::db::SqliteTransactionStore;
use jeonse_analyzer::services::{MolitRegistryClient, RegionResolver, RetrievalOrchestrator};
use jeonse_analyzer::{build_router, AppState};
use jeonse_common::config::{
    load_toml_config, write_toml_config, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use jeonse_common::db::init_database;

/// Command-line arguments for jeonse-analyzer
#[derive(Parser, Debug)]
#[command(name = "jeonse-analyzer")]
#[command(about = "Jeonse fraud risk analysis over public transaction records")]
#[command(version)]
struct Args {
    /// Folder holding the database and configuration file
    #[arg(short, long, global = true)]
    root_folder: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Delete every cached row and history entry for a region
    PurgeRegion {
        /// Region or neighbourhood name, e.g. 대치동
        region: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let root_folder = RootFolderResolver::new("jeonse-analyzer")
        .with_cli_arg(args.root_folder.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let config_path = initializer.config_path();
    let config = load_toml_config(&config_path).context("Failed to load configuration")?;
    let wrote_default_config = !config_path.exists();
    if wrote_default_config {
        write_toml_config(&config, &config_path).context("Failed to write default configuration")?;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str())),
        )
        .init();

    info!(
        "Starting jeonse-analyzer v{} (root folder {})",
        env!("CARGO_PKG_VERSION"),
        initializer.root_folder().display()
    );
    if wrote_default_config {
        info!("Wrote default configuration to {}", config_path.display());
    }

    let db_path = initializer.database_path();
    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database {}: {}", db_path.display(), e);
            return Err(e.into());
        }
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::PurgeRegion { region } => {
            let summary = purge_region(&pool, &region).await?;
            info!(
                region = %region,
                heatmap = summary.heatmap,
                search_history = summary.search_history,
                transactions = summary.transactions,
                "Region purged"
            );
            println!(
                "Purged '{}': {} heatmap, {} search history, {} transaction rows",
                region.trim(),
                summary.heatmap,
                summary.search_history,
                summary.transactions
            );
            Ok(())
        }
        Command::Serve => serve(config, pool).await,
    }
}

async fn serve(config: TomlConfig, pool: SqlitePool) -> Result<()> {
    let settings = RegistrySettings::resolve(&config);
    let registry = MolitRegistryClient::new(&settings).context("Failed to build registry client")?;
    let store = SqliteTransactionStore::new(pool.clone());

    let orchestrator = RetrievalOrchestrator::new(
        RegionResolver::new(config.default_district_code()),
        Arc::new(registry),
        Arc::new(store),
    )
    .with_page_size(settings.page_size)
    .with_max_concurrent_fetches(settings.max_concurrent_fetches);

    let state = AppState::new(pool, orchestrator);
    let app = build_router(state);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("jeonse-analyzer listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
