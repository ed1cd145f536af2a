use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crowdfund_api::config::AppConfig;
use crowdfund_api::database::DatabaseManager;
use crowdfund_api::server::{app, AppState};

/// Crowdfunding REST API server
#[derive(Parser, Debug)]
#[command(name = "crowdfund-api", version, about)]
struct Args {
    /// Port to listen on (overrides SERVER_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to bind (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Directory uploaded images are written to (overrides SERVER_UPLOAD_DIR)
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Do not create missing tables at startup
    #[arg(long)]
    skip_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crowdfund_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(upload_dir) = args.upload_dir {
        config.server.upload_dir = upload_dir;
    }
    config.validate().context("invalid configuration")?;

    tracing::info!("Starting crowdfund API in {:?} mode", config.environment);

    let database = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if !args.skip_schema {
        database.ensure_schema().await.context("failed to prepare schema")?;
    }

    tokio::fs::create_dir_all(&config.server.upload_dir)
        .await
        .with_context(|| format!("failed to create upload dir {}", config.server.upload_dir.display()))?;

    let state = AppState::from_database(&config, database.clone()).context("failed to build application state")?;
    let router = app(state, &config);

    let bind_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.server.host, config.server.port))?;
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Crowdfund API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
