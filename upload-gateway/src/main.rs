use anyhow::{Context, Result};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

use shared::observability::init_logging;
use upload_gateway::{
    config::Config,
    create_router,
    storage::{LocalStore, S3Client},
    AppState,
};

// Graceful shutdown handler
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    config.validate().context("Invalid configuration")?;

    init_logging(config.logging.to_log_config("upload-gateway")?)?;

    info!("Starting Upload Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Storage partitions must exist before accepting traffic
    let local = LocalStore::new(&config.storage.upload_root);
    local
        .ensure_partitions()
        .await
        .with_context(|| format!("Failed to prepare {}", local.root().display()))?;

    let s3_client = S3Client::new(config.s3.clone()).await?;
    info!("S3 client initialized successfully");

    let state = AppState::new(local, Arc::new(s3_client));
    let app = create_router(state, &config.server);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .context("Invalid SERVER_HOST")?;
    let addr = SocketAddr::new(host, config.server.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Upload Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Upload Gateway shut down gracefully");
    Ok(())
}
