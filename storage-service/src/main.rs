use std::sync::Arc;

use anyhow::{Context, Result};
use shared::observability::init_logging;
use tokio::net::TcpListener;
use tracing::{error, info};

use storage_service::{
    config::Config,
    routes,
    storage::{ObjectStore, S3ObjectStore},
    AppState,
};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

fn load_env_files() {
    // Later files never override earlier values
    for file in ["config.env", ".env"] {
        if let Err(e) = dotenvy::from_filename(file) {
            if !e.not_found() {
                eprintln!("Ignoring {}: {}", file, e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_files();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_logging(config.log_config()?).context("Failed to initialize logging")?;

    info!("Starting Storage Service v{}", env!("CARGO_PKG_VERSION"));

    let store: Option<Arc<dyn ObjectStore>> = match S3ObjectStore::connect(&config.storage).await {
        Ok(store) => {
            info!(endpoint = %store.endpoint(), "Object store client initialized");
            Some(Arc::new(store))
        }
        Err(e) => {
            error!("Object store client unavailable, running disconnected: {:#}", e);
            None
        }
    };

    let bind_to = (config.server.host.clone(), config.server.port);
    let app = routes::router(AppState::new(config, store));

    let listener = TcpListener::bind(bind_to)
        .await
        .context("Failed to bind to address")?;

    info!(
        "Storage Service listening on {}",
        listener.local_addr().context("Listener has no local address")?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Storage Service shut down gracefully");
    Ok(())
}
