use anyhow::Context;
use std::sync::Arc;

use crate::api;
use crate::config::AppConfig;
use crate::database;
use crate::media::LocalDiskStorage;
use crate::services::AuthService;
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    tracing::info!("Starting sitecms-api in {:?} mode", config.environment);

    let store = database::connect(&config.database)
        .await
        .context("failed to connect document store")?;
    let media = LocalDiskStorage::new(&config.storage.upload_dir, &config.storage.public_base_url)?;
    tracing::info!(
        "Storing images under {} (served at {})",
        media.root().display(),
        config.storage.public_base_url
    );

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, store, Arc::new(media));
    if let Err(e) = AuthService::new(&state).purge_expired_sessions().await {
        tracing::warn!("Failed to purge expired sessions: {}", e.message());
    }
    let app = api::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
