//! Standalone task server.
//!
//! Reads an optional TOML config from `TASKHUB_CONFIG`, provisions the
//! configured bearer tokens, and serves until ctrl-c.

use std::sync::Arc;

use anyhow::Context;
use taskhub::config::ServerConfig;
use taskhub::server::{
    router, AppState, EventBroadcaster, InMemoryTaskStore, StaticTokenValidator, TaskService,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("TASKHUB_CONFIG") {
        Ok(path) => ServerConfig::from_toml_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        Err(_) => ServerConfig::default(),
    };
    if config.tokens.is_empty() {
        tracing::warn!("no tokens configured; every request will be rejected with 401");
    }

    let validator = StaticTokenValidator::new();
    for entry in &config.tokens {
        validator.insert(&entry.token, &entry.user_id);
    }

    let events = Arc::new(EventBroadcaster::new(config.event_channel_capacity));
    let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new()), events));
    let state = AppState::new(service, Arc::new(validator))
        .with_request_timeout(config.request_timeout());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}
