mod config;
mod platform;
mod relay;
mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::platform::telegram::TelegramGateway;
use crate::relay::RelayEngine;
use crate::webhook::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relaybot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Owner: {}", config.telegram.owner_id);
    info!("  Bind address: {}", config.server.bind_address);
    info!(
        "  Public URL: {}",
        config.server.public_url.as_deref().unwrap_or("(not set, /registerWebhook disabled)")
    );

    let gateway = Arc::new(TelegramGateway::new(&config.telegram.bot_token));
    let engine = Arc::new(RelayEngine::new(gateway.clone(), config.owner()));
    let state = AppState::new(
        engine,
        gateway,
        &config.telegram.secret_token,
        config.server.public_url.as_deref(),
    );
    let app = webhook::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind_address))?;

    info!("Relay is listening on {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
