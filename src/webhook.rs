//! HTTP surface: the Telegram webhook endpoint plus webhook (de)registration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use reqwest::Url;
use subtle::ConstantTimeEq;
use teloxide::types::{Update, UpdateKind};
use tracing::{debug, error, info, warn};

use crate::platform::{InboundEvent, WebhookRegistry};
use crate::relay::RelayEngine;

pub const WEBHOOK_PATH: &str = "/endpoint";
pub const REGISTER_PATH: &str = "/registerWebhook";
pub const UNREGISTER_PATH: &str = "/unRegisterWebhook";
pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

// ── Shared state ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    engine: Arc<RelayEngine>,
    registry: Arc<dyn WebhookRegistry>,
    secret_token: Arc<str>,
    public_url: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        engine: Arc<RelayEngine>,
        registry: Arc<dyn WebhookRegistry>,
        secret_token: &str,
        public_url: Option<&str>,
    ) -> Self {
        Self {
            engine,
            registry,
            secret_token: Arc::from(secret_token),
            public_url: public_url.map(Arc::from),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(handle_webhook))
        .route(REGISTER_PATH, get(register_webhook))
        .route(UNREGISTER_PATH, get(unregister_webhook))
        .with_state(state)
}

// ── Handlers ───────────────────────────────────────────────────────────────────

async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if !secret_matches(presented, &state.secret_token) {
        warn!("Rejected webhook call with a missing or wrong secret token");
        return (StatusCode::FORBIDDEN, "Unauthorized");
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            error!("Failed to parse update: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    // Telegram redelivers on anything but 2xx, so only transport failures fail the call.
    match process_update(&state.engine, &update).await {
        Ok(()) => (StatusCode::OK, "Ok"),
        Err(e) => {
            error!("Failed to relay update {:?}: {:#}", update.id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

async fn process_update(engine: &RelayEngine, update: &Update) -> Result<()> {
    let UpdateKind::Message(msg) = &update.kind else {
        debug!("Ignoring non-message update {:?}", update.id);
        return Ok(());
    };

    let Some(event) = InboundEvent::from_message(msg) else {
        debug!("Ignoring message without a sender in update {:?}", update.id);
        return Ok(());
    };

    let outcome = engine.relay(&event).await?;
    debug!("Update {:?} finished: {:?}", update.id, outcome);
    Ok(())
}

async fn register_webhook(State(state): State<AppState>) -> (StatusCode, String) {
    // Never derive the URL from request headers: the route is unauthenticated.
    let Some(public_url) = state.public_url.as_deref() else {
        warn!("Refusing webhook registration: server.public_url is not configured");
        return (
            StatusCode::BAD_REQUEST,
            "server.public_url must be configured to register the webhook".to_string(),
        );
    };

    let url = match webhook_url(public_url) {
        Ok(url) => url,
        Err(e) => {
            error!("Cannot build webhook URL: {:#}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e));
        }
    };

    match state.registry.register(url, &state.secret_token).await {
        Ok(()) => (StatusCode::OK, "Ok".to_string()),
        Err(e) => {
            error!("Webhook registration failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
        }
    }
}

async fn unregister_webhook(State(state): State<AppState>) -> (StatusCode, String) {
    match state.registry.unregister().await {
        Ok(()) => {
            info!("Webhook removed");
            (StatusCode::OK, "Ok".to_string())
        }
        Err(e) => {
            error!("Webhook removal failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
        }
    }
}

/// `<public_url>/endpoint`
fn webhook_url(public_url: &str) -> Result<Url> {
    let base = public_url.trim_end_matches('/');
    Url::parse(&format!("{}{}", base, WEBHOOK_PATH))
        .with_context(|| format!("Invalid webhook base URL: {}", base))
}

/// Compare the presented secret without an early exit on the first differing byte.
fn secret_matches(presented: Option<&str>, expected: &str) -> bool {
    presented.is_some_and(|p| bool::from(p.as_bytes().ct_eq(expected.as_bytes())))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
