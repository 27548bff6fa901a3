use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::orchestrator::Orchestrator;
use crate::server::webhook::WebhookState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub webhook_state: WebhookState,
}

impl AppState {
    pub fn new(metrics: &Metrics, orchestrator: Arc<Orchestrator>, settings: &SettingsConfig) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            webhook_state: WebhookState::new(orchestrator, settings.webhook.clone()),
        }
    }
}

/// Webhook, health and (when enabled) metrics routes on one router.
pub fn build_router(state: AppState, settings: &SettingsConfig) -> Router {
    Router::new()
        .merge(state.metrics_state.router(&settings.metrics))
        .merge(state.webhook_state.router())
        .with_state(state)
}

/// Serve until SIGINT / SIGTERM, letting in-flight trial requests finish.
pub async fn start(settings: &SettingsConfig, orchestrator: Arc<Orchestrator>) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, orchestrator, settings);
    let app = build_router(state, settings);

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!(address = %bind_addr, webhook = %settings.webhook.path, "server listening");

    metrics.up.set(1);
    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;
    metrics.up.set(0);

    served.context("http server failed")
}

async fn shutdown_signal() {
    let (mut sigint, mut sigterm) = match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        _ => {
            // fall back to ctrl-c only
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C. Initiating graceful shutdown...");
            return;
        }
    };
    tokio::select! {
        _ = sigint.recv() => info!("Received SIGINT (Ctrl+C). Initiating graceful shutdown..."),
        _ = sigterm.recv() => info!("Received SIGTERM. Initiating graceful shutdown..."),
    }
}
