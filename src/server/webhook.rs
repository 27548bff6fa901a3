use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::settings::WebhookConfig;
use crate::observability::metrics::get_metrics;
use crate::orchestrator::{Orchestrator, ProvisioningResult};
use crate::server::server::AppState;
use crate::services::phone::is_valid_phone;

static STATUS_SUCCESS: &str = "success";
static STATUS_ERROR: &str = "error";
static STATUS_IGNORED: &str = "ignored";

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub phone: Option<String>,
    /// chatbot message text, matched against the trigger keyword
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: String,
    pub message: String,
}

#[derive(Clone)]
pub struct WebhookState {
    orchestrator: Arc<Orchestrator>,
    cfg: Arc<WebhookConfig>,
}

impl WebhookState {
    pub fn new(orchestrator: Arc<Orchestrator>, cfg: WebhookConfig) -> Self {
        Self { orchestrator, cfg: Arc::new(cfg) }
    }

    pub fn router(&self) -> Router<AppState> {
        info!("served path: {}", &self.cfg.path);
        Router::new()
            .route(self.cfg.path.as_str(), post(handle_webhook))
            .route("/", get(health))
    }

    /// True when the request should go through. No keyword configured, or no
    /// message in the body, always passes.
    pub fn is_triggered(&self, message: Option<&str>) -> bool {
        match (self.cfg.trigger_keyword.as_deref(), message) {
            (Some(keyword), Some(message)) => message.trim().eq_ignore_ascii_case(keyword.trim()),
            _ => true,
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "online" }))
}

async fn handle_webhook(
    State(state): State<AppState>,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Response {
    let webhook = &state.webhook_state;

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("malformed webhook body: {}", rejection.body_text());
            return reply(StatusCode::BAD_REQUEST, STATUS_ERROR, "invalid request body").await;
        }
    };

    let phone = request.phone.unwrap_or_default();

    // a missing phone is a 400 even when the message would be ignored
    if is_valid_phone(&phone) && !webhook.is_triggered(request.message.as_deref()) {
        info!(message = ?request.message, "message does not match trigger keyword, ignoring");
        return reply(StatusCode::OK, STATUS_IGNORED, "message does not trigger a trial").await;
    }

    let result = webhook.orchestrator.handle_trial_request(&phone).await;
    let (status, label, message) = describe(&result);
    reply(status, label, message).await
}

/// HTTP status, response status label and the short message returned to the caller.
pub fn describe(result: &ProvisioningResult) -> (StatusCode, &'static str, &'static str) {
    match result {
        ProvisioningResult::Success(_) => (StatusCode::OK, STATUS_SUCCESS, "trial created and credentials sent"),
        ProvisioningResult::InvalidInput(_) => (StatusCode::BAD_REQUEST, STATUS_ERROR, "phone number is required"),
        ProvisioningResult::ProvisioningFailed(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, STATUS_ERROR, "could not create the trial")
        }
        ProvisioningResult::DeliveryFailed(_, _) => {
            (StatusCode::INTERNAL_SERVER_ERROR, STATUS_ERROR, "trial created but the credentials could not be sent")
        }
    }
}

async fn reply(status: StatusCode, label: &str, message: &str) -> Response {
    get_metrics().await.webhook_responses.with_label_values(&[status.as_str()]).inc();
    let body = WebhookResponse { status: label.to_string(), message: message.to_string() };
    (status, Json(body)).into_response()
}
