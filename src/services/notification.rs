use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::client::{ApiRequest, AuthenticatedClient};
use crate::config::vendors::MessagingConfig;
use crate::errors::VendorError;
use crate::orchestrator::CredentialNotifier;
use crate::services::account::{DeliveryRequest, TrialAccount};
use crate::services::message::render_credentials_message;
use crate::services::phone::normalize_phone;

/// Contact lookup / creation response: `{"success": true, "data": {"id": "..."}}`.
#[derive(Debug, Deserialize)]
struct ContactEnvelope {
    #[serde(default)]
    data: Option<ContactData>,
}

#[derive(Debug, Deserialize)]
struct ContactData {
    #[serde(default)]
    id: Option<String>,
}

/// Delivers trial credentials through the WhatsApp bot.
pub struct NotificationService {
    client: Arc<AuthenticatedClient>,
    cfg: MessagingConfig,
}

impl NotificationService {
    pub fn new(client: Arc<AuthenticatedClient>, cfg: MessagingConfig) -> Self {
        Self { client, cfg }
    }

    pub fn delivery_request(&self, phone: &str, account: &TrialAccount) -> DeliveryRequest {
        DeliveryRequest {
            destination_phone: normalize_phone(phone, &self.cfg.country_code),
            rendered_message: render_credentials_message(account, &self.cfg.message),
        }
    }

    pub async fn deliver(&self, phone: &str, account: &TrialAccount) -> Result<(), VendorError> {
        let delivery = self.delivery_request(phone, account);
        let contact_id = self.resolve_contact(&delivery.destination_phone).await?;

        let request = ApiRequest::post_json(
            &self.cfg.contacts.send_path,
            json!({
                "bot_id": self.cfg.bot_id,
                "contact_id": contact_id,
                "message": {
                    "type": "text",
                    "text": { "body": delivery.rendered_message },
                },
            }),
        );
        let response = self.client.execute(&request).await?;
        if !response.is_ok_or_created() {
            warn!(phone = %delivery.destination_phone, status = %response.status, body = %response.body, "message rejected");
            return Err(response.rejected());
        }

        info!(phone = %delivery.destination_phone, contact_id = %contact_id, "credentials delivered");
        Ok(())
    }

    /// Search by phone, create when absent. Two concurrent first-time deliveries may
    /// both create a contact; the duplicate is harmless.
    pub async fn resolve_contact(&self, phone: &str) -> Result<String, VendorError> {
        let search = ApiRequest::get(&self.cfg.contacts.search_path)
            .with_query("phone", phone)
            .with_query("bot_id", &self.cfg.bot_id);
        let response = self.client.execute(&search).await?;

        if response.status == StatusCode::NOT_FOUND {
            debug!(phone, "contact not found");
            return self.create_contact(phone).await;
        }
        if !response.status.is_success() {
            return Err(response.rejected());
        }

        let existing = if response.body.trim().is_empty() {
            None
        } else {
            response.json::<ContactEnvelope>()?.data.and_then(|d| d.id)
        };

        match existing {
            Some(id) => {
                debug!(phone, contact_id = %id, "contact found");
                Ok(id)
            }
            None => self.create_contact(phone).await,
        }
    }

    async fn create_contact(&self, phone: &str) -> Result<String, VendorError> {
        let request = ApiRequest::post_json(
            &self.cfg.contacts.create_path,
            json!({ "bot_id": self.cfg.bot_id, "phone": phone }),
        );
        let response = self.client.execute(&request).await?;
        if !response.is_ok_or_created() {
            return Err(response.rejected());
        }

        let id = response
            .json::<ContactEnvelope>()?
            .data
            .and_then(|d| d.id)
            .ok_or_else(|| VendorError::MalformedResponse("contact created without id".to_string()))?;
        info!(phone, contact_id = %id, "contact created");
        Ok(id)
    }
}

#[async_trait]
impl CredentialNotifier for NotificationService {
    async fn deliver(&self, phone: &str, account: &TrialAccount) -> Result<(), VendorError> {
        NotificationService::deliver(self, phone, account).await
    }
}
