use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::errors::VendorError;
use crate::observability::metrics::get_metrics;
use crate::services::account::TrialAccount;
use crate::services::phone::{is_valid_phone, trial_tag};

#[async_trait]
pub trait TrialProvisioner: Send + Sync {
    async fn create_trial(&self, phone: &str) -> Result<TrialAccount, VendorError>;
}

#[async_trait]
pub trait CredentialNotifier: Send + Sync {
    async fn deliver(&self, phone: &str, account: &TrialAccount) -> Result<(), VendorError>;
}

/// Outcome reported to the webhook caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningResult {
    Success(TrialAccount),
    InvalidInput(String),
    ProvisioningFailed(VendorError),
    /// The account exists on the panel; it is carried here so it is never lost.
    DeliveryFailed(TrialAccount, VendorError),
}

impl ProvisioningResult {
    pub fn outcome(&self) -> &'static str {
        match self {
            ProvisioningResult::Success(_) => "success",
            ProvisioningResult::InvalidInput(_) => "invalid_input",
            ProvisioningResult::ProvisioningFailed(_) => "provisioning_failed",
            ProvisioningResult::DeliveryFailed(_, _) => "delivery_failed",
        }
    }

    pub fn account(&self) -> Option<&TrialAccount> {
        match self {
            ProvisioningResult::Success(account) | ProvisioningResult::DeliveryFailed(account, _) => Some(account),
            _ => None,
        }
    }
}

/// Provision, then deliver. Strictly sequential, no retries across the two steps.
#[derive(Clone)]
pub struct Orchestrator {
    provisioner: Arc<dyn TrialProvisioner>,
    notifier: Arc<dyn CredentialNotifier>,
}

impl Orchestrator {
    pub fn new(provisioner: Arc<dyn TrialProvisioner>, notifier: Arc<dyn CredentialNotifier>) -> Self {
        Self { provisioner, notifier }
    }

    pub async fn handle_trial_request(&self, phone: &str) -> ProvisioningResult {
        let result = self.run(phone).await;
        get_metrics().await.trial_outcomes.with_label_values(&[result.outcome()]).inc();
        result
    }

    async fn run(&self, phone: &str) -> ProvisioningResult {
        if !is_valid_phone(phone) {
            warn!(phone, "rejecting trial request without a usable phone number");
            return ProvisioningResult::InvalidInput("phone number is missing or has no digits".to_string());
        }

        let tag = trial_tag(phone);
        info!(tag = %tag, "trial requested");

        let account = match self.provisioner.create_trial(phone).await {
            Ok(account) => account,
            Err(e) => {
                error!(tag = %tag, error = %e, kind = e.kind(), "provisioning failed");
                return ProvisioningResult::ProvisioningFailed(e);
            }
        };

        match self.notifier.deliver(phone, &account).await {
            Ok(()) => {
                info!(tag = %tag, username = %account.username, "trial provisioned and delivered");
                ProvisioningResult::Success(account)
            }
            Err(e) => {
                // no vendor call deletes a line, so the account stays and is surfaced
                error!(
                    tag = %tag,
                    phone,
                    username = %account.username,
                    password = %account.password,
                    expires_at = ?account.expires_at,
                    error = %e,
                    kind = e.kind(),
                    "trial created but delivery failed, manual follow-up required"
                );
                ProvisioningResult::DeliveryFailed(account, e)
            }
        }
    }
}
