use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::{ApiRequest, AuthenticatedClient};
use crate::config::vendors::TrialConfig;
use crate::errors::VendorError;
use crate::orchestrator::TrialProvisioner;
use crate::services::account::TrialAccount;
use crate::services::phone::trial_tag;

/// `POST <trial path>` response. Panels send numbers for some of these.
#[derive(Debug, Deserialize)]
struct CreatedLine {
    #[serde(default)]
    username: Option<Value>,
    #[serde(default)]
    password: Option<Value>,
    #[serde(default)]
    exp_date: Option<Value>,
}

/// Creates trial lines on the IPTV panel.
///
/// Not idempotent: the panel opens a new line on every call, the phone tag only
/// lands in `notes` for later auditing.
pub struct ProvisioningService {
    client: Arc<AuthenticatedClient>,
    trial: TrialConfig,
}

impl ProvisioningService {
    pub fn new(client: Arc<AuthenticatedClient>, trial: TrialConfig) -> Self {
        Self { client, trial }
    }

    pub fn trial_payload(&self, tag: &str) -> Value {
        json!({
            "notes": tag,
            "package_p2p": self.trial.package_p2p,
            "krator_package": self.trial.krator_package,
            "package_iptv": self.trial.package_iptv,
            "testDuration": self.trial.test_duration_hours,
        })
    }

    pub async fn create_trial(&self, phone: &str) -> Result<TrialAccount, VendorError> {
        let tag = trial_tag(phone);
        let request = ApiRequest::post_json(&self.trial.path, self.trial_payload(&tag));

        let response = self.client.execute(&request).await.inspect_err(|e| {
            warn!(tag = %tag, error = %e, "trial creation failed before the panel answered");
        })?;

        if !response.is_ok_or_created() {
            warn!(tag = %tag, status = %response.status, body = %response.body, "panel rejected trial creation");
            return Err(response.rejected());
        }

        let line: CreatedLine = response.json()?;
        let username = required_field(line.username, "username")?;
        let password = required_field(line.password, "password")?;
        let expires_at = line.exp_date.and_then(value_to_string);

        info!(tag = %tag, username = %username, expires_at = ?expires_at, "trial line created");
        Ok(TrialAccount { username, password, expires_at, source_identifier: tag })
    }
}

#[async_trait]
impl TrialProvisioner for ProvisioningService {
    async fn create_trial(&self, phone: &str) -> Result<TrialAccount, VendorError> {
        ProvisioningService::create_trial(self, phone).await
    }
}

fn required_field(value: Option<Value>, name: &str) -> Result<String, VendorError> {
    value
        .and_then(value_to_string)
        .ok_or_else(|| VendorError::MalformedResponse(format!("missing '{}' in trial response", name)))
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_fields_normalize_to_strings() {
        assert_eq!(value_to_string(json!("abc")), Some("abc".to_string()));
        assert_eq!(value_to_string(json!(1735689600)), Some("1735689600".to_string()));
        assert_eq!(value_to_string(json!("")), None);
        assert_eq!(value_to_string(Value::Null), None);
        assert_eq!(value_to_string(json!({"a": 1})), None);
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let err = required_field(None, "password").unwrap_err();
        assert_eq!(err, VendorError::MalformedResponse("missing 'password' in trial response".into()));
    }
}
