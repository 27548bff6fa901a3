use base64::Engine;
use http::StatusCode;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::cache::token::Credential;
use crate::client::endpoint::ServiceEndpoint;
use crate::config::vendors::AuthConfig;
use crate::errors::VendorError;

/// Login / token endpoint response. Vendors disagree on the token field name.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(alias = "token", alias = "jwt_token")]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    exp: i64,
}

/// Perform the vendor-specific login exchange and return a fresh credential.
pub async fn exchange_credential(http: &Client, endpoint: &ServiceEndpoint, now: i64) -> Result<Credential, VendorError> {
    let url = endpoint.url(endpoint.auth.path());
    let request = match &endpoint.auth {
        AuthConfig::ClientCredentials { client_id, client_secret, .. } => http.post(&url).form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ]),
        AuthConfig::UsernamePassword { username, password, .. } => {
            http.post(&url).json(&json!({ "username": username, "password": password }))
        }
    };

    debug!(service = %endpoint.service, strategy = endpoint.auth.strategy(), "authenticating");
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    parse_token_response(status, &body, endpoint.default_ttl_seconds, now)
}

/// Non-2xx or a body without a token is `AuthFailed`.
///
/// Expiry: `expires_in`, else the JWT `exp` claim, else `default_ttl_seconds`.
pub fn parse_token_response(
    status: StatusCode,
    body: &str,
    default_ttl_seconds: u64,
    now: i64,
) -> Result<Credential, VendorError> {
    let auth_failed = || VendorError::AuthFailed { status, body: body.to_owned() };

    if !status.is_success() {
        return Err(auth_failed());
    }

    let parsed: TokenResponse = serde_json::from_str(body).map_err(|e| {
        warn!("token response is not valid JSON: {}", e);
        auth_failed()
    })?;

    let token = parsed
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(auth_failed)?;

    let default_expiry = offset_from(now, default_ttl_seconds).unwrap_or(i64::MAX);
    let expires_at = match parsed.expires_in.as_ref().and_then(expires_in_seconds) {
        Some(seconds) => offset_from(now, seconds).unwrap_or(default_expiry),
        None => jwt_expiration(&token)
            .filter(|exp| *exp > now)
            .unwrap_or(default_expiry),
    };

    Ok(Credential::new(token, expires_at))
}

/// `now + seconds`, or `None` when it does not fit an i64 timestamp.
fn offset_from(now: i64, seconds: u64) -> Option<i64> {
    i64::try_from(seconds).ok().and_then(|s| now.checked_add(s))
}

fn expires_in_seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `exp` claim of an unverified JWT, if the token is one.
fn jwt_expiration(token: &str) -> Option<i64> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .ok()?;
    serde_json::from_slice::<JwtClaims>(&payload).ok().map(|claims| claims.exp)
}
