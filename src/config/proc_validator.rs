//! Configuration validation with aggregated errors.
//! Every issue found is collected into `Vec<String>` so a broken deployment is fixed
//! in one pass instead of one error per restart.

use std::path::Path;

use reqwest::Url;
use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::vendors::{AuthConfig, EndpointConfig, IptvConfig, MessagingConfig, ServiceConfig};
use crate::observability::metrics::get_metrics;
use crate::services::message::{placeholders, PLACEHOLDER_EXPIRES_AT, PLACEHOLDER_PASSWORD, PLACEHOLDER_USERNAME};
use crate::utils::constants::MAX_AUTH_RETRIES;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_iptv(&cfg.iptv, &mut errors);
    validate_messaging(&cfg.messaging, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if !(1..=MAX_AUTH_RETRIES).contains(&settings.auth_retries) {
        errors.push(format!(
            "settings.auth_retries ({}) must be between 1 and {}",
            settings.auth_retries, MAX_AUTH_RETRIES
        ));
    }

    if let Some(s) = settings.safety_margin_seconds {
        if s > 60 * 60 * 24 {
            errors.push(format!(
                "settings.safety_margin_seconds ({}) is unreasonably large",
                s
            ));
        }
    }

    if settings.http.connect_timeout_ms == 0 {
        errors.push("settings.http.connect_timeout_ms must be > 0".to_string());
    }
    if settings.http.request_timeout_ms == 0 {
        errors.push("settings.http.request_timeout_ms must be > 0".to_string());
    }

    if settings.server.host.is_empty() {
        errors.push(format!(
            "settings.server.host '{}' must be valid",
            settings.server.host
        ));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be a valid port",
            settings.server.port
        ));
    }

    validate_route("settings.webhook.path", &settings.webhook.path, errors);
    if settings.metrics.is_enabled {
        validate_route("settings.metrics.path", &settings.metrics.path, errors);
        if settings.metrics.path == settings.webhook.path {
            errors.push(format!(
                "settings.metrics.path and settings.webhook.path both use '{}'",
                settings.metrics.path
            ));
        }
    }
    if settings.webhook.path == "/" {
        errors.push("settings.webhook.path '/' collides with the health route".to_string());
    }

    if let Some(keyword) = &settings.webhook.trigger_keyword {
        if keyword.trim().is_empty() {
            errors.push("settings.webhook.trigger_keyword must not be blank when set".to_string());
        }
    }

    if let Some(logging) = &settings.logging {
        let level = logging.level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of trace, debug, info, warn, error",
                logging.level
            ));
        }
    }
}

/// IPTV VALIDATION
fn validate_iptv(iptv: &IptvConfig, errors: &mut Vec<String>) {
    validate_endpoint("iptv", &iptv.endpoint, errors);
    validate_route("iptv.trial.path", &iptv.trial.path, errors);
    if iptv.trial.package_p2p.trim().is_empty() {
        errors.push("iptv.trial.package_p2p must not be empty".to_string());
    }
    if iptv.trial.test_duration_hours == 0 {
        errors.push("iptv.trial.test_duration_hours must be > 0".to_string());
    }
}

/// MESSAGING VALIDATION
fn validate_messaging(messaging: &MessagingConfig, errors: &mut Vec<String>) {
    validate_endpoint("messaging", &messaging.endpoint, errors);

    if messaging.bot_id.trim().is_empty() {
        errors.push("messaging.bot_id must not be empty".to_string());
    }
    if messaging.country_code.is_empty()
        || !messaging.country_code.chars().all(|c| c.is_ascii_digit())
    {
        errors.push(format!(
            "messaging.country_code '{}' must contain digits only",
            messaging.country_code
        ));
    }

    validate_route("messaging.contacts.search_path", &messaging.contacts.search_path, errors);
    validate_route("messaging.contacts.create_path", &messaging.contacts.create_path, errors);
    validate_route("messaging.contacts.send_path", &messaging.contacts.send_path, errors);

    validate_template(&messaging.message.template, errors);
    if messaging.message.utc_offset_minutes.abs() >= 24 * 60 {
        errors.push(format!(
            "messaging.message.utc_offset_minutes ({}) must be within one day",
            messaging.message.utc_offset_minutes
        ));
    }
}

fn validate_template(template: &str, errors: &mut Vec<String>) {
    let found = placeholders(template);
    for required in [PLACEHOLDER_USERNAME, PLACEHOLDER_PASSWORD] {
        if !found.iter().any(|p| p == required) {
            errors.push(format!(
                "messaging.message.template must contain {{{{{}}}}}",
                required
            ));
        }
    }
    for unknown in found
        .iter()
        .filter(|p| ![PLACEHOLDER_USERNAME, PLACEHOLDER_PASSWORD, PLACEHOLDER_EXPIRES_AT].contains(&p.as_str()))
    {
        errors.push(format!(
            "messaging.message.template has unknown placeholder {{{{{}}}}}",
            unknown
        ));
    }
}

fn validate_endpoint(prefix: &str, endpoint: &EndpointConfig, errors: &mut Vec<String>) {
    match Url::parse(&endpoint.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "{}.base_url '{}' has unsupported scheme '{}'",
            prefix,
            endpoint.base_url,
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "{}.base_url '{}' is not a valid URL: {}",
            prefix, endpoint.base_url, e
        )),
    }

    if endpoint.default_ttl_seconds == Some(0) {
        errors.push(format!("{}.default_ttl_seconds must be > 0", prefix));
    }

    if let Some(token_file) = &endpoint.token_file {
        if !Path::new(token_file).is_absolute() {
            errors.push(format!(
                "{}.token_file '{}' must be an absolute path, relative paths are not allowed",
                prefix, token_file
            ));
        }
    }

    validate_route(&format!("{}.auth.path", prefix), endpoint.auth.path(), errors);
    match &endpoint.auth {
        AuthConfig::ClientCredentials { client_id, client_secret, .. } => {
            if client_id.trim().is_empty() {
                errors.push(format!("{}.auth.client_id must not be empty", prefix));
            }
            if client_secret.trim().is_empty() {
                errors.push(format!("{}.auth.client_secret must not be empty", prefix));
            }
        }
        AuthConfig::UsernamePassword { username, password, .. } => {
            if username.trim().is_empty() {
                errors.push(format!("{}.auth.username must not be empty", prefix));
            }
            if password.is_empty() {
                errors.push(format!("{}.auth.password must not be empty", prefix));
            }
        }
    }
}

fn validate_route(field: &str, path: &str, errors: &mut Vec<String>) {
    if !path.starts_with('/') {
        errors.push(format!("{} '{}' must start with '/'", field, path));
    }
}
