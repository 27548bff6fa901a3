use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::DEFAULT_COUNTRY_CODE;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub iptv: IptvConfig,
    pub messaging: MessagingConfig,
}

/// ================================
/// Vendor endpoint + authentication
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointConfig {
    pub base_url: String,
    pub auth: AuthConfig,
    /// overrides settings.safety_margin_seconds for this vendor
    pub safety_margin_seconds: Option<u64>,
    /// lifetime assumed when the login response carries neither expires_in nor a JWT exp
    pub default_ttl_seconds: Option<u64>,
    /// absolute path; when set the credential survives restarts
    pub token_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// OAuth2 client-credentials form exchange
    ClientCredentials {
        #[serde(default = "default_token_path")]
        token_path: String,
        client_id: String,
        client_secret: String,
    },
    /// JSON username/password login
    UsernamePassword {
        #[serde(default = "default_login_path")]
        login_path: String,
        username: String,
        password: String,
    },
}

impl AuthConfig {
    pub fn path(&self) -> &str {
        match self {
            AuthConfig::ClientCredentials { token_path, .. } => token_path,
            AuthConfig::UsernamePassword { login_path, .. } => login_path,
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            AuthConfig::ClientCredentials { .. } => "client_credentials",
            AuthConfig::UsernamePassword { .. } => "username_password",
        }
    }
}

/// ================================
/// IPTV panel
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct IptvConfig {
    #[serde(flatten)]
    pub endpoint: EndpointConfig,
    pub trial: TrialConfig,
}

/// Static trial-creation payload; nothing here is derived from the request.
#[derive(Debug, Deserialize, Clone)]
pub struct TrialConfig {
    #[serde(default = "default_trial_path")]
    pub path: String,
    pub package_p2p: String,
    #[serde(default = "default_krator_package")]
    pub krator_package: String,
    pub package_iptv: u32,
    #[serde(default = "default_test_duration_hours")]
    pub test_duration_hours: u32,
}

/// ================================
/// Messaging (WhatsApp bot)
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct MessagingConfig {
    #[serde(flatten)]
    pub endpoint: EndpointConfig,
    pub bot_id: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    #[serde(default)]
    pub contacts: ContactPathsConfig,
    #[serde(default)]
    pub message: MessageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContactPathsConfig {
    #[serde(default = "default_search_path")]
    pub search_path: String,
    #[serde(default = "default_create_path")]
    pub create_path: String,
    #[serde(default = "default_send_path")]
    pub send_path: String,
}

impl Default for ContactPathsConfig {
    fn default() -> Self {
        Self {
            search_path: default_search_path(),
            create_path: default_create_path(),
            send_path: default_send_path(),
        }
    }
}

/// Credentials message. Placeholders: {{username}}, {{password}}, {{expires_at}}.
#[derive(Debug, Deserialize, Clone)]
pub struct MessageConfig {
    #[serde(default = "default_template")]
    pub template: String,
    /// chrono strftime pattern
    #[serde(default = "default_expiry_format")]
    pub expiry_format: String,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_unknown_expiry")]
    pub unknown_expiry: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            expiry_format: default_expiry_format(),
            utc_offset_minutes: 0,
            unknown_expiry: default_unknown_expiry(),
        }
    }
}

fn default_token_path() -> String {
    "/oauth/access_token".to_string()
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_trial_path() -> String {
    "/lines/test".to_string()
}

fn default_krator_package() -> String {
    "1".to_string()
}

fn default_test_duration_hours() -> u32 {
    4
}

fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}

fn default_search_path() -> String {
    "/whatsapp/contacts/getByPhone".to_string()
}

fn default_create_path() -> String {
    "/whatsapp/contacts".to_string()
}

fn default_send_path() -> String {
    "/whatsapp/contacts/send".to_string()
}

fn default_template() -> String {
    "*Your IPTV trial credentials*\n\nUsername: *{{username}}*\nPassword: *{{password}}*\nExpires: {{expires_at}}\n\nThanks for trying our service!".to_string()
}

fn default_expiry_format() -> String {
    "%d/%m/%Y %H:%M".to_string()
}

fn default_unknown_expiry() -> String {
    "in a few hours".to_string()
}
