// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::cache::token_cache::TokenCache;
use crate::client::{AuthenticatedClient, ServiceEndpoint};
use crate::config::vendors::{AuthConfig, ContactPathsConfig, EndpointConfig, MessageConfig, MessagingConfig, TrialConfig};
use crate::orchestrator::Orchestrator;
use crate::services::{NotificationService, ProvisioningService};
use crate::utils::constants::{SERVICE_IPTV, SERVICE_MESSAGING};

pub const IPTV_LOGIN_PATH: &str = "/auth/login";
pub const MESSAGING_TOKEN_PATH: &str = "/oauth/access_token";
pub const BOT_ID: &str = "bot-1";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    build_reqwest_client_with_timeout(Duration::from_secs(5))
}

pub fn build_reqwest_client_with_timeout(timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(2))
        .timeout(timeout)
        .build()
        .expect("reqwest client")
}

pub fn iptv_auth() -> AuthConfig {
    AuthConfig::UsernamePassword {
        login_path: IPTV_LOGIN_PATH.into(),
        username: "reseller".into(),
        password: "secret".into(),
    }
}

pub fn messaging_auth() -> AuthConfig {
    AuthConfig::ClientCredentials {
        token_path: MESSAGING_TOKEN_PATH.into(),
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
    }
}

pub fn vendor_client(service: &str, base_url: &str, auth: AuthConfig, http: &Client) -> AuthenticatedClient {
    AuthenticatedClient::new(ServiceEndpoint::new(service, base_url, auth), http.clone(), TokenCache::new(service, 30))
}

pub fn trial_config() -> TrialConfig {
    TrialConfig {
        path: "/lines/test".into(),
        package_p2p: "p2p-1".into(),
        krator_package: "1".into(),
        package_iptv: 95,
        test_duration_hours: 4,
    }
}

pub fn messaging_config(base_url: &str) -> MessagingConfig {
    MessagingConfig {
        endpoint: EndpointConfig {
            base_url: base_url.into(),
            auth: messaging_auth(),
            safety_margin_seconds: None,
            default_ttl_seconds: None,
            token_file: None,
        },
        bot_id: BOT_ID.into(),
        country_code: "55".into(),
        contacts: ContactPathsConfig::default(),
        message: MessageConfig::default(),
    }
}

/// Real services against the given vendor base URLs.
pub fn orchestrator(iptv_base: &str, messaging_base: &str, http: &Client) -> Orchestrator {
    let iptv = Arc::new(vendor_client(SERVICE_IPTV, iptv_base, iptv_auth(), http));
    let messaging = Arc::new(vendor_client(SERVICE_MESSAGING, messaging_base, messaging_auth(), http));
    Orchestrator::new(
        Arc::new(ProvisioningService::new(iptv, trial_config())),
        Arc::new(NotificationService::new(messaging, messaging_config(messaging_base))),
    )
}
