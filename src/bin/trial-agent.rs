use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use tracing::{info, warn};

use trial_agent::cache::token_cache::TokenCache;
use trial_agent::cache::token_store::TokenStore;
use trial_agent::client::{AuthenticatedClient, ServiceEndpoint};
use trial_agent::config::settings::SettingsConfig;
use trial_agent::config::vendors::EndpointConfig;
use trial_agent::helpers::time::get_token_safety_margin_seconds;
use trial_agent::orchestrator::Orchestrator;
use trial_agent::server;
use trial_agent::services::{NotificationService, ProvisioningService};
use trial_agent::utils::config_loader;
use trial_agent::utils::constants::{SERVICE_IPTV, SERVICE_MESSAGING};
use trial_agent::utils::logging;
use trial_agent::utils::logging::LogLevel;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "trial-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;

    // -------------------------------
    // 2. Create request client
    // -------------------------------

    let http = &service_config.settings.http;
    let client = Client::builder()
        .connect_timeout(Duration::from_millis(http.connect_timeout_ms))
        .timeout(Duration::from_millis(http.request_timeout_ms))
        .build()
        .context("building http client")?;

    // -------------------------------
    // 3. One authenticated client per vendor, each owning its cache
    // -------------------------------

    let settings = &service_config.settings;
    let iptv = vendor_client(SERVICE_IPTV, &service_config.iptv.endpoint, settings, &client).await;
    let messaging = vendor_client(SERVICE_MESSAGING, &service_config.messaging.endpoint, settings, &client).await;

    // -------------------------------
    // 4. Services and orchestrator
    // -------------------------------

    let provisioning = ProvisioningService::new(iptv, service_config.iptv.trial.clone());
    let notification = NotificationService::new(messaging, service_config.messaging.clone());
    let orchestrator = Arc::new(Orchestrator::new(Arc::new(provisioning), Arc::new(notification)));

    // -------------------------------
    // 5. Start http server with the webhook
    // -------------------------------

    info!("Service starting...");
    server::server::start(settings, orchestrator).await
}

async fn vendor_client(
    service: &str,
    cfg: &EndpointConfig,
    settings: &SettingsConfig,
    http: &Client,
) -> Arc<AuthenticatedClient> {
    let margin = get_token_safety_margin_seconds(settings.safety_margin_seconds, cfg.safety_margin_seconds);
    let cache = TokenCache::new(service, margin);
    let mut client = AuthenticatedClient::new(ServiceEndpoint::from_config(service, cfg), http.clone(), cache)
        .with_auth_retries(settings.auth_retries);

    if let Some(path) = &cfg.token_file {
        client = client.with_token_store(TokenStore::new(path));
        // an unreadable token file only costs one extra login
        if let Err(e) = client.warm_from_store().await {
            warn!(service, "could not warm cache from token file: {:#}", e);
        }
    }
    Arc::new(client)
}
