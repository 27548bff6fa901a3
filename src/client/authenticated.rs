use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::token::Credential;
use crate::cache::token_cache::TokenCache;
use crate::cache::token_store::TokenStore;
use crate::client::auth::exchange_credential;
use crate::client::endpoint::ServiceEndpoint;
use crate::client::request::{ApiRequest, ApiResponse};
use crate::errors::VendorError;
use crate::helpers::time::{get_instant, now_i64};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::MAX_AUTH_RETRIES;

static TRANSPORT_ERROR_MSG: &str = "transport_error";

/// HTTP client bound to one vendor, owning that vendor's credential cache.
///
/// Authentication is lazy: nothing goes over the wire until the first [`execute`].
/// A 401/403 triggers one invalidate + re-authenticate + replay; a second rejection
/// is returned as [`VendorError::AuthFailed`].
///
/// [`execute`]: AuthenticatedClient::execute
pub struct AuthenticatedClient {
    endpoint: Arc<ServiceEndpoint>,
    http: Client,
    cache: TokenCache,
    store: Option<TokenStore>,
    // serializes logins so concurrent callers reuse one fresh credential
    refresh: Mutex<()>,
    auth_retries: u32,
}

impl AuthenticatedClient {
    pub fn new(endpoint: ServiceEndpoint, http: Client, cache: TokenCache) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            http,
            cache,
            store: None,
            refresh: Mutex::new(()),
            auth_retries: MAX_AUTH_RETRIES,
        }
    }

    pub fn with_token_store(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Clamped to `1..=MAX_AUTH_RETRIES`; the replay after a 401/403 cannot be turned off.
    pub fn with_auth_retries(mut self, auth_retries: u32) -> Self {
        self.auth_retries = auth_retries.clamp(1, MAX_AUTH_RETRIES);
        self
    }

    pub fn service(&self) -> &str {
        &self.endpoint.service
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Load a persisted credential into the cache. Returns true when it was still valid.
    pub async fn warm_from_store(&self) -> Result<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        match store.load().await? {
            Some(credential) if credential.is_valid_at(now_i64(), self.cache.safety_margin_seconds()) => {
                info!(service = %self.service(), expires_at = credential.expires_at, "cache warmed from token file");
                self.cache.set(credential).await;
                Ok(true)
            }
            Some(_) => {
                info!(service = %self.service(), "persisted token expired, ignoring");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Log in now and cache the resulting credential.
    pub async fn authenticate(&self) -> Result<Credential, VendorError> {
        let _guard = self.refresh.lock().await;
        self.login().await
    }

    /// Send `request` with a bearer credential, recovering one authorization failure.
    ///
    /// Statuses other than 401/403 are returned as-is; interpreting them belongs to the caller.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, VendorError> {
        let mut credential = self.ensure_credential().await?;
        let mut attempt = 0;

        loop {
            let response = self.send(request, &credential).await?;
            if !response.is_auth_failure() {
                return Ok(response);
            }

            if attempt >= self.auth_retries {
                warn!(
                    service = %self.service(),
                    status = %response.status,
                    path = %request.path,
                    "authorization rejected after re-authentication, giving up"
                );
                return Err(VendorError::AuthFailed { status: response.status, body: response.body });
            }

            attempt += 1;
            info!(
                service = %self.service(),
                status = %response.status,
                path = %request.path,
                "authorization rejected, re-authenticating and replaying"
            );
            get_metrics().await.auth_retries.with_label_values(&[self.service()]).inc();
            credential = self.refresh_rejected(&credential).await?;
        }
    }

    async fn ensure_credential(&self) -> Result<Credential, VendorError> {
        if let Some(credential) = self.cache.get().await {
            return Ok(credential);
        }
        let _guard = self.refresh.lock().await;
        // another caller may have logged in while we waited
        if let Some(credential) = self.cache.get().await {
            return Ok(credential);
        }
        self.login().await
    }

    async fn refresh_rejected(&self, rejected: &Credential) -> Result<Credential, VendorError> {
        let _guard = self.refresh.lock().await;
        if let Some(current) = self.cache.get().await {
            if current.token != rejected.token {
                debug!(service = %self.service(), "credential already refreshed by a concurrent request");
                return Ok(current);
            }
        }
        self.cache.invalidate().await;
        self.login().await
    }

    // caller holds `refresh`
    async fn login(&self) -> Result<Credential, VendorError> {
        let metrics = get_metrics().await;
        let result = exchange_credential(&self.http, &self.endpoint, now_i64()).await;
        match result {
            Ok(credential) => {
                metrics.auth_exchanges.with_label_values(&[self.service(), "success"]).inc();
                info!(service = %self.service(), expires_at = credential.expires_at, "authenticated");
                self.cache.set(credential.clone()).await;
                if let Some(store) = &self.store {
                    if let Err(e) = store.save(&credential).await {
                        warn!(service = %self.service(), "failed to persist token: {:#}", e);
                    }
                }
                Ok(credential)
            }
            Err(err) => {
                metrics.auth_exchanges.with_label_values(&[self.service(), err.kind()]).inc();
                warn!(service = %self.service(), error = %err, "authentication failed");
                Err(err)
            }
        }
    }

    async fn send(&self, request: &ApiRequest, credential: &Credential) -> Result<ApiResponse, VendorError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        let url = self.endpoint.url(&request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .bearer_auth(&credential.token);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let outcome = async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(ApiResponse { status, body })
        }
        .await;

        metrics
            .vendor_request_duration
            .with_label_values(&[self.service()])
            .observe(start.elapsed().as_secs_f64());

        match outcome {
            Ok(response) => {
                metrics
                    .vendor_requests
                    .with_label_values(&[self.service(), response.status.as_str()])
                    .inc();
                debug!(service = %self.service(), method = %request.method, url = %url, status = %response.status, "vendor responded");
                Ok(response)
            }
            Err(e) => {
                metrics
                    .vendor_requests
                    .with_label_values(&[self.service(), TRANSPORT_ERROR_MSG])
                    .inc();
                warn!(service = %self.service(), method = %request.method, url = %url, "vendor request failed: {}", e);
                Err(VendorError::TransportError(e.to_string()))
            }
        }
    }
}
