use crate::config::vendors::{AuthConfig, EndpointConfig};
use crate::utils::constants::DEFAULT_TOKEN_TTL_SECS;

/// Where a vendor lives and how to log into it.
///
/// Built once at startup and shared read-only by every request to that vendor.
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    pub service: String,
    pub base_url: String,
    pub auth: AuthConfig,
    pub default_ttl_seconds: u64,
}

impl ServiceEndpoint {
    pub fn new(service: &str, base_url: &str, auth: AuthConfig) -> Self {
        Self {
            service: service.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth,
            default_ttl_seconds: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    pub fn from_config(service: &str, cfg: &EndpointConfig) -> Self {
        let mut endpoint = Self::new(service, &cfg.base_url, cfg.auth.clone());
        if let Some(ttl) = cfg.default_ttl_seconds {
            endpoint.default_ttl_seconds = ttl;
        }
        endpoint
    }

    pub fn with_default_ttl(mut self, ttl_seconds: u64) -> Self {
        self.default_ttl_seconds = ttl_seconds;
        self
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig::ClientCredentials {
            token_path: "/oauth/access_token".into(),
            client_id: "id".into(),
            client_secret: "secret".into(),
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        let endpoint = ServiceEndpoint::new("messaging", "https://api.example.com/", auth());
        assert_eq!(endpoint.url("/oauth/access_token"), "https://api.example.com/oauth/access_token");
        assert_eq!(endpoint.url("lines/test"), "https://api.example.com/lines/test");
        assert_eq!(endpoint.default_ttl_seconds, DEFAULT_TOKEN_TTL_SECS);
    }
}
