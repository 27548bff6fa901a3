use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::token::Credential;
use crate::helpers::time::now_i64;

/// Credential cache for a single vendor.
///
/// Every instance is owned by one `AuthenticatedClient`; clones share the same slot.
/// Writes (`set`, `invalidate`) are serialized by the lock, reads never observe a
/// half-replaced credential.
#[derive(Debug, Clone)]
pub struct TokenCache {
    service: Arc<str>,
    safety_margin_seconds: u64,
    inner: Arc<RwLock<Option<Credential>>>,
}

impl TokenCache {
    pub fn new(service: &str, safety_margin_seconds: u64) -> Self {
        Self {
            service: Arc::from(service),
            safety_margin_seconds,
            inner: Arc::new(RwLock::new(None)),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn safety_margin_seconds(&self) -> u64 {
        self.safety_margin_seconds
    }

    /// Cached credential if still valid, `None` when expired, invalidated or never set.
    pub async fn get(&self) -> Option<Credential> {
        self.get_at(now_i64()).await
    }

    /// Same judgment as [`TokenCache::get`] against an explicit instant.
    pub async fn get_at(&self, now: i64) -> Option<Credential> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .filter(|credential| credential.is_valid_at(now, self.safety_margin_seconds))
            .cloned()
    }

    pub async fn set(&self, credential: Credential) {
        debug!(service = %self.service, expires_at = credential.expires_at, "credential cached");
        *self.inner.write().await = Some(credential);
    }

    pub async fn invalidate(&self) {
        debug!(service = %self.service, "credential invalidated");
        *self.inner.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_cache_reports_expired() {
        let cache = TokenCache::new("iptv", 10);
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn boundary_at_expiry_minus_margin() {
        let cache = TokenCache::new("iptv", 30);
        cache.set(Credential::new("tok".into(), 1_000)).await;

        // exactly expires_at - margin => expired
        assert!(cache.get_at(970).await.is_none());
        // one second before => still valid
        let got = cache.get_at(969).await;
        assert_eq!(got.map(|c| c.token), Some("tok".to_string()));
        assert!(cache.get_at(1_000).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_overrides_remaining_lifetime() {
        let cache = TokenCache::new("messaging", 0);
        cache.set(Credential::new("tok".into(), now_i64() + 3_600)).await;
        assert!(cache.get().await.is_some());

        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn set_replaces_previous_credential() {
        let cache = TokenCache::new("messaging", 0);
        let far = now_i64() + 3_600;
        cache.set(Credential::new("first".into(), far)).await;
        cache.set(Credential::new("second".into(), far)).await;
        assert_eq!(cache.get().await.unwrap().token, "second");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_leave_one_whole_credential() {
        let cache = TokenCache::new("iptv", 0);
        let far = now_i64() + 3_600;
        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.set(Credential::new(format!("tok-{i}"), far + i)).await;
                cache.get().await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }
        let last = cache.get().await.unwrap();
        let suffix: i64 = last.token.trim_start_matches("tok-").parse().unwrap();
        assert_eq!(last.expires_at, far + suffix);
    }
}
