use serde::{Deserialize, Serialize};

/// Bearer credential plus its absolute expiry.
///
/// Replaced wholesale on re-authentication, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub expires_at: i64, // UNIX TIMESTAMP
}

impl Credential {
    pub fn new(token: String, expires_at: i64) -> Self {
        Self { token, expires_at }
    }

    /// Valid iff `now < expires_at - safety_margin`.
    pub fn is_valid_at(&self, now: i64, safety_margin_seconds: u64) -> bool {
        let margin = i64::try_from(safety_margin_seconds).unwrap_or(i64::MAX);
        now < self.expires_at.saturating_sub(margin)
    }
}
