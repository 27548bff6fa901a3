//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15000;
/// Fallback credential lifetime when the vendor reports none.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
/// Re-authenticate + replay attempts after a 401/403. Never more than this.
pub const MAX_AUTH_RETRIES: u32 = 1;

// Vendor names, used as cache keys, log fields and metric labels
pub const SERVICE_IPTV: &str = "iptv";
pub const SERVICE_MESSAGING: &str = "messaging";

pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook/iptv-trial";
pub const DEFAULT_COUNTRY_CODE: &str = "55";
