use chrono::Utc;
use tokio::time::Instant;

use crate::utils::constants::DEFAULT_SAFETY_MARGIN_SECS;

pub fn get_token_safety_margin_seconds(
    safety_margin_seconds_settings: Option<u64>,
    safety_margin_seconds_vendor: Option<u64>,
) -> u64 {
    // vendor level
    safety_margin_seconds_vendor
        // settings (global) level
        .or(safety_margin_seconds_settings)
        .unwrap_or(DEFAULT_SAFETY_MARGIN_SECS)
}

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}
