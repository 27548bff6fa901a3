use std::collections::HashMap;
use std::fmt::Write;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use regex::Regex;
use tracing::debug;

use crate::config::vendors::MessageConfig;
use crate::services::account::TrialAccount;

pub const PLACEHOLDER_USERNAME: &str = "username";
pub const PLACEHOLDER_PASSWORD: &str = "password";
pub const PLACEHOLDER_EXPIRES_AT: &str = "expires_at";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([a-zA-Z0-9_]+)\s*\}\}").expect("placeholder regex"));

/// Names of every `{{placeholder}}` in `template`.
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace known placeholders; unknown ones are left untouched.
pub fn render_template(template: &str, ctx: &HashMap<&str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures| match ctx.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

pub fn render_credentials_message(account: &TrialAccount, cfg: &MessageConfig) -> String {
    let mut ctx = HashMap::new();
    ctx.insert(PLACEHOLDER_USERNAME, account.username.clone());
    ctx.insert(PLACEHOLDER_PASSWORD, account.password.clone());
    ctx.insert(PLACEHOLDER_EXPIRES_AT, format_expiry(account.expires_at.as_deref(), cfg));
    render_template(&cfg.template, &ctx)
}

/// Human-readable expiry. Never drops the information: an unparseable value is
/// returned verbatim, a missing one becomes `cfg.unknown_expiry`.
pub fn format_expiry(raw: Option<&str>, cfg: &MessageConfig) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return cfg.unknown_expiry.clone();
    };

    let Some(parsed) = parse_vendor_timestamp(raw) else {
        debug!(raw, "expiry not parseable, using raw value");
        return raw.to_string();
    };

    let offset = FixedOffset::east_opt(cfg.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    let local = parsed.with_timezone(&offset);

    let mut out = String::new();
    match write!(out, "{}", local.format(&cfg.expiry_format)) {
        Ok(()) => out,
        Err(_) => raw.to_string(),
    }
}

/// RFC 3339 (with or without `Z`), naive ISO-8601 taken as UTC, or unix seconds.
fn parse_vendor_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }
    raw.parse::<i64>().ok().and_then(|ts| DateTime::from_timestamp(ts, 0))
}
