//! # Trial Agent Library
//!
//! Provisions IPTV trial lines and delivers the credentials over a WhatsApp bot,
//! keeping a self-refreshing bearer credential for each vendor.
//!
//! Modules:
//! - `config`: service configuration, loading and validation
//! - `cache`: per-vendor credential cache and its on-disk copy
//! - `client`: authenticated vendor HTTP client
//! - `services`: trial provisioning and credential delivery
//! - `orchestrator`: provision-then-deliver flow behind the webhook
//! - `server`: webhook, health and metrics routes

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod observability;
pub mod orchestrator;
pub mod server;
pub mod services;
pub mod tests;
pub mod utils;

pub use crate::config::vendors::ServiceConfig;
pub use crate::errors::VendorError;
pub use crate::orchestrator::{Orchestrator, ProvisioningResult};
