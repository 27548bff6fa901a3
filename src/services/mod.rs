//! Vendor-facing services: trial provisioning on the IPTV panel and credential
//! delivery through the messaging bot.

pub mod account;
pub mod message;
pub mod notification;
pub mod phone;
pub mod provisioning;

pub use account::{DeliveryRequest, TrialAccount};
pub use notification::NotificationService;
pub use provisioning::ProvisioningService;
