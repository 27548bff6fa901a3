use serde::Serialize;

/// Trial login issued by the IPTV panel. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialAccount {
    pub username: String,
    pub password: String,
    /// raw vendor value, formatted only when rendering the message
    pub expires_at: Option<String>,
    /// phone tag sent as `notes`
    pub source_identifier: String,
}

/// Message ready to be sent to one normalized phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub destination_phone: String,
    pub rendered_message: String,
}
