use http::StatusCode;
use thiserror::Error;

/// Failure kinds shared by every vendor-facing component.
///
/// `AuthenticatedClient` recovers a single authorization failure on its own; every
/// other variant travels unchanged up to the orchestrator, which reports it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VendorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("authentication failed with status {status}: {body}")]
    AuthFailed { status: StatusCode, body: String },

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("vendor rejected request with status {status}: {body}")]
    VendorRejected { status: StatusCode, body: String },

    #[error("malformed vendor response: {0}")]
    MalformedResponse(String),
}

impl VendorError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            VendorError::InvalidInput(_) => "invalid_input",
            VendorError::AuthFailed { .. } => "auth_failed",
            VendorError::TransportError(_) => "transport_error",
            VendorError::VendorRejected { .. } => "vendor_rejected",
            VendorError::MalformedResponse(_) => "malformed_response",
        }
    }

    pub fn is_auth_failed(&self) -> bool {
        matches!(self, VendorError::AuthFailed { .. })
    }
}

impl From<reqwest::Error> for VendorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VendorError::TransportError(format!("timed out: {}", err))
        } else if err.is_decode() {
            VendorError::MalformedResponse(err.to_string())
        } else {
            VendorError::TransportError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_labels() {
        assert_eq!(VendorError::InvalidInput("x".into()).kind(), "invalid_input");
        assert_eq!(
            VendorError::AuthFailed { status: StatusCode::FORBIDDEN, body: String::new() }.kind(),
            "auth_failed"
        );
        assert_eq!(VendorError::TransportError("reset".into()).kind(), "transport_error");
        assert_eq!(
            VendorError::VendorRejected { status: StatusCode::BAD_REQUEST, body: "no".into() }.kind(),
            "vendor_rejected"
        );
        assert_eq!(VendorError::MalformedResponse("x".into()).kind(), "malformed_response");
    }

    #[test]
    fn display_carries_status_and_body() {
        let err = VendorError::VendorRejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: "package not found".into(),
        };
        let text = err.to_string();
        assert!(text.contains("422"));
        assert!(text.contains("package not found"));
    }
}
