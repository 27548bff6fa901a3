use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::VendorError;

/// Replayable description of a vendor call.
///
/// Kept as plain data so the same request can be re-issued after a re-authentication.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: &str) -> Self {
        Self { method: Method::GET, path: path.to_owned(), query: Vec::new(), body: None }
    }

    pub fn post_json(path: &str, body: Value) -> Self {
        Self { method: Method::POST, path: path.to_owned(), query: Vec::new(), body: Some(body) }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_auth_failure(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED || self.status == StatusCode::FORBIDDEN
    }

    /// 200 or 201, the only statuses the vendors use for success.
    pub fn is_ok_or_created(&self) -> bool {
        self.status == StatusCode::OK || self.status == StatusCode::CREATED
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, VendorError> {
        serde_json::from_str(&self.body)
            .map_err(|e| VendorError::MalformedResponse(format!("{} (body: {})", e, self.body)))
    }

    pub fn rejected(&self) -> VendorError {
        VendorError::VendorRejected { status: self.status, body: self.body.clone() }
    }
}
