//! Vendor HTTP access: endpoints, login exchanges and the authenticated client.

pub mod auth;
pub mod authenticated;
pub mod endpoint;
pub mod request;

pub use authenticated::AuthenticatedClient;
pub use endpoint::ServiceEndpoint;
pub use request::{ApiRequest, ApiResponse};
