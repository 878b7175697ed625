//! Connector errors and their HTTP rendering.

use avi_discovery::DiscoveryError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type for connector operations
pub type Result<T> = std::result::Result<T, ConnectorError>;

#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The request body was not the expected JSON
    #[error("failed to unmarshal json: {0}")]
    InvalidJson(String),

    /// Discovery or the connection check failed
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Configuration could not be used
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<JsonRejection> for ConnectorError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidJson(rejection.body_text())
    }
}

impl ConnectorError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) | Self::Discovery(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failures are returned as plain text, the platform shows the body to the
/// administrator as-is.
impl IntoResponse for ConnectorError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
