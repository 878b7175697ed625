use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, AviError>;

/// Message the controller returns when a collection page is past the end.
const NO_RESULTS_MESSAGE: &str = "That page contains no results";

/// Errors that can occur when talking to an NSX-ALB controller
#[derive(Error, Debug)]
pub enum AviError {
    /// Authentication failed - invalid credentials or expired session
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// The requested collection page is past the last page
    #[error("that page contains no results")]
    PageExhausted,

    /// API returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Connection or login failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL or object reference
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AviError {
    /// Classify a non-success controller response.
    ///
    /// The controller reports paging past the end of a collection with a
    /// human-readable message whatever the status code; that case becomes
    /// [`AviError::PageExhausted`] so nothing downstream matches on text.
    #[must_use]
    pub fn from_status(code: u16, message: String) -> Self {
        if is_no_results_message(&message) {
            return Self::PageExhausted;
        }

        match code {
            401 | 403 => Self::Unauthorized(message),
            404 => Self::NotFound { resource: message },
            _ => Self::Api { code, message },
        }
    }

    /// Returns true if the error marks the end of a paged collection
    #[must_use]
    pub const fn is_page_exhausted(&self) -> bool {
        matches!(self, Self::PageExhausted)
    }

    /// Returns true if the error is due to authentication
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Returns the HTTP status code if this is an API error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Returns true if a controller error message signals an empty trailing page.
///
/// This is the only place the controller's wording is matched.
#[must_use]
pub fn is_no_results_message(message: &str) -> bool {
    message.contains(NO_RESULTS_MESSAGE)
}
