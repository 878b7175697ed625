//! Error types for discovery.

use avi_core::AviError;
use thiserror::Error;

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Failures that abort a whole discovery call.
///
/// Problems with a single certificate or CA entry never surface here; they
/// are logged and the record is left out.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The request itself cannot be processed.
    #[error("invalid discovery request: {0}")]
    InvalidRequest(String),

    /// Session open failed.
    #[error(r#"failed to connect to the controller with tenant "{tenant}": {source}"#)]
    Connect {
        tenant: String,
        #[source]
        source: AviError,
    },

    /// The tenant catalog could not be read.
    #[error("failed to read the controller tenants: {0}")]
    Tenants(#[source] AviError),

    /// A certificate page could not be read.
    #[error(r#"failed to read certificates for the tenant "{tenant}": {source}"#)]
    ListCertificates {
        tenant: String,
        #[source]
        source: AviError,
    },

    /// Usage of a certificate could not be determined.
    #[error(
        r#"failed to read virtual services for certificate "{certificate}" in tenant "{tenant}": {source}"#
    )]
    VirtualServices {
        tenant: String,
        certificate: String,
        #[source]
        source: AviError,
    },

    /// Paginator encoding failed.
    #[error("failed to encode the discovery paginator: {0}")]
    Paginator(#[from] serde_json::Error),
}

impl DiscoveryError {
    /// Tenant the failure happened in, if any.
    pub fn tenant(&self) -> Option<&str> {
        match self {
            Self::Connect { tenant, .. }
            | Self::ListCertificates { tenant, .. }
            | Self::VirtualServices { tenant, .. } => Some(tenant),
            _ => None,
        }
    }
}
