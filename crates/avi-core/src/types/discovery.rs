//! Discovery request/response wire contract.

use super::{Binding, Connection, Keystore};
use serde::{Deserialize, Serialize};

/// Filters chosen by the administrator for a discovery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryConfiguration {
    /// Skip certificates whose not-after is in the past
    #[serde(default)]
    pub exclude_expired_certificates: bool,

    /// Skip certificates no virtual service uses
    #[serde(default)]
    pub exclude_inactive_certificates: bool,

    /// Comma-separated tenant allow-list, empty for every tenant
    #[serde(default)]
    pub tenants: String,
}

/// Result processing limits for one discovery call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryControl {
    /// Maximum number of certificates to return from this call
    pub max_results: usize,
}

/// Continuation cursor echoed between discovery calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryPage {
    /// Tenant to resume at
    #[serde(
        rename = "discoveryType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tenant: Option<String>,

    /// Opaque scanner resumption token
    #[serde(default)]
    pub paginator: String,
}

impl DiscoveryPage {
    /// Cursor resuming `tenant` with `paginator`
    #[must_use]
    pub fn new(tenant: impl Into<String>, paginator: impl Into<String>) -> Self {
        Self {
            tenant: Some(tenant.into()),
            paginator: paginator.into(),
        }
    }

    /// Returns true if the cursor carries no resumption state
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tenant.is_none() && self.paginator.is_empty()
    }
}

/// Body of `POST /v1/discovercertificates`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverCertificatesRequest {
    /// Administrator filters
    #[serde(rename = "discovery", default)]
    pub configuration: DiscoveryConfiguration,

    /// Controller to scan
    pub connection: Connection,

    /// Result budget
    #[serde(rename = "discoveryControl", default)]
    pub control: DiscoveryControl,

    /// Cursor returned by the previous call
    #[serde(
        rename = "discoveryPage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub page: Option<DiscoveryPage>,
}

/// Response of a discovery call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverCertificatesResponse {
    /// Cursor for the next call, `null` once discovery is complete
    #[serde(rename = "discoveryPage")]
    pub page: Option<DiscoveryPage>,

    /// Certificates discovered in this call
    pub messages: Vec<DiscoveredCertificate>,
}

impl DiscoverCertificatesResponse {
    /// Returns true if no further call is needed
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.page.is_none()
    }
}

/// A certificate and its usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredCertificate {
    /// PEM encoded leaf certificate
    pub certificate: String,

    /// Issuing chain, nearest intermediate first and root last
    pub certificate_chain: Vec<String>,

    /// Network installations, not reported by this connector
    pub installations: Vec<CertificateInstallation>,

    /// Virtual services using the certificate
    pub machine_identities: Vec<MachineIdentity>,
}

impl DiscoveredCertificate {
    /// New record with no chain or usage yet
    #[must_use]
    pub fn new(certificate: impl Into<String>) -> Self {
        Self {
            certificate: certificate.into(),
            ..Self::default()
        }
    }
}

/// Host/port a certificate is served on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInstallation {
    /// Hostname
    pub hostname: String,

    /// IP address
    pub ip_address: String,

    /// TCP port
    pub port: u16,
}

/// One certificate-to-virtual-service usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineIdentity {
    /// Certificate location
    pub keystore: Keystore,

    /// Virtual service binding
    pub binding: Binding,
}

impl MachineIdentity {
    /// Usage of `certificate_name` in `tenant` by `virtual_service_name`
    #[must_use]
    pub fn new(
        tenant: impl Into<String>,
        certificate_name: impl Into<String>,
        virtual_service_name: impl Into<String>,
    ) -> Self {
        Self {
            keystore: Keystore {
                certificate_name: certificate_name.into(),
                tenant: tenant.into(),
            },
            binding: Binding {
                virtual_service_name: virtual_service_name.into(),
            },
        }
    }
}

/// Body of `POST /v1/testconnection`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConnectionRequest {
    /// Controller to try
    pub connection: Connection,
}

/// Response of a successful connection test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConnectionResponse {
    /// Always true when returned
    pub result: bool,
}
