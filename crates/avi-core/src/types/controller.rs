//! Controller object model, limited to the fields discovery reads.

use serde::{Deserialize, Serialize};

/// One page of a controller collection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    /// Total number of objects across all pages
    #[serde(default)]
    pub count: Option<u64>,

    /// Objects on this page
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,

    /// Link to the next page, absent on the last page
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            count: None,
            results: Vec::new(),
            next: None,
        }
    }
}

impl<T> Collection<T> {
    /// Returns true if the controller advertised a following page
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// An `sslkeyandcertificate` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslKeyAndCertificate {
    /// Object name
    #[serde(default)]
    pub name: Option<String>,

    /// Object identifier
    #[serde(default)]
    pub uuid: Option<String>,

    /// Object self link
    #[serde(default)]
    pub url: Option<String>,

    /// Certificate type (`SSL_CERTIFICATE_TYPE_*`)
    #[serde(default, rename = "type")]
    pub certificate_type: Option<String>,

    /// Certificate content
    #[serde(default)]
    pub certificate: Option<SslCertificate>,

    /// Issuing authorities, nearest first
    #[serde(default)]
    pub ca_certs: Option<Vec<Option<CertificateAuthority>>>,
}

impl SslKeyAndCertificate {
    /// Issuing authority entries, empty when the controller sent none
    #[must_use]
    pub fn ca_entries(&self) -> &[Option<CertificateAuthority>] {
        self.ca_certs.as_deref().unwrap_or_default()
    }

    /// PEM text of the certificate, if present
    #[must_use]
    pub fn pem(&self) -> Option<&str> {
        self.certificate.as_ref()?.certificate.as_deref()
    }
}

/// Certificate body of an `sslkeyandcertificate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslCertificate {
    /// PEM encoded certificate
    #[serde(default)]
    pub certificate: Option<String>,

    /// Expiry, formatted `YYYY-MM-DD HH:MM:SS`
    #[serde(default)]
    pub not_after: Option<String>,

    /// Start of validity, same format as `not_after`
    #[serde(default)]
    pub not_before: Option<String>,

    /// Serial number
    #[serde(default)]
    pub serial_number: Option<String>,
}

/// Reference to an issuing certificate authority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateAuthority {
    /// Link to the CA `sslkeyandcertificate`
    #[serde(default)]
    pub ca_ref: Option<String>,

    /// CA object name, sometimes the only thing set
    #[serde(default)]
    pub name: Option<String>,
}

/// A `virtualservice` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualService {
    /// Object name
    #[serde(default)]
    pub name: Option<String>,

    /// Object identifier
    #[serde(default)]
    pub uuid: Option<String>,

    /// Object self link
    #[serde(default)]
    pub url: Option<String>,
}

/// A `tenant` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant name
    #[serde(default)]
    pub name: Option<String>,

    /// Object identifier
    #[serde(default)]
    pub uuid: Option<String>,

    /// Object self link
    #[serde(default)]
    pub url: Option<String>,
}
