//! Controller object builders shared by the engine tests.

use avi_core::{CertificateAuthority, SslCertificate, SslKeyAndCertificate, VirtualService};

pub const VIRTUALSERVICE_TYPE: &str = "SSL_CERTIFICATE_TYPE_VIRTUALSERVICE";
pub const CA_TYPE: &str = "SSL_CERTIFICATE_TYPE_CA";

pub fn ca_url(id: &str) -> String {
    format!("https://avi/api/sslkeyandcertificate/{id}")
}

pub fn pem(name: &str) -> String {
    format!("-----BEGIN CERTIFICATE-----\n{name}\n-----END CERTIFICATE-----")
}

/// A valid, unexpired leaf certificate with no chain.
pub fn certificate(name: &str) -> SslKeyAndCertificate {
    SslKeyAndCertificate {
        name: Some(name.to_string()),
        uuid: Some(format!("sslkeyandcertificate-{name}")),
        url: Some(ca_url(&format!("sslkeyandcertificate-{name}"))),
        certificate_type: Some(VIRTUALSERVICE_TYPE.to_string()),
        certificate: Some(SslCertificate {
            certificate: Some(pem(name)),
            not_after: Some("2099-12-31 23:59:59".to_string()),
            not_before: Some("2020-01-01 00:00:00".to_string()),
            serial_number: Some("01".to_string()),
        }),
        ca_certs: None,
    }
}

/// Leaf certificate issued by the authorities `ids`, nearest first.
pub fn issued_by(name: &str, ids: &[&str]) -> SslKeyAndCertificate {
    SslKeyAndCertificate {
        ca_certs: Some(ids.iter().map(|id| by_ref(id)).collect()),
        ..certificate(name)
    }
}

/// Leaf certificate whose `not_after` is `value`.
pub fn expiring(name: &str, value: &str) -> SslKeyAndCertificate {
    let mut cert = certificate(name);
    if let Some(body) = cert.certificate.as_mut() {
        body.not_after = Some(value.to_string());
    }
    cert
}

/// A CA object addressable by `id` both as identifier and name.
pub fn authority(id: &str, pem: &str) -> SslKeyAndCertificate {
    SslKeyAndCertificate {
        name: Some(id.to_string()),
        uuid: Some(id.to_string()),
        url: Some(ca_url(id)),
        certificate_type: Some(CA_TYPE.to_string()),
        certificate: Some(SslCertificate {
            certificate: Some(pem.to_string()),
            ..SslCertificate::default()
        }),
        ca_certs: None,
    }
}

pub fn by_ref(id: &str) -> Option<CertificateAuthority> {
    Some(CertificateAuthority {
        ca_ref: Some(ca_url(id)),
        name: None,
    })
}

pub fn by_name(name: &str) -> Option<CertificateAuthority> {
    Some(CertificateAuthority {
        ca_ref: None,
        name: Some(name.to_string()),
    })
}

pub fn virtual_service(name: &str) -> VirtualService {
    VirtualService {
        name: Some(name.to_string()),
        uuid: Some(format!("virtualservice-{name}")),
        url: Some(format!("https://avi/api/virtualservice/virtualservice-{name}")),
    }
}
