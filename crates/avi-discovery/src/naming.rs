//! Display names and identifiers for controller objects.
//!
//! Objects do not always carry every identifying field, so names fall back
//! from `name` to `uuid` to the last path segment of the object `url`.

use avi_core::{SslKeyAndCertificate, Tenant, VirtualService};
use thiserror::Error;
use url::Url;

/// Name used in logs when an object has no identifying field
pub const MISSING_NAME: &str = "missing name";

/// Why an identifier could not be derived.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error(r#"failed to parse entity URL "{url}": {reason}"#)]
    InvalidUrl { url: String, reason: String },

    #[error(r#"entity URL "{0}" has no path"#)]
    EmptyPath(String),

    #[error("entity has no uuid or url")]
    NoIdentifier,
}

/// Extract the identifier from an object link such as
/// `https://ctrl/api/sslkeyandcertificate/sslkeyandcertificate-0a1b#web`.
///
/// Relative links are accepted. The identifier is the last non-empty path
/// segment; query and fragment are ignored.
pub fn identifier_from_url(raw: &str) -> Result<String, NameError> {
    let invalid = |reason: url::ParseError| NameError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse("http://localhost/").map_err(invalid)?;
            base.join(trimmed).map_err(invalid)?
        }
        Err(e) => return Err(invalid(e)),
    };

    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(String::from)
        .ok_or_else(|| NameError::EmptyPath(raw.to_string()))
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// A controller object with the usual `name`/`uuid`/`url` triple.
pub trait Identified {
    fn name(&self) -> Option<&str>;
    fn uuid(&self) -> Option<&str>;
    fn url(&self) -> Option<&str>;

    /// Best available name for logs and keystore references.
    fn display_name(&self) -> String {
        if let Some(name) = self.name() {
            return name.to_string();
        }

        if let Some(uuid) = self.uuid() {
            return uuid.to_string();
        }

        self.url()
            .and_then(|url| identifier_from_url(url).ok())
            .unwrap_or_else(|| MISSING_NAME.to_string())
    }

    /// Identifier used to look the object up or refer to it.
    fn identifier(&self) -> Result<String, NameError> {
        if let Some(uuid) = self.uuid() {
            return Ok(uuid.to_string());
        }

        match self.url() {
            Some(url) => identifier_from_url(url),
            None => Err(NameError::NoIdentifier),
        }
    }
}

macro_rules! impl_identified {
    ($($ty:ty),*) => {
        $(
            impl Identified for $ty {
                fn name(&self) -> Option<&str> {
                    non_empty(self.name.as_ref())
                }

                fn uuid(&self) -> Option<&str> {
                    non_empty(self.uuid.as_ref())
                }

                fn url(&self) -> Option<&str> {
                    non_empty(self.url.as_ref())
                }
            }
        )*
    };
}

impl_identified!(SslKeyAndCertificate, VirtualService, Tenant);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_from_absolute_url() {
        let id = identifier_from_url(
            "https://10.0.0.5/api/sslkeyandcertificate/sslkeyandcertificate-7f3a#System-Default-Cert",
        )
        .unwrap();
        assert_eq!(id, "sslkeyandcertificate-7f3a");
    }

    #[test]
    fn test_identifier_ignores_trailing_slash_and_query() {
        let url = "https://avi/api/tenant/admin/?include_name=true";
        assert_eq!(identifier_from_url(url).unwrap(), "admin");
    }

    #[test]
    fn test_identifier_from_relative_url() {
        let url = "/api/virtualservice/virtualservice-1";
        assert_eq!(identifier_from_url(url).unwrap(), "virtualservice-1");
    }

    #[test]
    fn test_identifier_without_path() {
        assert!(matches!(
            identifier_from_url("https://avi.example.com"),
            Err(NameError::EmptyPath(_))
        ));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            identifier_from_url("https://[::1"),
            Err(NameError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut vs = VirtualService {
            name: Some("vs-web".to_string()),
            uuid: Some("virtualservice-1".to_string()),
            url: Some("/api/virtualservice/virtualservice-2".to_string()),
        };
        assert_eq!(vs.display_name(), "vs-web");

        vs.name = Some(String::new());
        assert_eq!(vs.display_name(), "virtualservice-1");

        vs.uuid = None;
        assert_eq!(vs.display_name(), "virtualservice-2");

        vs.url = None;
        assert_eq!(vs.display_name(), MISSING_NAME);
    }

    #[test]
    fn test_certificate_identifier() {
        let mut cert = SslKeyAndCertificate {
            url: Some("https://avi/api/sslkeyandcertificate/cert-9".to_string()),
            ..SslKeyAndCertificate::default()
        };
        assert_eq!(cert.identifier().unwrap(), "cert-9");

        cert.uuid = Some("cert-1".to_string());
        assert_eq!(cert.identifier().unwrap(), "cert-1");

        let bare = SslKeyAndCertificate::default();
        assert_eq!(bare.identifier(), Err(NameError::NoIdentifier));
    }
}
