//! Certificate expiry checks against the controller's `not_after` text.

use avi_core::SslCertificate;
use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Format of `not_after` as reported by the controller (UTC).
const NOT_AFTER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExpiryError {
    #[error("no certificate expiration value")]
    Missing,

    #[error(r#"unable to parse certificate expiration value of "{value}": {reason}"#)]
    Unparsable { value: String, reason: String },
}

/// Parse a controller `not_after` value.
pub(crate) fn parse_not_after(value: &str) -> Result<DateTime<Utc>, ExpiryError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ExpiryError::Missing);
    }

    NaiveDateTime::parse_from_str(value, NOT_AFTER_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| ExpiryError::Unparsable {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Returns true if the certificate's validity ended before `now`.
pub(crate) fn is_expired(
    certificate: &SslCertificate,
    now: DateTime<Utc>,
) -> Result<bool, ExpiryError> {
    let Some(not_after) = certificate.not_after.as_deref() else {
        return Err(ExpiryError::Missing);
    };
    Ok(now > parse_not_after(not_after)?)
}
