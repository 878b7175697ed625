use serde::{Deserialize, Serialize};

/// Port used when a connection does not name one
pub const DEFAULT_PORT: u16 = 443;

/// Controller address and credentials supplied with every request
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Hostname or IP address of the controller
    pub hostname_or_address: String,

    /// Controller password
    #[serde(default)]
    pub password: String,

    /// HTTPS port, 0 meaning the default
    #[serde(default)]
    pub port: u16,

    /// Controller username
    #[serde(default)]
    pub username: String,
}

impl Connection {
    /// Create a connection on the default port
    #[must_use]
    pub fn new(
        hostname_or_address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname_or_address: hostname_or_address.into(),
            password: password.into(),
            port: DEFAULT_PORT,
            username: username.into(),
        }
    }

    /// Port to connect to, falling back to [`DEFAULT_PORT`]
    #[must_use]
    pub const fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("hostname_or_address", &self.hostname_or_address)
            .field("port", &self.effective_port())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where a discovered certificate lives on the controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keystore {
    /// Certificate object name
    pub certificate_name: String,

    /// Tenant owning the certificate
    pub tenant: String,
}

/// What a discovered certificate is bound to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Name of the virtual service using the certificate
    pub virtual_service_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        let json =
            r#"{"hostnameOrAddress":"avi.example.com","username":"admin","password":"secret"}"#;
        let connection: Connection = serde_json::from_str(json).unwrap();
        assert_eq!(connection.port, 0);
        assert_eq!(connection.effective_port(), 443);
    }

    #[test]
    fn test_debug_redacts_password() {
        let connection = Connection::new("avi.example.com", "admin", "secret");
        let debug = format!("{connection:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("avi.example.com"));
    }
}
