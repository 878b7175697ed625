//! Controller login and logout.

use crate::AviClient;
use avi_core::{AviError, Connection, Result, Session};
use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const CSRF_COOKIE: &str = "csrftoken";

/// Authenticated state of a controller session
#[derive(Clone)]
pub struct AviSession {
    base_url: String,
    cookies: Vec<(String, String)>,
    version: String,
}

impl AviSession {
    /// Controller root URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Controller API version negotiated at login
    pub fn version(&self) -> &str {
        &self.version
    }

    /// CSRF token issued at login
    pub fn csrf_token(&self) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(name, _)| name == CSRF_COOKIE)
            .map(|(_, value)| value.as_str())
    }

    /// `Cookie` header value replaying the login cookies
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl std::fmt::Debug for AviSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AviSession")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .field("cookies", &self.cookies.len())
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct InitialData {
    #[serde(default)]
    version: Option<ControllerVersion>,
}

#[derive(Deserialize)]
struct ControllerVersion {
    #[serde(default, rename = "Version")]
    version: Option<String>,
}

/// Collect `name=value` pairs from `Set-Cookie` headers
fn parse_set_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| {
            let pair = cookie.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

impl AviClient {
    /// Log in to the controller and scope the session to `tenant`.
    ///
    /// The controller version is read once after login and sent with every
    /// later request.
    #[instrument(
        skip(self, connection),
        fields(address = %connection.hostname_or_address, port = connection.effective_port())
    )]
    pub async fn login(
        &self,
        connection: &Connection,
        tenant: &str,
    ) -> Result<Session<AviSession>> {
        info!("attempting to connect to the controller");

        let base_url = self.base_url_for(connection);
        let body = LoginRequest {
            username: &connection.username,
            password: &connection.password,
        };

        let response = self
            .http()
            .post(format!("{base_url}/login"))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to connect to the controller");
                AviError::Connection(format!("failed to connect: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let err = Self::error_from_response(status.as_u16(), response).await;
            error!(error = %err, "controller rejected the login");
            return Err(err);
        }

        let cookies = parse_set_cookies(response.headers());
        if !cookies.iter().any(|(name, _)| name.ends_with("sessionid")) {
            return Err(AviError::Connection(
                "login response did not establish a session".to_string(),
            ));
        }

        let mut session = Session::new(
            connection.clone(),
            tenant,
            AviSession {
                base_url,
                cookies,
                version: String::new(),
            },
        );

        let version = match self
            .get_with_query::<InitialData>(&session, "/api/initial-data", &[])
            .await
        {
            Ok(data) => data.version.and_then(|v| v.version).unwrap_or_default(),
            Err(err) => {
                error!(tenant, error = %err, "failed reading the controller version");
                self.logout(session).await;
                return Err(AviError::Connection(format!(
                    r#"failed to connect with tenant "{tenant}": {err}"#
                )));
            }
        };

        if version.is_empty() {
            error!(tenant, "controller returned an empty version");
            self.logout(session).await;
            return Err(AviError::Connection(
                "failed reading the controller version: empty response data".to_string(),
            ));
        }

        debug!(
            tenant = session.tenant(),
            version = %version,
            "controller session established"
        );
        session.handle_mut().version = version;
        Ok(session)
    }

    /// Log the session out; failures are only logged
    #[instrument(
        skip(self, session),
        fields(address = %session.connection().hostname_or_address, tenant = session.tenant())
    )]
    pub async fn logout(&self, session: Session<AviSession>) {
        let url = format!("{}/logout", session.handle().base_url());

        match self.authorize(self.http().post(url), &session).send().await {
            Ok(response) if response.status().is_success() => debug!("logged out"),
            Ok(response) => warn!(status = response.status().as_u16(), "logout rejected"),
            Err(e) => warn!(error = %e, "logout failed"),
        }
    }
}
