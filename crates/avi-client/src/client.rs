//! Main controller API client implementation.

use crate::api::{CertificateApi, TenantApi, VirtualServiceApi};
use crate::config::RateLimitConfig;
use crate::session::AviSession;
use avi_core::{AviError, Collection, Connection, Result, Session};
use governor::{DefaultDirectRateLimiter, RateLimiter};
use reqwest::header::{HeaderName, REFERER};
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on pages followed when reading a whole collection
const MAX_COLLECTION_PAGES: usize = 10_000;

const AVI_VERSION: HeaderName = HeaderName::from_static("x-avi-version");
const AVI_TENANT: HeaderName = HeaderName::from_static("x-avi-tenant");
const CSRF_TOKEN: HeaderName = HeaderName::from_static("x-csrftoken");

/// NSX Advanced Load Balancer controller client
///
/// The client holds no per-controller state; every request goes through a
/// [`Session`] returned by [`AviClient::login`].
#[derive(Clone)]
pub struct AviClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: Option<String>,
    rate_limiter: DefaultDirectRateLimiter,
}

impl AviClient {
    /// Create a new client using default settings
    pub fn new() -> Result<Self> {
        AviClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> AviClientBuilder {
        AviClientBuilder::new()
    }

    /// Access certificate endpoints
    #[must_use]
    pub fn certificates<'a>(&'a self, session: &'a Session<AviSession>) -> CertificateApi<'a> {
        CertificateApi::new(self, session)
    }

    /// Access virtual service endpoints
    #[must_use]
    pub fn virtual_services<'a>(
        &'a self,
        session: &'a Session<AviSession>,
    ) -> VirtualServiceApi<'a> {
        VirtualServiceApi::new(self, session)
    }

    /// Access tenant endpoints
    #[must_use]
    pub fn tenants<'a>(&'a self, session: &'a Session<AviSession>) -> TenantApi<'a> {
        TenantApi::new(self, session)
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// Controller root URL for a connection
    pub(crate) fn base_url_for(&self, connection: &Connection) -> String {
        self.inner.base_url.clone().unwrap_or_else(|| {
            format!(
                "https://{}:{}",
                connection.hostname_or_address.trim(),
                connection.effective_port()
            )
        })
    }

    /// Attach session cookies and controller headers to a request
    pub(crate) fn authorize(
        &self,
        request: RequestBuilder,
        session: &Session<AviSession>,
    ) -> RequestBuilder {
        let handle = session.handle();
        let mut request = request
            .header(reqwest::header::COOKIE, handle.cookie_header())
            .header(REFERER, handle.base_url())
            .header(AVI_TENANT, session.tenant());

        if let Some(token) = handle.csrf_token() {
            request = request.header(CSRF_TOKEN, token);
        }

        if !handle.version().is_empty() {
            request = request.header(AVI_VERSION, handle.version());
        }

        request
    }

    /// Perform a GET request with query parameters
    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        session: &Session<AviSession>,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = build_url(session.handle().base_url(), path, params)?;
        debug!(url = %url, tenant = session.tenant(), "GET request");

        self.inner.rate_limiter.until_ready().await;

        let response = self
            .authorize(self.inner.http.get(url), session)
            .send()
            .await
            .map_err(|e| AviError::Http(e.to_string()))?;

        Self::handle_response(response).await
    }

    /// Read every page of a collection endpoint
    pub(crate) async fn get_all<T: DeserializeOwned>(
        &self,
        session: &Session<AviSession>,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut objects = Vec::new();

        for page in 1..=MAX_COLLECTION_PAGES {
            let page_str = page.to_string();
            let mut page_params = params.to_vec();
            page_params.push(("page", page_str.as_str()));

            let collection: Collection<T> = self.get_with_query(session, path, &page_params).await?;

            let fetched = collection.results.len();
            let has_next = collection.has_next();
            objects.extend(collection.results);

            if !has_next || fetched == 0 {
                return Ok(objects);
            }
        }

        warn!(
            path,
            pages = MAX_COLLECTION_PAGES,
            "collection paging limit reached"
        );
        Ok(objects)
    }

    /// Handle an API response that returns JSON
    pub(crate) async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| AviError::Http(e.to_string()))?;
            serde_json::from_str(&body).map_err(AviError::Json)
        } else {
            Err(Self::error_from_response(status.as_u16(), response).await)
        }
    }

    /// Convert an error response to an [`AviError`]
    pub(crate) async fn error_from_response(status: u16, response: reqwest::Response) -> AviError {
        let body = response.text().await.unwrap_or_default();

        // The controller reports errors as {"error": "..."}
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"].as_str().map(String::from))
            .unwrap_or(body);

        AviError::from_status(status, message)
    }
}

/// Join `path` onto `base` and append query parameters
fn build_url(base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))
        .map_err(|e| AviError::InvalidUrl(format!("{base}{path}: {e}")))?;

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(url)
}

/// Builder for configuring an [`AviClient`]
pub struct AviClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: String,
    accept_invalid_certs: bool,
    rate_limit: RateLimitConfig,
}

impl Default for AviClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AviClientBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("avi-connector/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Use a fixed controller URL instead of deriving it from the connection (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Accept self-signed controller certificates
    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the request rate limit
    #[must_use]
    pub const fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<AviClient> {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .gzip(true)
            .build()
            .map_err(|e| AviError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(AviClient {
            inner: Arc::new(ClientInner {
                http,
                base_url: self.base_url,
                rate_limiter: RateLimiter::direct(self.rate_limit.quota()),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url(
            "https://avi.example.com:443/",
            "/api/sslkeyandcertificate",
            &[("search", "(type,SSL_CERTIFICATE_TYPE_SYSTEM)|(type,X)")],
        )
        .unwrap();

        assert_eq!(url.path(), "/api/sslkeyandcertificate");
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "search");
        assert_eq!(value, "(type,SSL_CERTIFICATE_TYPE_SYSTEM)|(type,X)");
    }

    #[test]
    fn test_base_url_from_connection() {
        let client = AviClient::new().unwrap();
        let mut connection = Connection::new("avi.example.com", "admin", "secret");
        assert_eq!(
            client.base_url_for(&connection),
            "https://avi.example.com:443"
        );

        connection.port = 8443;
        assert_eq!(
            client.base_url_for(&connection),
            "https://avi.example.com:8443"
        );
    }

    #[test]
    fn test_base_url_override() {
        let client = AviClient::builder()
            .base_url("http://127.0.0.1:9000")
            .build()
            .unwrap();
        let connection = Connection::new("ignored", "admin", "secret");
        assert_eq!(client.base_url_for(&connection), "http://127.0.0.1:9000");
    }
}
