//! The remote directory capability discovery is built on.

use crate::types::{Connection, SslKeyAndCertificate, Tenant, VirtualService};
use crate::Result;
use async_trait::async_trait;

/// Tenant used when none is named
pub const DEFAULT_TENANT: &str = "admin";

/// An authenticated, tenant-scoped session with a controller
#[derive(Debug)]
pub struct Session<H> {
    connection: Connection,
    tenant: String,
    handle: H,
}

impl<H> Session<H> {
    /// Bind `handle` to `tenant` on `connection`; an empty tenant selects [`DEFAULT_TENANT`]
    pub fn new(connection: Connection, tenant: impl Into<String>, handle: H) -> Self {
        let tenant = tenant.into();
        Self {
            connection,
            tenant: if tenant.is_empty() {
                DEFAULT_TENANT.to_string()
            } else {
                tenant
            },
            handle,
        }
    }

    /// Tenant the session is scoped to
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Connection the session was opened on
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Implementation specific session state
    pub const fn handle(&self) -> &H {
        &self.handle
    }

    /// Mutable access to the session state
    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }
}

/// Parameters for one page of the certificate listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateQuery {
    /// 1-based page number
    pub page: usize,

    /// Objects per page
    pub page_size: usize,

    /// Server-side search expression
    pub search: Option<String>,
}

impl CertificateQuery {
    /// Query for `page` with `page_size` objects
    #[must_use]
    pub const fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            search: None,
        }
    }

    /// Restrict the listing with a search expression
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// Operations discovery needs from a controller.
///
/// Listing past the last certificate page must fail with
/// [`AviError::PageExhausted`](crate::AviError::PageExhausted) rather than
/// return an empty page.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Implementation specific authenticated state
    type Handle: Send + Sync;

    /// Authenticate and scope a session to `tenant`
    async fn open(&self, connection: &Connection, tenant: &str) -> Result<Session<Self::Handle>>;

    /// Log the session out; failures are not reported
    async fn close(&self, session: Session<Self::Handle>);

    /// One page of the tenant's certificates; `None` marks a null entry
    async fn list_certificates(
        &self,
        session: &Session<Self::Handle>,
        query: &CertificateQuery,
    ) -> Result<Vec<Option<SslKeyAndCertificate>>>;

    /// Certificate by identifier
    async fn certificate_by_id(
        &self,
        session: &Session<Self::Handle>,
        id: &str,
    ) -> Result<SslKeyAndCertificate>;

    /// Certificate by object name
    async fn certificate_by_name(
        &self,
        session: &Session<Self::Handle>,
        name: &str,
    ) -> Result<SslKeyAndCertificate>;

    /// Every virtual service referring to the certificate `certificate_id`
    async fn virtual_services_referring_to(
        &self,
        session: &Session<Self::Handle>,
        certificate_id: &str,
    ) -> Result<Vec<VirtualService>>;

    /// Every tenant visible to the session's user
    async fn tenants(&self, session: &Session<Self::Handle>) -> Result<Vec<Tenant>>;
}
