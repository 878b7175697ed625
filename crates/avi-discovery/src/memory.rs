//! An in-memory [`DirectoryService`] for exercising discovery without a
//! controller.
//!
//! Paging follows the controller: the first page of an empty listing is
//! empty, any later page past the end fails with
//! [`AviError::PageExhausted`]. Calls are counted so tests can check how
//! often the directory was consulted.

use async_trait::async_trait;
use avi_core::{
    AviError, CertificateQuery, Connection, DirectoryService, Result, Session,
    SslKeyAndCertificate, Tenant, VirtualService,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Session state handed out by [`InMemoryDirectory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySession {
    id: usize,
}

#[derive(Debug, Default)]
struct Calls {
    opened: Vec<String>,
    closed: HashSet<usize>,
    pages: Vec<(String, usize)>,
    authority_fetches: HashMap<String, usize>,
}

/// A scripted controller.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    tenants: Vec<Tenant>,
    listings: HashMap<String, Vec<Option<SslKeyAndCertificate>>>,
    authorities: HashMap<String, Vec<SslKeyAndCertificate>>,
    usages: HashMap<(String, String), Vec<VirtualService>>,
    password: Option<String>,
    failing_open: HashSet<String>,
    failing_listing: HashSet<String>,
    failing_usage: HashSet<String>,
    failing_catalog: bool,
    calls: Mutex<Calls>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named tenant to the catalog.
    #[must_use]
    pub fn with_tenant(self, name: &str) -> Self {
        self.with_tenant_record(Tenant {
            name: Some(name.to_string()),
            uuid: Some(format!("tenant-{name}")),
            url: Some(format!("https://avi/api/tenant/tenant-{name}")),
        })
    }

    /// Add a tenant object as-is, including ones without a name.
    #[must_use]
    pub fn with_tenant_record(mut self, tenant: Tenant) -> Self {
        self.tenants.push(tenant);
        self
    }

    /// Append a certificate to the tenant's listing, adding the tenant to
    /// the catalog if needed.
    #[must_use]
    pub fn with_certificate(self, tenant: &str, certificate: SslKeyAndCertificate) -> Self {
        self.with_entry(tenant, Some(certificate))
    }

    /// Append a null entry to the tenant's listing.
    #[must_use]
    pub fn with_null_entry(self, tenant: &str) -> Self {
        self.with_entry(tenant, None)
    }

    fn with_entry(mut self, tenant: &str, entry: Option<SslKeyAndCertificate>) -> Self {
        if !self.has_tenant(tenant) {
            self = self.with_tenant(tenant);
        }
        self.listings.entry(tenant.to_string()).or_default().push(entry);
        self
    }

    /// Make an object available to lookups by identifier or name without
    /// listing it.
    #[must_use]
    pub fn with_authority(mut self, tenant: &str, authority: SslKeyAndCertificate) -> Self {
        self.authorities
            .entry(tenant.to_string())
            .or_default()
            .push(authority);
        self
    }

    /// Record that `virtual_service` refers to `certificate_id` in `tenant`.
    #[must_use]
    pub fn with_usage(
        mut self,
        tenant: &str,
        certificate_id: &str,
        virtual_service: VirtualService,
    ) -> Self {
        self.usages
            .entry((tenant.to_string(), certificate_id.to_string()))
            .or_default()
            .push(virtual_service);
        self
    }

    /// Reject sessions whose password differs.
    #[must_use]
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    #[must_use]
    pub fn failing_open(mut self, tenant: &str) -> Self {
        self.failing_open.insert(tenant.to_string());
        self
    }

    #[must_use]
    pub fn failing_listing(mut self, tenant: &str) -> Self {
        self.failing_listing.insert(tenant.to_string());
        self
    }

    #[must_use]
    pub fn failing_usage(mut self, tenant: &str) -> Self {
        self.failing_usage.insert(tenant.to_string());
        self
    }

    #[must_use]
    pub fn failing_catalog(mut self) -> Self {
        self.failing_catalog = true;
        self
    }

    fn has_tenant(&self, name: &str) -> bool {
        self.tenants.iter().any(|t| t.name.as_deref() == Some(name))
    }

    fn calls(&self) -> MutexGuard<'_, Calls> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tenants sessions were opened for, in order.
    pub fn opened(&self) -> Vec<String> {
        self.calls().opened.clone()
    }

    /// Sessions opened and not yet closed.
    pub fn open_sessions(&self) -> usize {
        let calls = self.calls();
        (1..=calls.opened.len())
            .filter(|id| !calls.closed.contains(id))
            .count()
    }

    /// Certificate pages requested, as `(tenant, page)`.
    pub fn pages_requested(&self) -> Vec<(String, usize)> {
        self.calls().pages.clone()
    }

    /// Lookups by identifier for `id`.
    pub fn authority_fetches(&self, id: &str) -> usize {
        self.calls().authority_fetches.get(id).copied().unwrap_or(0)
    }

    /// Lookups by identifier for any object.
    pub fn total_authority_fetches(&self) -> usize {
        self.calls().authority_fetches.values().sum()
    }

    /// Every object the tenant can look up: authorities, then its listing.
    fn lookup_candidates<'a>(
        &'a self,
        tenant: &str,
    ) -> impl Iterator<Item = &'a SslKeyAndCertificate> + 'a {
        let authorities = self.authorities.get(tenant).into_iter().flatten();
        let listed = self.listings.get(tenant).into_iter().flatten().flatten();
        authorities.chain(listed)
    }
}

/// Does a certificate satisfy a `(field,value)|(field,value)` search?
fn matches_search(certificate: &SslKeyAndCertificate, search: Option<&str>) -> bool {
    let Some(search) = search else {
        return true;
    };

    search.split('|').any(|clause| {
        let clause = clause.trim().trim_start_matches('(').trim_end_matches(')');
        match clause.split_once(',') {
            Some(("type", value)) => certificate.certificate_type.as_deref() == Some(value),
            Some(("name", value)) => certificate.name.as_deref() == Some(value),
            _ => false,
        }
    })
}

#[async_trait]
impl DirectoryService for InMemoryDirectory {
    type Handle = MemorySession;

    async fn open(&self, connection: &Connection, tenant: &str) -> Result<Session<MemorySession>> {
        if self.failing_open.contains(tenant) {
            return Err(AviError::Connection(format!(
                "login rejected for tenant {tenant}"
            )));
        }

        if let Some(ref password) = self.password {
            if *password != connection.password {
                return Err(AviError::Unauthorized("invalid credentials".to_string()));
            }
        }

        let mut calls = self.calls();
        calls.opened.push(tenant.to_string());
        let id = calls.opened.len();
        let session = Session::new(connection.clone(), tenant, MemorySession { id });
        Ok(session)
    }

    async fn close(&self, session: Session<MemorySession>) {
        self.calls().closed.insert(session.handle().id);
    }

    async fn list_certificates(
        &self,
        session: &Session<MemorySession>,
        query: &CertificateQuery,
    ) -> Result<Vec<Option<SslKeyAndCertificate>>> {
        let tenant = session.tenant();
        self.calls().pages.push((tenant.to_string(), query.page));

        if self.failing_listing.contains(tenant) {
            return Err(AviError::Api {
                code: 500,
                message: "certificate listing unavailable".to_string(),
            });
        }

        let matching: Vec<_> = self
            .listings
            .get(tenant)
            .into_iter()
            .flatten()
            .filter(|entry| match entry {
                Some(certificate) => matches_search(certificate, query.search.as_deref()),
                None => true,
            })
            .cloned()
            .collect();

        let size = query.page_size.max(1);
        let start = query.page.saturating_sub(1).saturating_mul(size);

        if start >= matching.len() && query.page > 1 {
            return Err(AviError::PageExhausted);
        }

        Ok(matching.into_iter().skip(start).take(size).collect())
    }

    async fn certificate_by_id(
        &self,
        session: &Session<MemorySession>,
        id: &str,
    ) -> Result<SslKeyAndCertificate> {
        *self
            .calls()
            .authority_fetches
            .entry(id.to_string())
            .or_default() += 1;

        self.lookup_candidates(session.tenant())
            .find(|c| c.uuid.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| AviError::NotFound {
                resource: format!("sslkeyandcertificate {id}"),
            })
    }

    async fn certificate_by_name(
        &self,
        session: &Session<MemorySession>,
        name: &str,
    ) -> Result<SslKeyAndCertificate> {
        self.lookup_candidates(session.tenant())
            .find(|c| c.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| AviError::NotFound {
                resource: format!("sslkeyandcertificate named {name}"),
            })
    }

    async fn virtual_services_referring_to(
        &self,
        session: &Session<MemorySession>,
        certificate_id: &str,
    ) -> Result<Vec<VirtualService>> {
        let tenant = session.tenant();
        if self.failing_usage.contains(tenant) {
            return Err(AviError::Api {
                code: 500,
                message: "virtual service lookup unavailable".to_string(),
            });
        }

        Ok(self
            .usages
            .get(&(tenant.to_string(), certificate_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn tenants(&self, _session: &Session<MemorySession>) -> Result<Vec<Tenant>> {
        if self.failing_catalog {
            return Err(AviError::Unauthorized(
                "tenant catalog not readable".to_string(),
            ));
        }
        Ok(self.tenants.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{authority, certificate, virtual_service, CA_TYPE, VIRTUALSERVICE_TYPE};
    use crate::scanner::CERTIFICATE_SEARCH;

    fn connection() -> Connection {
        Connection::new("avi", "admin", "secret")
    }

    #[tokio::test]
    async fn test_paging_matches_controller() {
        let mut directory = InMemoryDirectory::new();
        for i in 0..12 {
            let name = format!("c{i:02}");
            directory = directory.with_certificate("admin", certificate(&name));
        }
        let session = directory.open(&connection(), "admin").await.unwrap();

        let first = directory
            .list_certificates(&session, &CertificateQuery::new(1, 10))
            .await
            .unwrap();
        let second = directory
            .list_certificates(&session, &CertificateQuery::new(2, 10))
            .await
            .unwrap();
        let third = directory
            .list_certificates(&session, &CertificateQuery::new(3, 10))
            .await;

        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 2);
        assert!(matches!(third, Err(AviError::PageExhausted)));
    }

    #[tokio::test]
    async fn test_empty_listing_first_page() {
        let directory = InMemoryDirectory::new().with_tenant("empty");
        let session = directory.open(&connection(), "empty").await.unwrap();

        let page = directory
            .list_certificates(&session, &CertificateQuery::new(1, 10))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_search_filters_by_type() {
        let directory = InMemoryDirectory::new()
            .with_certificate("admin", certificate("leaf"))
            .with_certificate("admin", authority("ca", "CA"))
            .with_null_entry("admin");
        let session = directory.open(&connection(), "admin").await.unwrap();

        let page = directory
            .list_certificates(
                &session,
                &CertificateQuery::new(1, 10).search(CERTIFICATE_SEARCH),
            )
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(
            page[0].as_ref().unwrap().certificate_type.as_deref(),
            Some(VIRTUALSERVICE_TYPE)
        );
        assert!(page[1].is_none());
        assert_ne!(VIRTUALSERVICE_TYPE, CA_TYPE);
    }

    #[tokio::test]
    async fn test_sessions_and_failures() {
        let directory = InMemoryDirectory::new()
            .with_tenant("admin")
            .with_password("secret")
            .failing_open("locked")
            .failing_usage("admin");

        assert!(directory.open(&connection(), "locked").await.is_err());

        let mut wrong = connection();
        wrong.password = "nope".to_string();
        assert!(matches!(
            directory.open(&wrong, "admin").await,
            Err(AviError::Unauthorized(_))
        ));

        let session = directory.open(&connection(), "admin").await.unwrap();
        assert_eq!(session.handle(), &MemorySession { id: 1 });
        assert!(directory
            .virtual_services_referring_to(&session, "x")
            .await
            .is_err());
        assert_eq!(directory.open_sessions(), 1);

        directory.close(session).await;
        assert_eq!(directory.open_sessions(), 0);
        assert_eq!(directory.opened(), vec!["admin"]);

        let first = directory.open(&connection(), "admin").await.unwrap();
        let second = directory.open(&connection(), "admin").await.unwrap();
        directory.close(second).await;
        assert_eq!(directory.open_sessions(), 1);
        directory.close(first).await;
        assert_eq!(directory.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_usages_are_tenant_scoped() {
        let directory = InMemoryDirectory::new()
            .with_tenant("admin")
            .with_tenant("Venafi")
            .with_usage("admin", "cert-1", virtual_service("vs-a"));

        let admin = directory.open(&connection(), "admin").await.unwrap();
        let venafi = directory.open(&connection(), "Venafi").await.unwrap();

        assert_eq!(
            directory
                .virtual_services_referring_to(&admin, "cert-1")
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(directory
            .virtual_services_referring_to(&venafi, "cert-1")
            .await
            .unwrap()
            .is_empty());
    }
}
