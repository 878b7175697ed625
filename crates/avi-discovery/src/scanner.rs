//! Page-by-page certificate scan of a single tenant.

use crate::ca_chain::CaChainResolver;
use crate::error::{DiscoveryError, Result};
use crate::expiry;
use crate::naming::Identified;
use crate::usage::machine_identities;
use avi_core::{
    AviError, CertificateQuery, DirectoryService, DiscoveredCertificate, DiscoveryConfiguration,
    Session, SslKeyAndCertificate,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Certificates requested per page
pub const PAGE_SIZE: usize = 10;

/// Server-side filter selecting leaf certificates
pub const CERTIFICATE_SEARCH: &str =
    "(type,SSL_CERTIFICATE_TYPE_SYSTEM)|(type,SSL_CERTIFICATE_TYPE_VIRTUALSERVICE)";

const PAGINATOR_VERSION: u32 = 1;

/// Position within a tenant's listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Paginator {
    v: u32,
    page: usize,
    index: usize,
}

impl Paginator {
    const fn start() -> Self {
        Self {
            v: PAGINATOR_VERSION,
            page: 1,
            index: 0,
        }
    }

    /// Decode a token, restarting the tenant if it is unusable.
    fn decode(token: &str) -> Self {
        if token.trim().is_empty() {
            return Self::start();
        }

        match serde_json::from_str::<Self>(token) {
            Ok(p) if p.v == PAGINATOR_VERSION && p.page >= 1 && p.index <= PAGE_SIZE => p,
            Ok(p) => {
                warn!(
                    version = p.v,
                    page = p.page,
                    index = p.index,
                    "discarding out of range paginator, restarting tenant"
                );
                Self::start()
            }
            Err(e) => {
                warn!(error = %e, "discarding malformed paginator, restarting tenant");
                Self::start()
            }
        }
    }

    fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Outcome of scanning one tenant.
#[derive(Debug)]
pub(crate) struct TenantScan {
    /// The tenant has no certificates left to visit
    pub finished: bool,

    pub certificates: Vec<DiscoveredCertificate>,

    /// Resumption token, empty once finished
    pub token: String,
}

impl TenantScan {
    fn finished(certificates: Vec<DiscoveredCertificate>) -> Self {
        Self {
            finished: true,
            certificates,
            token: String::new(),
        }
    }
}

/// Scans tenants on behalf of one discovery call.
pub(crate) struct TenantScanner<'a, D> {
    directory: &'a D,
    configuration: &'a DiscoveryConfiguration,
    ca_chains: &'a mut CaChainResolver,
    now: DateTime<Utc>,
}

impl<'a, D: DirectoryService> TenantScanner<'a, D> {
    pub fn new(
        directory: &'a D,
        configuration: &'a DiscoveryConfiguration,
        ca_chains: &'a mut CaChainResolver,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            directory,
            configuration,
            ca_chains,
            now,
        }
    }

    /// Scan the session's tenant from `token` until it is drained or
    /// `remaining` certificates have been accepted.
    pub async fn scan(
        &mut self,
        session: &Session<D::Handle>,
        remaining: usize,
        token: &str,
    ) -> Result<TenantScan> {
        let tenant = session.tenant();
        let mut position = Paginator::decode(token);
        let mut certificates = Vec::new();

        loop {
            let query = CertificateQuery::new(position.page, PAGE_SIZE).search(CERTIFICATE_SEARCH);
            let page = match self.directory.list_certificates(session, &query).await {
                Ok(page) => page,
                Err(AviError::PageExhausted) => {
                    debug!(tenant, page = position.page, "no more certificate pages");
                    return Ok(TenantScan::finished(certificates));
                }
                Err(source) => {
                    return Err(DiscoveryError::ListCertificates {
                        tenant: tenant.to_string(),
                        source,
                    });
                }
            };

            debug!(
                tenant,
                page = position.page,
                index = position.index,
                entries = page.len(),
                "scanning certificate page"
            );

            while let Some(entry) = page.get(position.index) {
                position.index += 1;

                let Some(discovered) = self.discover(session, entry.as_ref()).await? else {
                    continue;
                };
                certificates.push(discovered);

                if certificates.len() >= remaining {
                    return Ok(TenantScan {
                        finished: false,
                        certificates,
                        token: position.encode()?,
                    });
                }
            }

            if page.len() < PAGE_SIZE {
                return Ok(TenantScan::finished(certificates));
            }

            position.page += 1;
            position.index = 0;
        }
    }

    /// Build the record for one listing entry, or `None` if it is skipped.
    async fn discover(
        &mut self,
        session: &Session<D::Handle>,
        entry: Option<&SslKeyAndCertificate>,
    ) -> Result<Option<DiscoveredCertificate>> {
        let tenant = session.tenant();

        let Some(certificate) = entry else {
            info!(tenant, "skipping null certificate entry");
            return Ok(None);
        };

        let Some(name) = certificate.name() else {
            info!(
                tenant,
                certificate = %certificate.display_name(),
                "skipping certificate without a name"
            );
            return Ok(None);
        };

        let Some(body) = certificate.certificate.as_ref() else {
            info!(tenant, name, "skipping certificate without content");
            return Ok(None);
        };

        if self.configuration.exclude_expired_certificates {
            match expiry::is_expired(body, self.now) {
                Ok(false) => {}
                Ok(true) => {
                    debug!(tenant, name, "skipping expired certificate");
                    return Ok(None);
                }
                Err(e) => {
                    info!(tenant, name, error = %e, "skipping certificate with unknown expiry");
                    return Ok(None);
                }
            }
        }

        let Some(pem) = body.certificate.as_deref().filter(|pem| !pem.is_empty()) else {
            info!(tenant, name, "skipping certificate without a pem");
            return Ok(None);
        };

        let id = match certificate.identifier() {
            Ok(id) => id,
            Err(e) => {
                info!(tenant, name, error = %e, "skipping certificate without an identifier");
                return Ok(None);
            }
        };

        let directory = self.directory;
        let chain = self
            .ca_chains
            .resolve(directory, session, name, certificate.ca_entries())
            .await;
        let identities = machine_identities(directory, session, name, &id).await?;

        if self.configuration.exclude_inactive_certificates && identities.is_empty() {
            debug!(
                tenant,
                name,
                "skipping certificate not used by any virtual service"
            );
            return Ok(None);
        }

        Ok(Some(DiscoveredCertificate {
            certificate: pem.to_string(),
            certificate_chain: chain,
            installations: Vec::new(),
            machine_identities: identities,
        }))
    }
}
