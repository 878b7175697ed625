//! Entry point for discovery and connection checks.

use crate::error::{DiscoveryError, Result};
use crate::iterator::TenantIterator;
use crate::naming::Identified;
use crate::ordering::{parse_tenant_list, sort_tenants};
use avi_core::{
    Connection, DirectoryService, DiscoverCertificatesRequest, DiscoverCertificatesResponse,
    DiscoveryConfiguration, DEFAULT_TENANT,
};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

/// Certificate discovery over a [`DirectoryService`].
///
/// The service holds no per-call state, so one instance can serve
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct DiscoveryService<D> {
    directory: D,
}

impl<D: DirectoryService> DiscoveryService<D> {
    pub const fn new(directory: D) -> Self {
        Self { directory }
    }

    pub const fn directory(&self) -> &D {
        &self.directory
    }

    /// Check that a session can be opened with `connection`.
    #[instrument(
        skip_all,
        fields(
            host = %connection.hostname_or_address,
            port = connection.effective_port(),
        )
    )]
    pub async fn test_connection(&self, connection: &Connection) -> Result<()> {
        let session = self
            .directory
            .open(connection, DEFAULT_TENANT)
            .await
            .map_err(|source| DiscoveryError::Connect {
                tenant: DEFAULT_TENANT.to_string(),
                source,
            })?;
        self.directory.close(session).await;

        info!("connected to controller");
        Ok(())
    }

    /// Discover up to `maxResults` certificates, resuming from the
    /// request's discovery page.
    #[instrument(
        skip_all,
        fields(
            host = %request.connection.hostname_or_address,
            max_results = request.control.max_results,
            resume_tenant = request.page.as_ref().and_then(|p| p.tenant.as_deref()),
        )
    )]
    pub async fn discover(
        &self,
        request: &DiscoverCertificatesRequest,
    ) -> Result<DiscoverCertificatesResponse> {
        self.discover_at(request, Utc::now()).await
    }

    /// [`discover`](Self::discover), judging expiry against `now`.
    pub async fn discover_at(
        &self,
        request: &DiscoverCertificatesRequest,
        now: DateTime<Utc>,
    ) -> Result<DiscoverCertificatesResponse> {
        let budget = request.control.max_results;
        if budget == 0 {
            return Err(DiscoveryError::InvalidRequest(
                "discoveryControl.maxResults must be greater than zero".to_string(),
            ));
        }

        let tenants = self
            .working_set(&request.connection, &request.configuration)
            .await?;

        let walk = TenantIterator::new(
            &self.directory,
            &request.connection,
            &request.configuration,
            budget,
            now,
        )
        .walk(&tenants, request.page.as_ref())
        .await?;

        let messages = walk.results.collapse();
        info!(
            tenants = tenants.len(),
            discovered = messages.len(),
            complete = walk.cursor.is_none(),
            "discovery call finished"
        );

        Ok(DiscoverCertificatesResponse {
            page: walk.cursor,
            messages,
        })
    }

    /// Tenants to scan, sorted case-insensitively.
    async fn working_set(
        &self,
        connection: &Connection,
        configuration: &DiscoveryConfiguration,
    ) -> Result<Vec<String>> {
        let mut tenants = parse_tenant_list(&configuration.tenants);

        if tenants.is_empty() {
            tenants = self.catalog(connection).await?;
        }

        sort_tenants(&mut tenants);
        Ok(tenants)
    }

    /// Every named tenant the user can see.
    async fn catalog(&self, connection: &Connection) -> Result<Vec<String>> {
        let session = self
            .directory
            .open(connection, DEFAULT_TENANT)
            .await
            .map_err(|source| DiscoveryError::Connect {
                tenant: DEFAULT_TENANT.to_string(),
                source,
            })?;
        let catalog = self.directory.tenants(&session).await;
        self.directory.close(session).await;

        Ok(catalog
            .map_err(DiscoveryError::Tenants)?
            .iter()
            .filter_map(|tenant| {
                let name = tenant.name().map(ToString::to_string);
                if name.is_none() {
                    info!(tenant = %tenant.display_name(), "skipping tenant without a name");
                }
                name
            })
            .collect())
    }
}
