//! Virtual service cross-reference for a certificate.

use crate::error::{DiscoveryError, Result};
use crate::naming::Identified;
use avi_core::{DirectoryService, MachineIdentity, Session};
use tracing::{debug, info};

/// Every virtual service using the certificate, as machine identities.
///
/// Services without a name are skipped. A failed lookup aborts discovery.
pub(crate) async fn machine_identities<D: DirectoryService>(
    directory: &D,
    session: &Session<D::Handle>,
    certificate_name: &str,
    certificate_id: &str,
) -> Result<Vec<MachineIdentity>> {
    let tenant = session.tenant();

    let services = directory
        .virtual_services_referring_to(session, certificate_id)
        .await
        .map_err(|source| DiscoveryError::VirtualServices {
            tenant: tenant.to_string(),
            certificate: certificate_name.to_string(),
            source,
        })?;

    let identities: Vec<_> = services
        .iter()
        .filter_map(|service| match service.name() {
            Some(name) => Some(MachineIdentity::new(tenant, certificate_name, name)),
            None => {
                info!(
                    tenant,
                    certificate = certificate_name,
                    service = %service.display_name(),
                    "skipping virtual service without a name"
                );
                None
            }
        })
        .collect();

    debug!(
        tenant,
        certificate = certificate_name,
        usages = identities.len(),
        "resolved certificate usage"
    );

    Ok(identities)
}
