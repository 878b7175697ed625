//! Tenant endpoints.

use crate::{AviClient, AviSession};
use avi_core::{Result, Session, Tenant};

/// Tenant API endpoints
pub struct TenantApi<'a> {
    client: &'a AviClient,
    session: &'a Session<AviSession>,
}

impl<'a> TenantApi<'a> {
    pub(crate) const fn new(client: &'a AviClient, session: &'a Session<AviSession>) -> Self {
        Self { client, session }
    }

    /// List every tenant visible to the session's user
    pub async fn list(&self) -> Result<Vec<Tenant>> {
        self.client.get_all(self.session, "/api/tenant", &[]).await
    }
}
