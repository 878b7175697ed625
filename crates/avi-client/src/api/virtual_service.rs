//! Virtual service endpoints.

use crate::{AviClient, AviSession};
use avi_core::{Result, Session, VirtualService};

/// Virtual service API endpoints
pub struct VirtualServiceApi<'a> {
    client: &'a AviClient,
    session: &'a Session<AviSession>,
}

impl<'a> VirtualServiceApi<'a> {
    pub(crate) const fn new(client: &'a AviClient, session: &'a Session<AviSession>) -> Self {
        Self { client, session }
    }

    /// Virtual services whose configuration refers to the given certificate
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let services = client
    ///     .virtual_services(&session)
    ///     .referring_to_certificate("sslkeyandcertificate-0a1b")
    ///     .await?;
    /// ```
    pub async fn referring_to_certificate(
        &self,
        certificate_id: &str,
    ) -> Result<Vec<VirtualService>> {
        let refers_to = format!("sslkeyandcertificate:{certificate_id}");

        self.client
            .get_all(
                self.session,
                "/api/virtualservice",
                &[("refers_to", refers_to.as_str())],
            )
            .await
    }
}
