//! [`DirectoryService`] backed by the controller REST API.

use crate::{AviClient, AviSession};
use async_trait::async_trait;
use avi_core::{
    CertificateQuery, Connection, DirectoryService, Result, Session, SslKeyAndCertificate, Tenant,
    VirtualService,
};
use tracing::instrument;

#[async_trait]
impl DirectoryService for AviClient {
    type Handle = AviSession;

    async fn open(&self, connection: &Connection, tenant: &str) -> Result<Session<AviSession>> {
        self.login(connection, tenant).await
    }

    async fn close(&self, session: Session<AviSession>) {
        self.logout(session).await;
    }

    #[instrument(
        skip(self, session),
        fields(tenant = session.tenant(), page = query.page)
    )]
    async fn list_certificates(
        &self,
        session: &Session<AviSession>,
        query: &CertificateQuery,
    ) -> Result<Vec<Option<SslKeyAndCertificate>>> {
        let mut request = self
            .certificates(session)
            .list()
            .page(query.page)
            .page_size(query.page_size);

        if let Some(ref search) = query.search {
            request = request.search(search.as_str());
        }

        request.send().await
    }

    async fn certificate_by_id(
        &self,
        session: &Session<AviSession>,
        id: &str,
    ) -> Result<SslKeyAndCertificate> {
        self.certificates(session).get(id).await
    }

    async fn certificate_by_name(
        &self,
        session: &Session<AviSession>,
        name: &str,
    ) -> Result<SslKeyAndCertificate> {
        self.certificates(session).get_by_name(name).await
    }

    async fn virtual_services_referring_to(
        &self,
        session: &Session<AviSession>,
        certificate_id: &str,
    ) -> Result<Vec<VirtualService>> {
        self.virtual_services(session)
            .referring_to_certificate(certificate_id)
            .await
    }

    async fn tenants(&self, session: &Session<AviSession>) -> Result<Vec<Tenant>> {
        self.tenants(session).list().await
    }
}
