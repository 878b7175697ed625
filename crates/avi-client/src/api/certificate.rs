//! SSL key and certificate endpoints.

use crate::{AviClient, AviSession};
use avi_core::{AviError, Collection, Result, Session, SslKeyAndCertificate};

const PATH: &str = "/api/sslkeyandcertificate";

/// Certificate API endpoints
///
/// Private keys are never requested (`export_key=false`).
pub struct CertificateApi<'a> {
    client: &'a AviClient,
    session: &'a Session<AviSession>,
}

impl<'a> CertificateApi<'a> {
    pub(crate) const fn new(client: &'a AviClient, session: &'a Session<AviSession>) -> Self {
        Self { client, session }
    }

    /// List one page of certificates
    #[must_use]
    pub fn list(&self) -> CertificateListBuilder<'a> {
        CertificateListBuilder::new(self.client, self.session)
    }

    /// Get a certificate by identifier
    pub async fn get(&self, uuid: &str) -> Result<SslKeyAndCertificate> {
        self.client
            .get_with_query(
                self.session,
                &format!("{PATH}/{uuid}"),
                &[("export_key", "false")],
            )
            .await
    }

    /// Get a certificate by object name
    pub async fn get_by_name(&self, name: &str) -> Result<SslKeyAndCertificate> {
        let collection: Collection<SslKeyAndCertificate> = self
            .client
            .get_with_query(
                self.session,
                PATH,
                &[("name", name), ("export_key", "false")],
            )
            .await?;

        collection
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AviError::NotFound {
                resource: format!("sslkeyandcertificate named {name}"),
            })
    }
}

/// Builder for a certificate listing page
pub struct CertificateListBuilder<'a> {
    client: &'a AviClient,
    session: &'a Session<AviSession>,
    page: usize,
    page_size: Option<usize>,
    search: Option<String>,
}

impl<'a> CertificateListBuilder<'a> {
    const fn new(client: &'a AviClient, session: &'a Session<AviSession>) -> Self {
        Self {
            client,
            session,
            page: 1,
            page_size: None,
            search: None,
        }
    }

    /// Set the 1-based page number
    #[must_use]
    pub const fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Set the number of objects per page
    #[must_use]
    pub const fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Restrict results with a search expression such as `(type,SSL_CERTIFICATE_TYPE_SYSTEM)`
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Execute the request
    ///
    /// Null entries are kept as `None`. Requesting a page past the end fails
    /// with [`AviError::PageExhausted`].
    pub async fn send(self) -> Result<Vec<Option<SslKeyAndCertificate>>> {
        let page_str = self.page.to_string();
        let mut params = vec![("export_key", "false"), ("page", page_str.as_str())];

        let size_str;
        if let Some(size) = self.page_size {
            size_str = size.to_string();
            params.push(("page_size", size_str.as_str()));
        }

        if let Some(ref search) = self.search {
            params.push(("search", search.as_str()));
        }

        let collection: Collection<Option<SslKeyAndCertificate>> = self
            .client
            .get_with_query(self.session, PATH, &params)
            .await?;

        Ok(collection.results)
    }
}
