//! CA chain resolution with per-call memoization.

use crate::naming::{identifier_from_url, NameError};
use avi_core::{AviError, CertificateAuthority, DirectoryService, Session};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Why a chain was abandoned.
#[derive(Error, Debug)]
enum ChainError {
    #[error("null CA certificate in collection")]
    NullEntry,

    #[error("missing CA certificate reference")]
    MissingReference,

    #[error(r#"failed to retrieve CA certificate by name "{name}": {source}"#)]
    LookupByName {
        name: String,
        #[source]
        source: AviError,
    },

    #[error(r#"CA certificate named "{0}" has no reference"#)]
    NameWithoutReference(String),

    #[error("unable to parse CA certificate reference: {0}")]
    InvalidReference(#[from] NameError),

    #[error(
        r#"failed to retrieve CA certificate by reference "{reference}": {source}"#
    )]
    Fetch {
        reference: String,
        #[source]
        source: AviError,
    },

    #[error(r#"CA certificate reference "{0}" has no pem"#)]
    MissingPem(String),
}

/// Resolves CA references to PEM text, remembering every reference it has
/// fetched for the lifetime of the resolver.
///
/// One resolver is created per discovery call.
#[derive(Debug, Default)]
pub struct CaChainResolver {
    cache: HashMap<String, String>,
}

impl CaChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct references resolved so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Resolve `entries` into a PEM chain in their original order.
    ///
    /// Any entry that cannot be resolved abandons the whole chain: the
    /// failure is logged and an empty chain returned.
    pub async fn resolve<D: DirectoryService>(
        &mut self,
        directory: &D,
        session: &Session<D::Handle>,
        certificate_name: &str,
        entries: &[Option<CertificateAuthority>],
    ) -> Vec<String> {
        match self.try_resolve(directory, session, entries).await {
            Ok(chain) => chain,
            Err(err) => {
                info!(
                    tenant = session.tenant(),
                    name = certificate_name,
                    error = %err,
                    "abandoning CA chain for certificate"
                );
                Vec::new()
            }
        }
    }

    async fn try_resolve<D: DirectoryService>(
        &mut self,
        directory: &D,
        session: &Session<D::Handle>,
        entries: &[Option<CertificateAuthority>],
    ) -> Result<Vec<String>, ChainError> {
        let mut chain = Vec::with_capacity(entries.len());

        for entry in entries {
            let entry = entry.as_ref().ok_or(ChainError::NullEntry)?;
            let reference = Self::reference(directory, session, entry).await?;
            let id = identifier_from_url(&reference)?;

            if let Some(pem) = self.cache.get(&reference) {
                debug!(reference = %reference, "CA certificate cache hit");
                chain.push(pem.clone());
                continue;
            }

            let authority = directory
                .certificate_by_id(session, &id)
                .await
                .map_err(|source| ChainError::Fetch {
                    reference: reference.clone(),
                    source,
                })?;

            let pem = authority
                .pem()
                .filter(|pem| !pem.is_empty())
                .ok_or_else(|| ChainError::MissingPem(reference.clone()))?
                .to_string();

            self.cache.insert(reference, pem.clone());
            chain.push(pem);
        }

        Ok(chain)
    }

    /// The entry's reference, looked up by name when only the name is set.
    async fn reference<D: DirectoryService>(
        directory: &D,
        session: &Session<D::Handle>,
        entry: &CertificateAuthority,
    ) -> Result<String, ChainError> {
        if let Some(reference) = entry.ca_ref.as_deref().filter(|r| !r.is_empty()) {
            return Ok(reference.to_string());
        }

        let name = entry
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or(ChainError::MissingReference)?;

        let authority = directory
            .certificate_by_name(session, name)
            .await
            .map_err(|source| ChainError::LookupByName {
                name: name.to_string(),
                source,
            })?;

        authority
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ChainError::NameWithoutReference(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{authority, by_name, by_ref};
    use crate::memory::{InMemoryDirectory, MemorySession};
    use avi_core::Connection;

    async fn session(directory: &InMemoryDirectory) -> Session<MemorySession> {
        directory
            .open(&Connection::new("avi", "admin", "secret"), "admin")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_chain_preserves_order_and_memoizes() {
        let directory = InMemoryDirectory::new()
            .with_authority("admin", authority("ca-int", "INT"))
            .with_authority("admin", authority("ca-root", "ROOT"));
        let session = session(&directory).await;
        let mut resolver = CaChainResolver::new();

        let entries = vec![by_ref("ca-int"), by_ref("ca-root")];
        let first = resolver
            .resolve(&directory, &session, "leaf-1", &entries)
            .await;
        let second = resolver
            .resolve(&directory, &session, "leaf-2", &entries)
            .await;

        assert_eq!(first, vec!["INT", "ROOT"]);
        assert_eq!(second, first);
        assert_eq!(resolver.cached(), 2);
        assert_eq!(directory.authority_fetches("ca-int"), 1);
        assert_eq!(directory.authority_fetches("ca-root"), 1);
    }

    #[tokio::test]
    async fn test_mixed_cache_hits_keep_source_order() {
        let directory = InMemoryDirectory::new()
            .with_authority("admin", authority("ca-int", "INT"))
            .with_authority("admin", authority("ca-root", "ROOT"));
        let session = session(&directory).await;
        let mut resolver = CaChainResolver::new();

        resolver
            .resolve(&directory, &session, "leaf-1", &[by_ref("ca-root")])
            .await;
        let chain = resolver
            .resolve(
                &directory,
                &session,
                "leaf-2",
                &[by_ref("ca-int"), by_ref("ca-root")],
            )
            .await;

        assert_eq!(chain, vec!["INT", "ROOT"]);
        assert_eq!(directory.authority_fetches("ca-root"), 1);
    }

    #[tokio::test]
    async fn test_lookup_by_name() {
        let ca = authority("ca-int", "INT");
        let directory = InMemoryDirectory::new().with_authority("admin", ca);
        let session = session(&directory).await;
        let mut resolver = CaChainResolver::new();

        let chain = resolver
            .resolve(&directory, &session, "leaf", &[by_name("ca-int")])
            .await;
        assert_eq!(chain, vec!["INT"]);
    }

    #[tokio::test]
    async fn test_unresolvable_entries_abandon_chain() {
        let directory = InMemoryDirectory::new()
            .with_authority("admin", authority("ca-int", "INT"))
            .with_authority("admin", authority("ca-empty", ""));
        let session = session(&directory).await;
        let mut resolver = CaChainResolver::new();

        let cases = vec![
            vec![by_ref("ca-int"), None],
            vec![Some(CertificateAuthority::default())],
            vec![by_ref("ca-int"), by_ref("ca-missing")],
            vec![by_name("no-such-ca")],
            vec![by_ref("ca-empty")],
            vec![Some(CertificateAuthority {
                ca_ref: Some("https://avi".to_string()),
                name: None,
            })],
        ];

        for case in cases {
            let chain = resolver.resolve(&directory, &session, "leaf", &case).await;
            assert!(chain.is_empty(), "expected abandoned chain for {case:?}");
        }
    }

    #[tokio::test]
    async fn test_no_entries_is_empty_chain() {
        let directory = InMemoryDirectory::new();
        let session = session(&directory).await;
        let mut resolver = CaChainResolver::new();

        let chain = resolver.resolve(&directory, &session, "leaf", &[]).await;
        assert!(chain.is_empty());
        assert_eq!(directory.total_authority_fetches(), 0);
    }
}
