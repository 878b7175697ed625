//! Walks the ordered tenant working set under the call's budget.

use crate::ca_chain::CaChainResolver;
use crate::error::{DiscoveryError, Result};
use crate::ordering::{compare_case_insensitive, eq_case_insensitive};
use crate::results::TenantResultSet;
use crate::scanner::TenantScanner;
use avi_core::{Connection, DirectoryService, DiscoveryConfiguration, DiscoveryPage};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::{info, warn};

/// Results of one walk and where the next call should resume.
#[derive(Debug)]
pub(crate) struct Walk {
    pub results: TenantResultSet,
    pub cursor: Option<DiscoveryPage>,
}

pub(crate) struct TenantIterator<'a, D> {
    directory: &'a D,
    connection: &'a Connection,
    configuration: &'a DiscoveryConfiguration,
    budget: usize,
    now: DateTime<Utc>,
}

impl<'a, D: DirectoryService> TenantIterator<'a, D> {
    pub const fn new(
        directory: &'a D,
        connection: &'a Connection,
        configuration: &'a DiscoveryConfiguration,
        budget: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            directory,
            connection,
            configuration,
            budget,
            now,
        }
    }

    /// Scan `tenants`, already sorted, starting where `cursor` left off.
    pub async fn walk(&self, tenants: &[String], cursor: Option<&DiscoveryPage>) -> Result<Walk> {
        let mut results = TenantResultSet::new();

        let Some((start, mut token)) = resume_point(tenants, cursor) else {
            info!("cursor is past the last tenant, nothing left to discover");
            return Ok(Walk {
                results,
                cursor: None,
            });
        };

        let mut ca_chains = CaChainResolver::new();

        for tenant in &tenants[start..] {
            let token = std::mem::take(&mut token);
            let remaining = self.budget.saturating_sub(results.discovered());

            let session = self
                .directory
                .open(self.connection, tenant)
                .await
                .map_err(|source| DiscoveryError::Connect {
                    tenant: tenant.clone(),
                    source,
                })?;

            let scan = TenantScanner::new(
                self.directory,
                self.configuration,
                &mut ca_chains,
                self.now,
            )
            .scan(&session, remaining, &token)
            .await;
            self.directory.close(session).await;
            let scan = scan?;

            info!(
                tenant = %tenant,
                discovered = scan.certificates.len(),
                finished = scan.finished,
                "scanned tenant"
            );
            results.append(tenant, scan.certificates);

            if !scan.finished {
                return Ok(Walk {
                    results,
                    cursor: Some(DiscoveryPage::new(tenant.as_str(), scan.token)),
                });
            }
        }

        Ok(Walk {
            results,
            cursor: None,
        })
    }
}

/// Index of the first tenant to scan and the token to scan it with.
///
/// Tenants ordering before the cursor tenant were already covered. The
/// saved token only applies to a tenant equal to the cursor tenant; any
/// other tenant starts from its first page. `None` means every tenant was
/// already covered.
fn resume_point(tenants: &[String], cursor: Option<&DiscoveryPage>) -> Option<(usize, String)> {
    let Some(page) = cursor.filter(|page| !page.is_empty()) else {
        return Some((0, String::new()));
    };

    let Some(cursor_tenant) = page.tenant.as_deref().filter(|t| !t.is_empty()) else {
        warn!("discovery page has a paginator but no tenant, starting over");
        return Some((0, String::new()));
    };

    let start = tenants
        .iter()
        .position(|t| compare_case_insensitive(t, cursor_tenant) != Ordering::Less)?;

    if eq_case_insensitive(&tenants[start], cursor_tenant) {
        Some((start, page.paginator.clone()))
    } else {
        warn!(
            cursor_tenant,
            resume_tenant = %tenants[start],
            "cursor tenant is not in the working set, resuming at the next tenant"
        );
        Some((start, String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::certificate;
    use crate::memory::InMemoryDirectory;

    fn tenants(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_resume_point_without_cursor() {
        let working = tenants(&["admin", "Venafi"]);
        assert_eq!(resume_point(&working, None), Some((0, String::new())));
        assert_eq!(
            resume_point(&working, Some(&DiscoveryPage::default())),
            Some((0, String::new()))
        );
    }

    #[test]
    fn test_resume_point_matches_case_insensitively() {
        let working = tenants(&["admin", "beta", "Venafi"]);
        let cursor = DiscoveryPage::new("VENAFI", "token");
        assert_eq!(
            resume_point(&working, Some(&cursor)),
            Some((2, "token".to_string()))
        );
    }

    #[test]
    fn test_resume_point_unknown_tenant() {
        let working = tenants(&["admin", "Venafi"]);

        let between = DiscoveryPage::new("beta", "token");
        assert_eq!(
            resume_point(&working, Some(&between)),
            Some((1, String::new()))
        );

        let after = DiscoveryPage::new("zulu", "token");
        assert_eq!(resume_point(&working, Some(&after)), None);
    }

    #[test]
    fn test_resume_point_paginator_without_tenant() {
        let working = tenants(&["admin", "Venafi"]);
        let cursor = DiscoveryPage {
            tenant: None,
            paginator: r#"{"v":1,"page":2,"index":0}"#.to_string(),
        };
        assert_eq!(
            resume_point(&working, Some(&cursor)),
            Some((0, String::new()))
        );
    }

    #[tokio::test]
    async fn test_walk_closes_each_session_before_the_next() {
        let directory = InMemoryDirectory::new()
            .with_certificate("admin", certificate("a"))
            .with_certificate("Venafi", certificate("v"));
        let connection = Connection::new("avi", "u", "p");
        let configuration = DiscoveryConfiguration::default();
        let working = tenants(&["admin", "Venafi"]);

        let walk = TenantIterator::new(&directory, &connection, &configuration, 10, Utc::now())
            .walk(&working, None)
            .await
            .unwrap();

        assert!(walk.cursor.is_none());
        assert_eq!(walk.results.discovered(), 2);
        assert_eq!(directory.opened(), vec!["admin", "Venafi"]);
        assert_eq!(directory.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_walk_stops_mid_tenant() {
        let directory = InMemoryDirectory::new()
            .with_certificate("admin", certificate("a1"))
            .with_certificate("admin", certificate("a2"))
            .with_certificate("Venafi", certificate("v1"));
        let connection = Connection::new("avi", "u", "p");
        let configuration = DiscoveryConfiguration::default();
        let working = tenants(&["admin", "Venafi"]);

        let walk = TenantIterator::new(&directory, &connection, &configuration, 1, Utc::now())
            .walk(&working, None)
            .await
            .unwrap();

        assert_eq!(
            walk.cursor,
            Some(DiscoveryPage::new("admin", r#"{"v":1,"page":1,"index":1}"#))
        );
        assert_eq!(directory.opened(), vec!["admin"]);
    }

    #[tokio::test]
    async fn test_open_failure_names_tenant() {
        let directory = InMemoryDirectory::new()
            .with_certificate("admin", certificate("a"))
            .with_tenant("locked")
            .failing_open("locked");
        let connection = Connection::new("avi", "u", "p");
        let configuration = DiscoveryConfiguration::default();
        let working = tenants(&["admin", "locked"]);

        let err = TenantIterator::new(&directory, &connection, &configuration, 10, Utc::now())
            .walk(&working, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::Connect { .. }));
        assert_eq!(err.tenant(), Some("locked"));
        assert_eq!(directory.open_sessions(), 0);
    }
}
