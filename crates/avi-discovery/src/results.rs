//! Per-call accumulation of discovered certificates.

use avi_core::DiscoveredCertificate;

/// Discovered certificates grouped by tenant, in discovery order.
#[derive(Debug, Default)]
pub struct TenantResultSet {
    discovered: usize,
    tenants: Vec<(String, Vec<DiscoveredCertificate>)>,
}

impl TenantResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of certificates accumulated so far.
    pub const fn discovered(&self) -> usize {
        self.discovered
    }

    /// Add certificates found in `tenant`, after any already held for it.
    pub fn append(&mut self, tenant: &str, certificates: Vec<DiscoveredCertificate>) {
        self.discovered += certificates.len();

        match self.tenants.iter_mut().find(|(name, _)| name == tenant) {
            Some((_, existing)) => existing.extend(certificates),
            None => self.tenants.push((tenant.to_string(), certificates)),
        }
    }

    /// Certificates found for `tenant`.
    pub fn tenant(&self, tenant: &str) -> Option<&[DiscoveredCertificate]> {
        self.tenants
            .iter()
            .find(|(name, _)| name == tenant)
            .map(|(_, certificates)| certificates.as_slice())
    }

    /// Flatten into a single list, tenants in the order they were scanned.
    pub fn collapse(self) -> Vec<DiscoveredCertificate> {
        let mut collapsed = Vec::with_capacity(self.discovered);
        for (_, certificates) in self.tenants {
            collapsed.extend(certificates);
        }
        collapsed
    }
}
