//! Tenant working-set parsing and ordering.

use std::cmp::Ordering;

/// Compare two names by their Unicode lower-case forms, ignoring locale.
///
/// A name that is a prefix of another orders first.
pub fn compare_case_insensitive(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Returns true if two names differ only in case.
pub fn eq_case_insensitive(a: &str, b: &str) -> bool {
    compare_case_insensitive(a, b) == Ordering::Equal
}

/// Sort tenants case-insensitively; names equal ignoring case keep their order.
pub fn sort_tenants(tenants: &mut [String]) {
    tenants.sort_by(|a, b| compare_case_insensitive(a, b));
}

/// Parse a comma-separated tenant allow-list.
///
/// Entries are trimmed, empty entries dropped and repeats removed, keeping
/// the first occurrence.
pub fn parse_tenant_list(list: &str) -> Vec<String> {
    let mut tenants: Vec<String> = Vec::new();

    for tenant in list.split(',').map(str::trim) {
        if !tenant.is_empty() && !tenants.iter().any(|t| t == tenant) {
            tenants.push(tenant.to_string());
        }
    }

    tenants
}
