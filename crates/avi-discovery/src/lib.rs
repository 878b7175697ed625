//! Certificate discovery across the tenants of an NSX Advanced Load Balancer.
//!
//! A discovery call walks tenants in case-insensitive order, lists each
//! tenant's certificates page by page, resolves every certificate's CA chain
//! and the virtual services using it, and stops once the caller's budget is
//! spent. The returned [`DiscoveryPage`](avi_core::DiscoveryPage) resumes the
//! walk on the next call; its absence means discovery is complete.
//!
//! # Architecture
//!
//! ```text
//! DiscoveryService::discover
//!   └─ TenantIterator            one session per tenant, running budget
//!        └─ TenantScanner        pages of 10, filters, resumption token
//!             ├─ CaChainResolver memoized CA lookups
//!             └─ usage           virtual service cross-reference
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use avi_client::AviClient;
//! use avi_discovery::DiscoveryService;
//!
//! let service = DiscoveryService::new(AviClient::builder().build()?);
//! let response = service.discover(request).await?;
//! println!("{} certificates, complete: {}", response.messages.len(), response.is_complete());
//! ```

#![doc(html_root_url = "https://docs.rs/avi-discovery/1.0.0")]

mod ca_chain;
mod error;
mod expiry;
mod iterator;
pub mod memory;
pub mod naming;
mod ordering;
mod results;
mod scanner;
mod service;
mod usage;

#[cfg(test)]
mod fixtures;

pub use ca_chain::CaChainResolver;
pub use error::{DiscoveryError, Result};
pub use memory::{InMemoryDirectory, MemorySession};
pub use ordering::{compare_case_insensitive, parse_tenant_list, sort_tenants};
pub use results::TenantResultSet;
pub use scanner::{CERTIFICATE_SEARCH, PAGE_SIZE};
pub use service::DiscoveryService;
