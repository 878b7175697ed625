//! API endpoint modules.

mod certificate;
mod tenant;
mod virtual_service;

pub use certificate::{CertificateApi, CertificateListBuilder};
pub use tenant::TenantApi;
pub use virtual_service::VirtualServiceApi;
