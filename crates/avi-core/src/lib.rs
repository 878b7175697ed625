//! Core types and traits for NSX-ALB certificate discovery.
//!
//! This crate provides the foundational types used across the connector:
//!
//! - **Types**: the discovery wire contract and the controller object model
//! - **Directory**: the [`DirectoryService`] capability the discovery engine scans through
//! - **Errors**: remote failures expressed as [`AviError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use avi_core::{DirectoryService, Connection, Result};
//!
//! async fn count_tenants<D: DirectoryService>(directory: &D, connection: &Connection) -> Result<usize> {
//!     let session = directory.open(connection, avi_core::DEFAULT_TENANT).await?;
//!     let tenants = directory.tenants(&session).await;
//!     directory.close(session).await;
//!     Ok(tenants?.len())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/avi-core/1.0.0")]

mod directory;
mod error;
pub mod types;

pub use directory::{CertificateQuery, DirectoryService, Session, DEFAULT_TENANT};
pub use error::{is_no_results_message, AviError, Result};
pub use types::*;
