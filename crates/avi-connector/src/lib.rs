//! # avi-connector
//!
//! HTTP connector exposing NSX Advanced Load Balancer certificate discovery
//! to a certificate management platform.
//!
//! ## Endpoints
//!
//! - `GET /healthz`: liveness
//! - `POST /v1/testconnection`: check controller credentials
//! - `POST /v1/discovercertificates`: one budgeted discovery page

pub mod cli;
pub mod config;
mod error;
pub mod routes;
pub mod server;
pub mod telemetry;

pub use cli::run;
pub use config::ConnectorConfig;
pub use error::{ConnectorError, Result};
