//! HTTP client for the NSX Advanced Load Balancer controller API.
//!
//! This crate provides [`AviClient`], which logs in to a controller, scopes
//! sessions to a tenant and implements [`avi_core::DirectoryService`] for the
//! discovery engine.

#![doc(html_root_url = "https://docs.rs/avi-client/1.0.0")]

pub mod api;
mod client;
mod config;
mod directory;
mod session;

pub use avi_core::{AviError, Result};
pub use client::{AviClient, AviClientBuilder};
pub use config::*;
pub use session::AviSession;
