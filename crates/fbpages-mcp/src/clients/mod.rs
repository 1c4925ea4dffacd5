//! Remote API client modules.
//!
//! This module provides the HTTP client for the Facebook Graph API and the
//! configuration it is built from. The client handles authentication and
//! maps Graph error bodies into typed errors.

pub mod config;
pub mod graph;

pub use config::{ConfigError, GraphConfig, RemoteCredential};
pub use graph::{GraphClient, GraphError};
