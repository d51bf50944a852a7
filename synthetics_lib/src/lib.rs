//! New Relic Synthetics API client library.
//!
//! Provides a typed client for the Synthetics REST API (v3): monitors and
//! their scripts.

pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod secret;
pub mod types;

pub use client::Client;
pub use config::{ClientConfig, API_KEY_ENV, BASE_URL, BASE_URL_ENV};
pub use error::{ApiError, AuthError, Error};
pub use helpers::{get_api_key, monitor_id_from_location, ApiKeySource};
pub use secret::{SecretBackend, SecretCommand};
pub use types::{
    CreateMonitorArgs, Monitor, MonitorListResponse, MonitorOptions, MonitorStatus, MonitorType,
    UpdateMonitorArgs, UpdateMonitorScriptArgs,
};

/// Library version for User-Agent and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
