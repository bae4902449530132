//! # Service Container
//!
//! Configuration plus the shared instances every session uses.
//!
//! - Key store, ledger and audit log are built once at startup
//! - Sessions receive them as trait objects (`Arc<dyn ...>`)

pub mod config;
pub mod services;

pub use config::{ConfigError, ServerConfig, DEV_AUDIT_KEY};
pub use services::TellerServices;
