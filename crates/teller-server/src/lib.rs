//! # Teller Server Library
//!
//! Exposes the server's modules for the binary and for end-to-end tests.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, TOML file, environment)
//! 2. Validate the audit key when running in production mode
//! 3. Load the key store, open the audit directory, seed the ledger
//! 4. Bind the listener and accept connections
//! 5. Stop accepting on Ctrl+C

#![allow(clippy::type_complexity)]

pub mod container;
pub mod handlers;
pub mod runtime;

pub use container::{ConfigError, ServerConfig, TellerServices};
pub use handlers::{run_session, Dispatcher, SessionSummary};
pub use runtime::TellerRuntime;
