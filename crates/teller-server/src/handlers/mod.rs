//! # Session Handlers
//!
//! - `session`: handshake then request loop for one connection
//! - `dispatcher`: action routing to the ledger and audit log

pub mod dispatcher;
pub mod session;

pub use dispatcher::Dispatcher;
pub use session::{run_session, SessionSummary};
