//! # Shared Types Crate
//!
//! Identities, request/response payloads and audit records shared by the
//! server, the client and the collaborator crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every payload that crosses the wire or a
//!   crate boundary is defined here.
//! - **Validated Identities**: an `Identity` can only be built through
//!   `Identity::new`, so downstream code never re-checks it.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
