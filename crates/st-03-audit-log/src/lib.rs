//! # Audit Log
//!
//! Append-only record of every request a session dispatched.
//!
//! Each record `{customer_id, action, timestamp}` is encrypted with the
//! service's audit key before it reaches disk. Only the service can read the
//! trail back, and only through `AuditReader`, which silently drops entries
//! it cannot decrypt or parse.
//!
//! ## Adapters
//!
//! | Adapter | Storage | Encrypted |
//! |---------|---------|-----------|
//! | `FileAuditLog` | `<dir>/<identity>.enc`, hex line per record | yes |
//! | `InMemoryAuditLog` | `Vec` | no |

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{FileAuditLog, InMemoryAuditLog};
pub use domain::{format_entry, record_now, AuditError, TIMESTAMP_FORMAT};
pub use ports::{AuditReader, AuditSink};
