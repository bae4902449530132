//! Audit record rules and line codec.

pub mod errors;
pub mod record;

pub use errors::AuditError;
pub use record::{format_entry, open_record, record_now, seal_record, TIMESTAMP_FORMAT};
