//! # Ports Layer
//!
//! The teller appends through `AuditSink` and lists entries through
//! `AuditReader`. Encryption is the implementation's concern.

use async_trait::async_trait;
use shared_types::{AuditRecord, Identity};

use crate::domain::AuditError;

/// Append-only audit destination.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one record. Concurrent appends never interleave.
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Reads back one identity's trail.
#[async_trait]
pub trait AuditReader: Send + Sync {
    /// All readable records for `identity`, oldest first. Entries that fail
    /// to decode are skipped.
    async fn read_all(&self, identity: &Identity) -> Result<Vec<AuditRecord>, AuditError>;
}
