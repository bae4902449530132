use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{AuditRecord, Identity};

use crate::domain::AuditError;
use crate::ports::{AuditReader, AuditSink};

/// Unencrypted in-process log, for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record appended so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl AuditReader for InMemoryAuditLog {
    async fn read_all(&self, identity: &Identity) -> Result<Vec<AuditRecord>, AuditError> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| &r.identity == identity)
            .cloned()
            .collect())
    }
}
