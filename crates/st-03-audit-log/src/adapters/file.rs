//! Encrypted audit files, one per identity.
//!
//! ```text
//! <dir>/
//!   alice.enc     hex(IV || CT) per line
//!   bob.enc
//! ```
//!
//! Appends to one file are serialized by an async mutex keyed by path; the
//! line is written, flushed and synced before the lock is released.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use shared_crypto::SecretKey;
use shared_types::{AuditRecord, Identity};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::{open_record, seal_record, AuditError};
use crate::ports::{AuditReader, AuditSink};

const EXTENSION: &str = "enc";

/// File-backed audit log.
pub struct FileAuditLog {
    dir: PathBuf,
    key: SecretKey,
    locks: parking_lot::Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl FileAuditLog {
    /// Open (and create if needed) the audit directory.
    pub async fn open(dir: impl AsRef<Path>, key: SecretKey) -> Result<Self, AuditError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AuditError::io(&dir, e))?;

        Ok(Self {
            dir,
            key,
            locks: parking_lot::Mutex::new(HashMap::new()),
        })
    }

    /// Directory holding the audit files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `identity`'s trail.
    pub fn path_for(&self, identity: &Identity) -> PathBuf {
        self.dir.join(format!("{}.{EXTENSION}", identity.as_str()))
    }

    /// Delete every audit file in the directory. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize, AuditError> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| AuditError::io(&self.dir, e))?;

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AuditError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| AuditError::io(&path, e))?;
                removed += 1;
            }
        }

        tracing::info!(dir = %self.dir.display(), removed, "Cleared audit logs");
        Ok(removed)
    }

    fn lock_for(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }
}

impl std::fmt::Debug for FileAuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAuditLog")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuditSink for FileAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line = seal_record(&self.key, record)?;
        line.push('\n');

        let path = self.path_for(&record.identity);
        let lock = self.lock_for(&path);
        let _guard = lock.lock().await;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| AuditError::io(&path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| AuditError::io(&path, e))?;
        file.flush().await.map_err(|e| AuditError::io(&path, e))?;
        file.sync_data().await.map_err(|e| AuditError::io(&path, e))?;

        tracing::debug!(identity = %record.identity, action = %record.action, "Audit record appended");
        Ok(())
    }
}

#[async_trait]
impl AuditReader for FileAuditLog {
    async fn read_all(&self, identity: &Identity) -> Result<Vec<AuditRecord>, AuditError> {
        let path = self.path_for(identity);
        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AuditError::io(&path, e)),
        };

        let mut skipped = 0usize;
        // Lines are decoded one by one so a damaged line only loses itself.
        let records: Vec<_> = contents
            .split(|&b| b == b'\n')
            .filter(|line| !line.trim_ascii().is_empty())
            .filter_map(|line| {
                let record = std::str::from_utf8(line)
                    .ok()
                    .and_then(|line| open_record(&self.key, line))
                    .filter(|r| &r.identity == identity);
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .collect();

        if skipped > 0 {
            tracing::warn!(%identity, skipped, "Skipped unreadable audit entries");
        }
        Ok(records)
    }
}
