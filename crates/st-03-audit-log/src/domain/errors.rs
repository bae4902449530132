use std::path::PathBuf;

use thiserror::Error;

/// Audit persistence failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("Audit I/O failed on {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to encode audit record: {0}")]
    Encode(String),
}

impl AuditError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        AuditError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
