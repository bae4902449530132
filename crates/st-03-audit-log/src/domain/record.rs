//! Record construction and the on-disk line format.
//!
//! A line is `hex(IV || AES-256-CBC(audit_key, json))`, where the JSON is
//! `{"customer_id", "action", "timestamp"}`.

use chrono::Local;
use shared_crypto::{decrypt, encrypt, SecretKey};
use shared_types::{Action, AuditRecord, Identity};

use super::errors::AuditError;

/// Timestamp layout stored in every record (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Record for `action`, stamped with the current local time.
pub fn record_now(identity: &Identity, action: &Action) -> AuditRecord {
    AuditRecord {
        identity: identity.clone(),
        action: action.as_str().to_string(),
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    }
}

/// Encrypt a record into one log line (no trailing newline).
pub fn seal_record(key: &SecretKey, record: &AuditRecord) -> Result<String, AuditError> {
    let json = serde_json::to_vec(record).map_err(|e| AuditError::Encode(e.to_string()))?;
    Ok(hex::encode(encrypt(key, &json)))
}

/// Decrypt one log line. `None` for anything that does not decode.
pub fn open_record(key: &SecretKey, line: &str) -> Option<AuditRecord> {
    let bytes = hex::decode(line.trim()).ok()?;
    let plaintext = decrypt(key, &bytes).ok()?;
    serde_json::from_slice(&plaintext).ok()
}

/// Viewer line: `<timestamp> - <action>`.
pub fn format_entry(record: &AuditRecord) -> String {
    format!("{} - {}", record.timestamp, record.action)
}
