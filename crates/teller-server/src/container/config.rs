//! # Server Configuration
//!
//! Defaults, then an optional TOML file, then environment overrides.
//!
//! ```toml
//! [network]
//! bind_addr = "0.0.0.0:65432"
//! max_sessions = 256
//!
//! [session]
//! handshake_timeout_secs = 10
//! idle_timeout_secs = 300
//!
//! [storage]
//! key_store = "/etc/teller/user_keys.json"
//! audit_dir = "/var/lib/teller/audit"
//!
//! [security]
//! audit_key = "<64 hex chars>"
//!
//! [ledger.opening_balances]
//! alice = 1000
//! ```
//!
//! ## Security Requirements
//!
//! - `audit_key` MUST NOT be the built-in development key in production

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use shared_crypto::SecretKey;
use shared_types::{Amount, Identity};
use st_01_secure_channel::SessionLimits;
use thiserror::Error;

/// Development audit key. Rejected by `validate_for_production`.
pub const DEV_AUDIT_KEY: [u8; 32] = *b"AUDIT_LOG_SECRET_KEY_32_BYTES!!!";

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV: &str = "ST_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error(
        "SECURITY VIOLATION: audit key is the built-in development key. \
         Set ST_AUDIT_KEY or provide security.audit_key in the config file."
    )]
    InsecureAuditKey,
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub network: NetworkConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub ledger: LedgerConfig,
}

/// Listening socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// `host:port` to listen on.
    pub bind_addr: String,
    /// Sessions served at once; further connections wait.
    pub max_sessions: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:65432".to_string(),
            max_sessions: 1024,
        }
    }
}

/// Per-session timeouts and limits.
///
/// | Key | Default |
/// |-----|---------|
/// | `handshake_timeout_secs` | 10 |
/// | `idle_timeout_secs` | 300 |
/// | `max_message_size` | 65536 |
/// | `reassembly_grace_ms` | 1000 |
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Whole three-message handshake.
    pub handshake_timeout_secs: u64,
    /// Wait for the next request before closing the session.
    pub idle_timeout_secs: u64,
    /// Largest message accepted, in bytes.
    pub max_message_size: usize,
    /// Wait for the rest of a message whose MAC does not verify yet. Once it
    /// expires the buffered bytes are decoded as they are, so a request whose
    /// segments arrive further apart than this is answered as truncated.
    /// Raise it for slow links; a truncated reply is delayed by the same amount.
    pub reassembly_grace_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let limits = SessionLimits::default();
        Self {
            handshake_timeout_secs: limits.handshake_timeout.as_secs(),
            idle_timeout_secs: limits.idle_timeout.as_secs(),
            max_message_size: limits.max_message_size,
            reassembly_grace_ms: limits.reassembly_grace.as_millis() as u64,
        }
    }
}

impl SessionConfig {
    /// Limits handed to every session.
    pub fn limits(&self) -> SessionLimits {
        SessionLimits {
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            max_message_size: self.max_message_size,
            reassembly_grace: Duration::from_millis(self.reassembly_grace_ms),
        }
    }
}

/// Files on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON key store `{identity: hex}`.
    pub key_store: PathBuf,
    /// Directory for `<identity>.enc` audit files.
    pub audit_dir: PathBuf,
    /// Delete existing audit files at startup.
    pub clear_audit_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_store: PathBuf::from("server/user_keys.json"),
            audit_dir: PathBuf::from("server/audit_logs"),
            clear_audit_on_start: false,
        }
    }
}

/// Secrets held by the server itself.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Audit encryption key, 64 hex chars.
    pub audit_key: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            audit_key: hex::encode(DEV_AUDIT_KEY),
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("audit_key", &"***")
            .finish()
    }
}

impl SecurityConfig {
    /// Decoded audit key.
    pub fn audit_key(&self) -> Result<SecretKey, ConfigError> {
        SecretKey::from_hex(&self.audit_key).map_err(|e| ConfigError::InvalidValue {
            key: "security.audit_key",
            message: e.to_string(),
        })
    }
}

/// Accounts that exist at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub opening_balances: BTreeMap<Identity, Amount>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let opening_balances = [("alice", 1000), ("bob", 500), ("charlie", 750)]
            .into_iter()
            .filter_map(|(name, balance)| Some((Identity::new(name).ok()?, balance)))
            .collect();
        Self { opening_balances }
    }
}

impl ServerConfig {
    /// Load from `path` (or `$ST_CONFIG`), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `ST_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("ST_BIND_ADDR") {
            self.network.bind_addr = addr;
        }
        if let Some(path) = lookup("ST_KEY_STORE") {
            self.storage.key_store = PathBuf::from(path);
        }
        if let Some(dir) = lookup("ST_AUDIT_DIR") {
            self.storage.audit_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("ST_AUDIT_KEY") {
            self.security.audit_key = key;
            // Fail at startup, not on the first append.
            self.security.audit_key()?;
        }
        if let Some(max) = lookup("ST_MAX_SESSIONS") {
            self.network.max_sessions = max.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ST_MAX_SESSIONS",
                message: format!("not a number: {max}"),
            })?;
        }
        Ok(())
    }

    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the audit key does not decode to 32 bytes
    /// - the audit key is the development key
    /// - no sessions may run at once
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        let key = self.security.audit_key()?;
        if key.as_bytes() == &DEV_AUDIT_KEY {
            return Err(ConfigError::InsecureAuditKey);
        }
        if self.network.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                key: "network.max_sessions",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
