//! Key store adapters.
//!
//! Keys are kept hex-encoded exactly as provisioned and decoded on lookup, so
//! a bad entry only fails the handshake of the identity it belongs to.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use shared_crypto::SecretKey;
use shared_types::Identity;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::SessionError;
use crate::ports::KeyStore;

/// Errors loading a key store file.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// The file could not be read.
    #[error("Failed to read key store {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// The file is not a JSON object of strings.
    #[error("Failed to parse key store: {0}")]
    Parse(String),
}

type HexKeys = HashMap<String, Zeroizing<String>>;

fn decode_entry(keys: &HexKeys, identity: &Identity) -> Result<SecretKey, SessionError> {
    let encoded = keys
        .get(identity.as_str())
        .ok_or_else(|| SessionError::UnknownIdentity(identity.to_string()))?;

    SecretKey::from_hex(encoded).map_err(|e| {
        SessionError::InvalidKeyMaterial(format!("key for {identity}: {e}"))
    })
}

// ============================================================================
// InMemoryKeyStore - for tests and embedding
// ============================================================================

/// Key store held entirely in memory.
#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: HexKeys,
}

impl InMemoryKeyStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key.
    #[must_use]
    pub fn with_key(mut self, identity: &str, key: &SecretKey) -> Self {
        self.keys
            .insert(identity.to_string(), Zeroizing::new(hex::encode(key.as_bytes())));
        self
    }

    /// Register a raw hex string, valid or not.
    #[must_use]
    pub fn with_hex(mut self, identity: &str, encoded: &str) -> Self {
        self.keys
            .insert(identity.to_string(), Zeroizing::new(encoded.to_string()));
        self
    }
}

impl KeyStore for InMemoryKeyStore {
    fn lookup(&self, identity: &Identity) -> Result<SecretKey, SessionError> {
        decode_entry(&self.keys, identity)
    }
}

impl std::fmt::Debug for InMemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeyStore")
            .field("identities", &self.keys.len())
            .finish()
    }
}

// ============================================================================
// JsonFileKeyStore - `{ "<identity>": "<64 hex chars>" }`
// ============================================================================

/// Key store loaded from a JSON object file.
pub struct JsonFileKeyStore {
    path: PathBuf,
    keys: HexKeys,
}

impl JsonFileKeyStore {
    /// Load the store from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeyStoreError> {
        let path = path.as_ref().to_path_buf();
        let contents = Zeroizing::new(fs::read_to_string(&path).map_err(|e| KeyStoreError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?);

        let keys = Self::parse(&contents)?;
        tracing::debug!(path = %path.display(), identities = keys.len(), "Key store loaded");
        Ok(Self { path, keys })
    }

    /// Parse store contents.
    fn parse(contents: &str) -> Result<HexKeys, KeyStoreError> {
        let raw: HashMap<String, String> =
            serde_json::from_str(contents).map_err(|e| KeyStoreError::Parse(e.to_string()))?;
        Ok(raw
            .into_iter()
            .map(|(identity, key)| (identity, Zeroizing::new(key)))
            .collect())
    }

    /// Source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of identities in the store.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyStore for JsonFileKeyStore {
    fn lookup(&self, identity: &Identity) -> Result<SecretKey, SessionError> {
        decode_entry(&self.keys, identity)
    }
}

impl std::fmt::Debug for JsonFileKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileKeyStore")
            .field("path", &self.path)
            .field("identities", &self.keys.len())
            .finish()
    }
}
