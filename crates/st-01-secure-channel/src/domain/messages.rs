//! Handshake wire messages.
//!
//! - M1 `Hello`: plaintext JSON `{identity, nonce}`
//! - M2 `ServerChallenge`: `{nonce_c, nonce_s}`, encrypted under the PSK
//! - M3 `Confirmation`: `{nonce_s}`, encrypted under the PSK
//!
//! Nonces travel as 32 lowercase hex characters.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared_crypto::random_array;
use shared_types::Identity;

/// Nonce size in bytes.
pub const NONCE_SIZE: usize = 16;

/// Per-handshake random value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Fresh random nonce.
    pub fn generate() -> Self {
        Self(random_array())
    }

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode exactly 32 hex characters.
    pub fn from_hex(encoded: &str) -> Result<Self, String> {
        let bytes = hex::decode(encoded).map_err(|e| e.to_string())?;
        let array: [u8; NONCE_SIZE] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| format!("nonce must be {NONCE_SIZE} bytes, got {}", v.len()))?;
        Ok(Self(array))
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.to_hex())
    }
}

impl Serialize for Nonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Nonce::from_hex(&encoded).map_err(serde::de::Error::custom)
    }
}

/// M1: the terminal announces who it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    /// Claimed identity. Older terminals send it as `username`.
    #[serde(alias = "username")]
    pub identity: Identity,
    /// Initiator nonce.
    pub nonce: Nonce,
}

/// M2: the service echoes the terminal nonce and adds its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerChallenge {
    /// Echo of the initiator nonce.
    pub nonce_c: Nonce,
    /// Responder nonce.
    pub nonce_s: Nonce,
}

/// M3: the terminal echoes the service nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Echo of the responder nonce.
    pub nonce_s: Nonce,
}
