//! Master secret and session key derivation.
//!
//! ```text
//! MS    = HMAC-SHA256(PSK, nonce_c || nonce_s)
//! k_enc = HMAC-SHA256(MS, "encryption")
//! k_mac = HMAC-SHA256(MS, "mac")
//! ```

use shared_crypto::{hmac_sha256, hmac_sha256_parts, SecretKey, KEY_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::SessionError;
use super::messages::Nonce;

/// Label for the encryption key.
pub const ENCRYPTION_LABEL: &[u8] = b"encryption";

/// Label for the MAC key.
pub const MAC_LABEL: &[u8] = b"mac";

/// 32-byte secret agreed by the handshake. Never transmitted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret([u8; KEY_SIZE]);

impl MasterSecret {
    /// `HMAC-SHA256(psk, nonce_c || nonce_s)`.
    pub fn derive(psk: &SecretKey, nonce_c: &Nonce, nonce_s: &Nonce) -> Result<Self, SessionError> {
        let tag = hmac_sha256_parts(
            psk.as_bytes(),
            &[nonce_c.as_bytes().as_slice(), nonce_s.as_bytes().as_slice()],
        )
        .map_err(|e| SessionError::InvalidKeyMaterial(e.to_string()))?;
        Ok(Self(tag))
    }

    /// Wrap externally supplied bytes; anything but 32 bytes is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SessionError> {
        let array: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            SessionError::InvalidKeyMaterial(format!(
                "master secret must be {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterSecret(***)")
    }
}

/// Per-session key pair. Both keys are zeroized on drop.
#[derive(Clone)]
pub struct SessionKeys {
    enc: SecretKey,
    mac: SecretKey,
}

impl SessionKeys {
    /// Derive `(k_enc, k_mac)` from a master secret. Deterministic.
    pub fn derive(master: &MasterSecret) -> Result<Self, SessionError> {
        let derive_one = |label: &[u8]| {
            hmac_sha256(master.as_bytes(), label)
                .map(SecretKey::from_bytes)
                .map_err(|e| SessionError::InvalidKeyMaterial(e.to_string()))
        };

        Ok(Self {
            enc: derive_one(ENCRYPTION_LABEL)?,
            mac: derive_one(MAC_LABEL)?,
        })
    }

    /// Encryption key.
    pub fn enc(&self) -> &SecretKey {
        &self.enc
    }

    /// MAC key.
    pub fn mac(&self) -> &SecretKey {
        &self.mac
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKeys(***)")
    }
}
