//! # Envelope Codec
//!
//! Encrypt-then-MAC framing for every post-handshake message.
//!
//! ```text
//! IV(16) || AES-256-CBC(k_enc, IV, PKCS7(json)) || HMAC-SHA256(k_mac, IV || CT)
//! ```
//!
//! ## Decode Order
//!
//! split, verify MAC (constant time), decrypt, unpad, parse. Nothing is
//! decrypted before the MAC is verified, so a padding oracle is never exposed.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_crypto::{
    decrypt_with_iv, encrypt_with_iv, find_tagged_prefix, hmac_sha256_parts, verify_hmac_sha256,
    CryptoError, Iv, SecretKey, BLOCK_SIZE, IV_SIZE, MAC_SIZE,
};

use super::errors::SessionError;
use super::key_schedule::SessionKeys;

/// Smallest valid envelope: IV, one cipher block, MAC.
pub const MIN_ENVELOPE_LEN: usize = IV_SIZE + BLOCK_SIZE + MAC_SIZE;

/// Encode `plaintext` under the session keys.
pub fn encode_envelope(
    k_enc: &SecretKey,
    k_mac: &SecretKey,
    plaintext: &[u8],
) -> Result<Vec<u8>, SessionError> {
    let iv = Iv::generate();
    let ciphertext = encrypt_with_iv(k_enc, &iv, plaintext);
    let mac = hmac_sha256_parts(
        k_mac.as_bytes(),
        &[iv.as_bytes().as_slice(), ciphertext.as_slice()],
    )
    .map_err(|e| SessionError::InvalidKeyMaterial(e.to_string()))?;

    let mut out = Vec::with_capacity(IV_SIZE + ciphertext.len() + MAC_SIZE);
    out.extend_from_slice(iv.as_bytes());
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&mac);
    Ok(out)
}

/// Split an envelope into `(iv, ciphertext, mac)` after the length checks.
fn split(bytes: &[u8]) -> Result<(&[u8], &[u8], &[u8]), SessionError> {
    if bytes.len() < MIN_ENVELOPE_LEN || (bytes.len() - MIN_ENVELOPE_LEN) % BLOCK_SIZE != 0 {
        return Err(SessionError::TruncatedEnvelope { len: bytes.len() });
    }

    let (iv, rest) = bytes.split_at(IV_SIZE);
    let (ciphertext, mac) = rest.split_at(rest.len() - MAC_SIZE);
    Ok((iv, ciphertext, mac))
}

/// Length of the first envelope in `bytes` whose MAC verifies, if any.
pub fn authenticated_prefix(k_mac: &SecretKey, bytes: &[u8]) -> Option<usize> {
    find_tagged_prefix(k_mac.as_bytes(), bytes, MIN_ENVELOPE_LEN, BLOCK_SIZE)
}

/// Decode an envelope back to plaintext bytes.
///
/// # Errors
///
/// - `TruncatedEnvelope`: shorter than 48 bytes or unaligned ciphertext
/// - `IntegrityViolation`: MAC mismatch
/// - `PaddingError`: PKCS#7 failure
pub fn decode_envelope(
    k_enc: &SecretKey,
    k_mac: &SecretKey,
    bytes: &[u8],
) -> Result<Vec<u8>, SessionError> {
    let (iv, ciphertext, mac) = split(bytes)?;

    if !verify_hmac_sha256(k_mac.as_bytes(), &[iv, ciphertext], mac) {
        return Err(SessionError::IntegrityViolation);
    }

    let mut iv_bytes = [0u8; IV_SIZE];
    iv_bytes.copy_from_slice(iv);

    decrypt_with_iv(k_enc, &Iv::from_bytes(iv_bytes), ciphertext).map_err(|e| match e {
        CryptoError::InvalidCiphertextLength(len) => SessionError::TruncatedEnvelope { len },
        _ => SessionError::PaddingError,
    })
}

/// A keyed channel: typed `seal`/`open` over the envelope codec.
#[derive(Debug, Clone)]
pub struct SecureChannel {
    keys: SessionKeys,
}

impl SecureChannel {
    /// Bind a channel to session keys.
    pub fn new(keys: SessionKeys) -> Self {
        Self { keys }
    }

    /// Serialize `payload` as JSON and encode it.
    pub fn seal<T: Serialize>(&self, payload: &T) -> Result<Vec<u8>, SessionError> {
        let json =
            serde_json::to_vec(payload).map_err(|e| SessionError::MalformedPayload(e.to_string()))?;
        self.seal_bytes(&json)
    }

    /// Encode raw plaintext.
    pub fn seal_bytes(&self, plaintext: &[u8]) -> Result<Vec<u8>, SessionError> {
        encode_envelope(self.keys.enc(), self.keys.mac(), plaintext)
    }

    /// Decode and parse an envelope.
    pub fn open<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, SessionError> {
        let plaintext = self.open_bytes(bytes)?;
        serde_json::from_slice(&plaintext).map_err(|e| SessionError::MalformedPayload(e.to_string()))
    }

    /// Decode an envelope to raw plaintext.
    pub fn open_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, SessionError> {
        decode_envelope(self.keys.enc(), self.keys.mac(), bytes)
    }

    /// Length of the first complete, authentic envelope in `bytes`.
    pub fn authenticated_prefix(&self, bytes: &[u8]) -> Option<usize> {
        authenticated_prefix(self.keys.mac(), bytes)
    }
}
