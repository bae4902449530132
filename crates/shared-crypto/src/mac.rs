//! # HMAC-SHA256
//!
//! Used for three things: the envelope MAC, the master secret
//! (`HMAC(PSK, nonce_c || nonce_s)`) and the session key labels.

use crate::CryptoError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 output size in bytes.
pub const MAC_SIZE: usize = 32;

/// HMAC-SHA256 output.
pub type MacTag = [u8; MAC_SIZE];

fn keyed(key: &[u8]) -> Result<HmacSha256, CryptoError> {
    HmacSha256::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: MAC_SIZE,
        actual: key.len(),
    })
}

/// Compute HMAC-SHA256 over a single buffer.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<MacTag, CryptoError> {
    hmac_sha256_parts(key, &[data])
}

/// Compute HMAC-SHA256 over the concatenation of `parts` without copying them.
pub fn hmac_sha256_parts(key: &[u8], parts: &[&[u8]]) -> Result<MacTag, CryptoError> {
    let mut mac = keyed(key)?;
    for part in parts {
        mac.update(part);
    }
    let mut tag = [0u8; MAC_SIZE];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Verify an HMAC-SHA256 tag over the concatenation of `parts`.
///
/// # Security
///
/// Uses constant-time comparison to prevent timing attacks.
pub fn verify_hmac_sha256(key: &[u8], parts: &[&[u8]], tag: &[u8]) -> bool {
    let mut mac = match keyed(key) {
        Ok(m) => m,
        Err(_) => return false,
    };
    for part in parts {
        mac.update(part);
    }
    mac.verify_slice(tag).is_ok()
}

/// Find the shortest tagged prefix of `data`.
///
/// Candidate lengths are `min_len`, `min_len + step`, ... up to `data.len()`.
/// A candidate matches when its last `MAC_SIZE` bytes are the HMAC of the
/// bytes before them. The MAC state is fed incrementally, so one call costs a
/// single pass over `data`. `min_len < MAC_SIZE` or `step == 0` match nothing.
pub fn find_tagged_prefix(key: &[u8], data: &[u8], min_len: usize, step: usize) -> Option<usize> {
    if min_len < MAC_SIZE || step == 0 {
        return None;
    }
    let mut mac = keyed(key).ok()?;
    let mut fed = 0;
    let mut len = min_len;

    while len <= data.len() {
        let body = len - MAC_SIZE;
        mac.update(&data[fed..body]);
        fed = body;
        if mac.clone().verify_slice(&data[body..len]).is_ok() {
            return Some(len);
        }
        len += step;
    }
    None
}
