//! # Symmetric Encryption
//!
//! AES-256-CBC with PKCS#7 padding and a random 128-bit IV per message.
//!
//! ## Wire Shape
//!
//! `encrypt` returns `IV(16) || ciphertext`. CBC gives confidentiality only;
//! callers that need integrity (the post-handshake channel) add an HMAC over
//! the whole output and verify it before calling `decrypt`.

use crate::random::random_array;
use crate::CryptoError;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// IV size in bytes (one AES block).
pub const IV_SIZE: usize = 16;

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Secret key (256-bit).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_SIZE]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, rejecting anything that is not exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; KEY_SIZE] =
            slice
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_SIZE,
                    actual: slice.len(),
                })?;
        Ok(Self(bytes))
    }

    /// Decode a 64-character hex string.
    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        let mut bytes =
            hex::decode(encoded.trim()).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    /// Generate random key.
    pub fn generate() -> Self {
        Self(random_array())
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// Initialization vector for CBC mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iv([u8; IV_SIZE]);

impl Iv {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; IV_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generate random IV.
    pub fn generate() -> Self {
        Self(random_array())
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.0
    }
}

/// Pad and encrypt `plaintext` under `key`/`iv`. Returns the ciphertext only.
pub fn encrypt_with_iv(key: &SecretKey, iv: &Iv, plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(key.as_bytes().into(), iv.as_bytes().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt and unpad `ciphertext` under `key`/`iv`.
///
/// # Errors
///
/// - `InvalidCiphertextLength` if the ciphertext is empty or not block aligned
/// - `InvalidPadding` if PKCS#7 unpadding fails
pub fn decrypt_with_iv(key: &SecretKey, iv: &Iv, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidCiphertextLength(ciphertext.len()));
    }

    Aes256CbcDec::new(key.as_bytes().into(), iv.as_bytes().into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::InvalidPadding)
}

/// Encrypt with a fresh random IV.
///
/// Returns `IV || ciphertext`.
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Vec<u8> {
    let iv = Iv::generate();
    let ciphertext = encrypt_with_iv(key, &iv, plaintext);

    let mut out = Vec::with_capacity(IV_SIZE + ciphertext.len());
    out.extend_from_slice(iv.as_bytes());
    out.extend_from_slice(&ciphertext);
    out
}

/// Decrypt `IV || ciphertext` as produced by [`encrypt`].
///
/// # Errors
///
/// Returns `CryptoError::InvalidCiphertextLength` if the input cannot hold an
/// IV and at least one block, `CryptoError::InvalidPadding` on bad padding.
pub fn decrypt(key: &SecretKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() < IV_SIZE + BLOCK_SIZE {
        return Err(CryptoError::InvalidCiphertextLength(data.len()));
    }

    let (iv_bytes, ciphertext) = data.split_at(IV_SIZE);
    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(iv_bytes);

    decrypt_with_iv(key, &Iv::from_bytes(iv), ciphertext)
}
