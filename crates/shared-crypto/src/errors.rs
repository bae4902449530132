//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Ciphertext is shorter than one IV plus one block, or not block aligned
    #[error("Invalid ciphertext length: {0} bytes")]
    InvalidCiphertextLength(usize),

    /// PKCS#7 padding did not validate after decryption
    #[error("Invalid padding")]
    InvalidPadding,

    /// Hex input could not be decoded
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}
