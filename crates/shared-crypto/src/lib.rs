//! # Shared Crypto - Symmetric Primitives
//!
//! Stateless building blocks used by the secure channel and the audit log.
//! Nothing in this crate holds process-wide state: keys are passed in by the
//! caller on every operation.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | AES-256-CBC + PKCS#7 | Handshake messages, envelopes, audit records |
//! | `mac` | HMAC-SHA256 | Envelope MAC, master secret, session key derivation |
//! | `random` | OS-seeded CSPRNG | Nonces and IVs |
//!
//! ## Security Properties
//!
//! - **Random IVs**: every `encrypt` call draws a fresh 128-bit IV
//! - **Constant-time MAC check**: `verify_hmac_sha256` uses `Mac::verify_slice`
//! - **Zeroized keys**: `SecretKey` wipes its bytes on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod mac;
pub mod random;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use mac::{
    find_tagged_prefix, hmac_sha256, hmac_sha256_parts, verify_hmac_sha256, MacTag, MAC_SIZE,
};
pub use random::random_array;
pub use symmetric::{
    decrypt, decrypt_with_iv, encrypt, encrypt_with_iv, Iv, SecretKey, BLOCK_SIZE, IV_SIZE,
    KEY_SIZE,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
