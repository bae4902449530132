//! # Secure Channel
//!
//! PSK-authenticated session establishment and the encrypted, authenticated
//! envelope that carries every message afterwards.
//!
//! ## Protocol
//!
//! ```text
//! Initiator                                  Responder
//!   M1  {identity, nonce_c}           ──►    look up PSK(identity)
//!                                     ◄──   M2  ENC(PSK, {nonce_c, nonce_s})
//!   check nonce_c
//!   M3  ENC(PSK, {nonce_s})           ──►    check nonce_s
//!
//!   MS    = HMAC(PSK, nonce_c || nonce_s)
//!   k_enc = HMAC(MS, "encryption")
//!   k_mac = HMAC(MS, "mac")
//! ```
//!
//! After M3 every message is `IV || AES-256-CBC(k_enc) || HMAC-SHA256(k_mac)`.
//!
//! ## Architecture
//!
//! - **Domain Layer:** handshake state machines, key schedule, envelope codec
//! - **Ports Layer:** `KeyStore`
//! - **Adapters Layer:** in-memory and JSON-file key stores
//! - **Transport Layer:** message reassembly over an async byte stream
//! - **Service Layer:** async handshake drivers and `SecureStream`
//!
//! ## Example
//!
//! ```rust
//! use shared_crypto::SecretKey;
//! use st_01_secure_channel::{Initiator, Responder};
//!
//! let psk = SecretKey::from_bytes([7u8; 32]);
//! let (initiator, m1) = Initiator::start("alice".parse().unwrap(), psk.clone()).unwrap();
//!
//! let responder = Responder::new();
//! let hello = responder.parse_hello(&m1).unwrap();
//! let (responder, m2) = responder.challenge(hello, psk).unwrap();
//!
//! let (client, m3) = initiator.on_challenge(&m2).unwrap();
//! let server = responder.confirm(&m3).unwrap();
//! assert_eq!(client.master_secret().as_bytes(), server.master_secret().as_bytes());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod transport;

// Re-export main types
pub use adapters::{InMemoryKeyStore, JsonFileKeyStore, KeyStoreError};
pub use domain::{
    Confirmation, Established, Hello, Initiator, MasterSecret, Nonce, Responder, ResponderState,
    Role, SecureChannel, ServerChallenge, SessionError, SessionKeys,
};
pub use ports::KeyStore;
pub use service::{accept_session, connect_session, SecureStream, SessionLimits};
pub use transport::MessageReader;
