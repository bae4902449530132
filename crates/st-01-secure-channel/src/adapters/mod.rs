//! # Adapters Layer
//!
//! Concrete `KeyStore` implementations.

pub mod key_store;

pub use key_store::{InMemoryKeyStore, JsonFileKeyStore, KeyStoreError};
