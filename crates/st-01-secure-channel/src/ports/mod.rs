//! # Ports Layer
//!
//! Interfaces the secure channel requires from its host.

pub mod outbound;

pub use outbound::KeyStore;
