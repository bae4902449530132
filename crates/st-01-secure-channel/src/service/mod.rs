//! # Session Service
//!
//! Async drivers that run the domain state machines over a byte stream.
//!
//! `accept_session` and `connect_session` perform the three-message
//! handshake under a deadline. `SecureStream` carries envelopes afterwards,
//! with an idle deadline on every read.

// Semantic submodules
mod handshake;
mod limits;
mod stream;

// Re-export public API
pub use handshake::{accept_session, connect_session};
pub use limits::{SessionLimits, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_IDLE_TIMEOUT};
pub use stream::SecureStream;

#[cfg(test)]
mod tests;
