//! # Transport Layer
//!
//! Stream reassembly and writes for any `AsyncRead`/`AsyncWrite` pair
//! (TCP halves in production, `tokio::io::duplex` in tests).

pub mod framing;

pub use framing::{
    envelope_frame, hello_frame, psk_frame, write_message, Completeness, MessageReader,
    DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_REASSEMBLY_GRACE,
};
