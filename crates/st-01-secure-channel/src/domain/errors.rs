//! Session errors.
//!
//! One flat taxonomy for the handshake, the envelope codec and the stream
//! transport. `is_fatal` decides whether the session survives.

use std::fmt;

use thiserror::Error;

/// Which side of the handshake a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The terminal (client).
    Initiator,
    /// The account service (server).
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => f.write_str("initiator"),
            Role::Responder => f.write_str("responder"),
        }
    }
}

/// Errors raised while establishing or using a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The key store has no PSK for the claimed identity.
    #[error("Unknown identity: {0}")]
    UnknownIdentity(String),

    /// A PSK or master secret is not exactly 32 bytes (or not decodable).
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The peer failed to echo our nonce, so it does not hold the PSK.
    ///
    /// `echoed_by` names the side that sent the bad echo: `Responder` means
    /// the server could not be verified, `Initiator` means the client could not.
    #[error("Handshake nonce mismatch: {echoed_by} failed to prove the pre-shared key")]
    HandshakeNonceMismatch {
        /// Side that produced the wrong echo.
        echoed_by: Role,
    },

    /// The plaintext hello could not be parsed.
    #[error("Malformed hello: {0}")]
    MalformedHello(String),

    /// Envelope shorter than 48 bytes or ciphertext not block aligned.
    #[error("Truncated envelope ({len} bytes)")]
    TruncatedEnvelope {
        /// Received length.
        len: usize,
    },

    /// MAC mismatch. Checked before any decryption.
    #[error("Integrity check failed. Possible tampering.")]
    IntegrityViolation,

    /// PKCS#7 unpadding failed after a valid MAC.
    #[error("Invalid padding")]
    PaddingError,

    /// Plaintext is not JSON of the expected shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A message grew past the configured limit without completing.
    #[error("Message exceeds {max} bytes")]
    MessageTooLarge {
        /// Configured limit.
        max: usize,
    },

    /// A bounded wait expired.
    #[error("Timed out during {0}")]
    Timeout(&'static str),

    /// The peer closed the stream.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// Socket error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl SessionError {
    /// Whether the session must be torn down.
    ///
    /// Only recoverable envelope errors (`TruncatedEnvelope`, `PaddingError`,
    /// `MalformedPayload`) let the request loop continue with an encrypted
    /// error response.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SessionError::TruncatedEnvelope { .. }
                | SessionError::PaddingError
                | SessionError::MalformedPayload(_)
        )
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::UnknownIdentity(_) => "unknown_identity",
            SessionError::InvalidKeyMaterial(_) => "invalid_key",
            SessionError::HandshakeNonceMismatch { .. } => "nonce_mismatch",
            SessionError::MalformedHello(_) => "malformed_hello",
            SessionError::TruncatedEnvelope { .. } => "truncated",
            SessionError::IntegrityViolation => "integrity",
            SessionError::PaddingError => "padding",
            SessionError::MalformedPayload(_) => "malformed",
            SessionError::MessageTooLarge { .. } => "too_large",
            SessionError::Timeout(_) => "timeout",
            SessionError::ConnectionClosed => "closed",
            SessionError::Io(_) => "io",
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe => SessionError::ConnectionClosed,
            _ => SessionError::Io(err.to_string()),
        }
    }
}
