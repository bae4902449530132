//! # Domain Layer
//!
//! Pure protocol logic: no sockets, no clocks, no files.
//!
//! - `messages`: handshake wire types and nonces
//! - `handshake`: initiator/responder state machines
//! - `key_schedule`: master secret and session keys
//! - `envelope`: encrypt-then-MAC codec
//! - `errors`: the session error taxonomy

pub mod envelope;
pub mod errors;
pub mod handshake;
pub mod key_schedule;
pub mod messages;

pub use envelope::{decode_envelope, encode_envelope, SecureChannel, MIN_ENVELOPE_LEN};
pub use errors::{Role, SessionError};
pub use handshake::{
    open_with_psk, AwaitingConfirmation, AwaitingHello, Established, Initiator, Responder,
    ResponderPhase, ResponderState,
};
pub use key_schedule::{MasterSecret, SessionKeys};
pub use messages::{Confirmation, Hello, Nonce, ServerChallenge, NONCE_SIZE};
