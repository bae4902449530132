//! Responder (account service) side of the handshake.

use std::fmt;

use shared_crypto::SecretKey;
use shared_types::Identity;

use super::{open_with_psk, seal_with_psk, Established};
use crate::domain::errors::{Role, SessionError};
use crate::domain::key_schedule::MasterSecret;
use crate::domain::messages::{Confirmation, Hello, Nonce, ServerChallenge};

/// Observable responder state, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderState {
    /// Waiting for M1.
    AwaitingHello,
    /// M2 sent, waiting for M3.
    AwaitingConfirmation,
    /// Both nonces verified.
    Authenticated,
    /// Handshake failed; the connection must be closed.
    Rejected,
}

impl fmt::Display for ResponderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponderState::AwaitingHello => "awaiting_hello",
            ResponderState::AwaitingConfirmation => "awaiting_confirmation",
            ResponderState::Authenticated => "authenticated",
            ResponderState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

impl ResponderState {
    /// Terminal state reached by a finished handshake.
    pub fn concluded<T>(result: &Result<T, SessionError>) -> Self {
        match result {
            Ok(_) => ResponderState::Authenticated,
            Err(_) => ResponderState::Rejected,
        }
    }
}

/// Typestate marker trait.
pub trait ResponderPhase {
    /// State this marker represents.
    const STATE: ResponderState;
}

/// Initial state.
#[derive(Debug, Default)]
pub struct AwaitingHello;

/// M2 has been produced.
pub struct AwaitingConfirmation {
    identity: Identity,
    psk: SecretKey,
    nonce_c: Nonce,
    nonce_s: Nonce,
}

impl ResponderPhase for AwaitingHello {
    const STATE: ResponderState = ResponderState::AwaitingHello;
}

impl ResponderPhase for AwaitingConfirmation {
    const STATE: ResponderState = ResponderState::AwaitingConfirmation;
}

/// Server-side handshake state machine.
pub struct Responder<S: ResponderPhase> {
    phase: S,
}

impl<S: ResponderPhase> Responder<S> {
    /// Current state.
    pub fn state(&self) -> ResponderState {
        S::STATE
    }
}

impl Default for Responder<AwaitingHello> {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder<AwaitingHello> {
    /// Fresh responder for one connection.
    pub fn new() -> Self {
        Self {
            phase: AwaitingHello,
        }
    }

    /// Parse M1.
    pub fn parse_hello(&self, bytes: &[u8]) -> Result<Hello, SessionError> {
        serde_json::from_slice(bytes).map_err(|e| SessionError::MalformedHello(e.to_string()))
    }

    /// Answer M1 with M2, using the PSK looked up for `hello.identity`.
    pub fn challenge(
        self,
        hello: Hello,
        psk: SecretKey,
    ) -> Result<(Responder<AwaitingConfirmation>, Vec<u8>), SessionError> {
        let nonce_s = Nonce::generate();
        let m2 = seal_with_psk(
            &psk,
            &ServerChallenge {
                nonce_c: hello.nonce,
                nonce_s,
            },
        )?;

        let next = Responder {
            phase: AwaitingConfirmation {
                identity: hello.identity,
                psk,
                nonce_c: hello.nonce,
                nonce_s,
            },
        };
        Ok((next, m2))
    }
}

impl Responder<AwaitingConfirmation> {
    /// Identity claimed in M1.
    pub fn identity(&self) -> &Identity {
        &self.phase.identity
    }

    /// PSK in use, needed to recognize a complete M3 on the wire.
    pub fn psk(&self) -> &SecretKey {
        &self.phase.psk
    }

    /// Verify M3 and derive the master secret.
    ///
    /// An M3 that does not decrypt, or that echoes the wrong nonce, means the
    /// initiator does not hold the PSK.
    pub fn confirm(self, m3: &[u8]) -> Result<Established, SessionError> {
        let AwaitingConfirmation {
            identity,
            psk,
            nonce_c,
            nonce_s,
        } = self.phase;

        let mismatch = SessionError::HandshakeNonceMismatch {
            echoed_by: Role::Initiator,
        };
        let confirmation: Confirmation = open_with_psk(&psk, m3).ok_or(mismatch.clone())?;
        if confirmation.nonce_s != nonce_s {
            return Err(mismatch);
        }

        let master = MasterSecret::derive(&psk, &nonce_c, &nonce_s)?;
        Ok(Established::new(identity, master))
    }
}
