//! # PSK Handshake
//!
//! Three-message nonce challenge-response over a pre-shared key.
//!
//! ```text
//! Initiator                                   Responder
//!   M1 {identity, nonce_c}         ------>      lookup PSK(identity)
//!                                  <------      M2 ENC(PSK, {nonce_c, nonce_s})
//!   check nonce_c echo
//!   M3 ENC(PSK, {nonce_s})         ------>      check nonce_s echo
//!   MS = HMAC(PSK, nonce_c || nonce_s)          MS = HMAC(PSK, nonce_c || nonce_s)
//! ```
//!
//! Both sides are typestate machines: a method can only be called in the
//! state it belongs to, and each transition consumes the previous state.
//! There are no retries; a failed handshake needs a new connection.

mod initiator;
mod responder;

pub use initiator::Initiator;
pub use responder::{
    AwaitingConfirmation, AwaitingHello, Responder, ResponderPhase, ResponderState,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_crypto::SecretKey;
use shared_types::Identity;

use super::envelope::SecureChannel;
use super::errors::SessionError;
use super::key_schedule::{MasterSecret, SessionKeys};

/// Result of a successful handshake, on either side.
pub struct Established {
    identity: Identity,
    master: MasterSecret,
}

impl Established {
    pub(crate) fn new(identity: Identity, master: MasterSecret) -> Self {
        Self { identity, master }
    }

    /// Authenticated identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Agreed master secret.
    pub fn master_secret(&self) -> &MasterSecret {
        &self.master
    }

    /// Derive session keys and open the channel. The master secret is
    /// dropped (and zeroized) here.
    pub fn into_channel(self) -> Result<(Identity, SecureChannel), SessionError> {
        let keys = SessionKeys::derive(&self.master)?;
        Ok((self.identity, SecureChannel::new(keys)))
    }
}

impl std::fmt::Debug for Established {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Established")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// `IV || CT` of a JSON message under the PSK (M2 and M3). No MAC.
pub(crate) fn seal_with_psk<T: Serialize>(
    psk: &SecretKey,
    message: &T,
) -> Result<Vec<u8>, SessionError> {
    let json =
        serde_json::to_vec(message).map_err(|e| SessionError::MalformedPayload(e.to_string()))?;
    Ok(shared_crypto::encrypt(psk, &json))
}

/// Decrypt and parse M2 or M3. `None` if either step fails.
pub fn open_with_psk<T: DeserializeOwned>(psk: &SecretKey, bytes: &[u8]) -> Option<T> {
    let plaintext = shared_crypto::decrypt(psk, bytes).ok()?;
    serde_json::from_slice(&plaintext).ok()
}
