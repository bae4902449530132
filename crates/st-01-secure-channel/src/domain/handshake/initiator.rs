//! Initiator (terminal) side of the handshake.

use shared_crypto::SecretKey;
use shared_types::Identity;

use super::{open_with_psk, seal_with_psk, Established};
use crate::domain::errors::{Role, SessionError};
use crate::domain::key_schedule::MasterSecret;
use crate::domain::messages::{Confirmation, Hello, Nonce, ServerChallenge};

/// Client-side handshake, waiting for M2 after sending M1.
pub struct Initiator {
    identity: Identity,
    psk: SecretKey,
    nonce_c: Nonce,
}

impl Initiator {
    /// Pick a fresh nonce and produce M1.
    pub fn start(identity: Identity, psk: SecretKey) -> Result<(Self, Vec<u8>), SessionError> {
        let nonce_c = Nonce::generate();
        let hello = Hello {
            identity: identity.clone(),
            nonce: nonce_c,
        };
        let m1 =
            serde_json::to_vec(&hello).map_err(|e| SessionError::MalformedHello(e.to_string()))?;

        Ok((
            Self {
                identity,
                psk,
                nonce_c,
            },
            m1,
        ))
    }

    /// PSK in use, needed to recognize a complete M2 on the wire.
    pub fn psk(&self) -> &SecretKey {
        &self.psk
    }

    /// Verify M2, produce M3 and derive the master secret.
    ///
    /// An M2 that does not decrypt, or that echoes the wrong nonce, means the
    /// responder does not hold the PSK.
    pub fn on_challenge(self, m2: &[u8]) -> Result<(Established, Vec<u8>), SessionError> {
        let mismatch = SessionError::HandshakeNonceMismatch {
            echoed_by: Role::Responder,
        };
        let challenge: ServerChallenge = open_with_psk(&self.psk, m2).ok_or(mismatch.clone())?;
        if challenge.nonce_c != self.nonce_c {
            return Err(mismatch);
        }

        let m3 = seal_with_psk(
            &self.psk,
            &Confirmation {
                nonce_s: challenge.nonce_s,
            },
        )?;
        let master = MasterSecret::derive(&self.psk, &self.nonce_c, &challenge.nonce_s)?;

        Ok((Established::new(self.identity, master), m3))
    }
}
