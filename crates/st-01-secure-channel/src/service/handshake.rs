//! Async handshake drivers.
//!
//! Both drivers run the whole exchange under `SessionLimits::handshake_timeout`.
//! On any error the caller drops the connection; nothing is retried.

use shared_crypto::SecretKey;
use shared_types::Identity;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::{
    Confirmation, Established, Initiator, Responder, ResponderState, ServerChallenge,
    SessionError,
};
use crate::ports::KeyStore;
use crate::transport::{hello_frame, psk_frame, write_message, MessageReader};

use super::SessionLimits;

/// Responder side: M1 in, M2 out, M3 in.
pub async fn accept_session<R, W, K>(
    reader: &mut MessageReader<R>,
    writer: &mut W,
    key_store: &K,
    limits: &SessionLimits,
) -> Result<Established, SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    K: KeyStore + ?Sized,
{
    let exchange = async {
        let responder = Responder::new();

        let m1 = reader.read_message(hello_frame).await?;
        let hello = responder.parse_hello(&m1)?;
        tracing::debug!(identity = %hello.identity, state = %responder.state(), "Hello received");

        let psk = key_store.lookup(&hello.identity)?;
        let (responder, m2) = responder.challenge(hello, psk)?;
        write_message(writer, &m2).await?;

        let m3 = reader
            .read_message(psk_frame::<Confirmation>(responder.psk()))
            .await?;
        responder.confirm(&m3)
    };

    let result = tokio::time::timeout(limits.handshake_timeout, exchange)
        .await
        .map_err(|_| SessionError::Timeout("handshake"))
        .and_then(|outcome| outcome);
    tracing::debug!(state = %ResponderState::concluded(&result), "Handshake finished");
    result
}

/// Initiator side: M1 out, M2 in, M3 out.
pub async fn connect_session<R, W>(
    reader: &mut MessageReader<R>,
    writer: &mut W,
    identity: Identity,
    psk: SecretKey,
    limits: &SessionLimits,
) -> Result<Established, SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let exchange = async {
        let (initiator, m1) = Initiator::start(identity, psk)?;
        write_message(writer, &m1).await?;

        let m2 = reader
            .read_message(psk_frame::<ServerChallenge>(initiator.psk()))
            .await?;
        let (established, m3) = initiator.on_challenge(&m2)?;
        write_message(writer, &m3).await?;
        Ok(established)
    };

    tokio::time::timeout(limits.handshake_timeout, exchange)
        .await
        .map_err(|_| SessionError::Timeout("handshake"))?
}
