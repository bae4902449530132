//! Envelope-framed duplex stream for the post-handshake request loop.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_crypto::SecretKey;
use shared_types::Identity;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::{SecureChannel, SessionError};
use crate::ports::KeyStore;
use crate::transport::{envelope_frame, write_message, MessageReader};

use super::handshake::{accept_session, connect_session};
use super::SessionLimits;

/// One authenticated session's transport: reader, writer and channel keys.
pub struct SecureStream<R, W> {
    reader: MessageReader<R>,
    writer: W,
    channel: SecureChannel,
    idle_timeout: Duration,
}

impl<R, W> SecureStream<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wrap the halves used for the handshake.
    pub fn new(
        reader: MessageReader<R>,
        writer: W,
        channel: SecureChannel,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            reader,
            writer,
            channel,
            idle_timeout,
        }
    }

    /// Run the responder handshake over a fresh connection.
    ///
    /// Returns the authenticated identity alongside the stream.
    pub async fn accept<K: KeyStore + ?Sized>(
        reader: R,
        mut writer: W,
        key_store: &K,
        limits: &SessionLimits,
    ) -> Result<(Identity, Self), SessionError> {
        let mut reader =
            MessageReader::with_limits(reader, limits.max_message_size, limits.reassembly_grace);
        let established = accept_session(&mut reader, &mut writer, key_store, limits).await?;
        let (identity, channel) = established.into_channel()?;
        Ok((identity, Self::new(reader, writer, channel, limits.idle_timeout)))
    }

    /// Run the initiator handshake over a fresh connection.
    pub async fn connect(
        reader: R,
        mut writer: W,
        identity: Identity,
        psk: SecretKey,
        limits: &SessionLimits,
    ) -> Result<Self, SessionError> {
        let mut reader =
            MessageReader::with_limits(reader, limits.max_message_size, limits.reassembly_grace);
        let established = connect_session(&mut reader, &mut writer, identity, psk, limits).await?;
        let (_, channel) = established.into_channel()?;
        Ok(Self::new(reader, writer, channel, limits.idle_timeout))
    }

    /// Next raw envelope, bounded by the idle timeout.
    ///
    /// The bytes are not decoded; pass them to [`SecureStream::open`].
    pub async fn recv_raw(&mut self) -> Result<Vec<u8>, SessionError> {
        let check = envelope_frame(&self.channel);
        tokio::time::timeout(self.idle_timeout, self.reader.read_message(check))
            .await
            .map_err(|_| SessionError::Timeout("read"))?
    }

    /// Decode raw envelope bytes.
    pub fn open<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, SessionError> {
        self.channel.open(bytes)
    }

    /// Receive and decode one message.
    pub async fn recv<T: DeserializeOwned>(&mut self) -> Result<T, SessionError> {
        let bytes = self.recv_raw().await?;
        self.open(&bytes)
    }

    /// Encode and send one message.
    pub async fn send<T: Serialize>(&mut self, payload: &T) -> Result<(), SessionError> {
        let envelope = self.channel.seal(payload)?;
        write_message(&mut self.writer, &envelope).await
    }

    /// Send one message and wait for the reply.
    pub async fn request<Req, Resp>(&mut self, payload: &Req) -> Result<Resp, SessionError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        self.send(payload).await?;
        self.recv().await
    }

    /// Send bytes as they are, bypassing the codec.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        write_message(&mut self.writer, bytes).await
    }

    /// Keys for this session.
    pub fn channel(&self) -> &SecureChannel {
        &self.channel
    }
}
