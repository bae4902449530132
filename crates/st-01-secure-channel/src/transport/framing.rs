//! Message reassembly over a byte stream.
//!
//! The wire carries no length prefix: each message is one write, and the
//! reader decides from the bytes themselves when a message is complete.
//!
//! | Message | Complete when |
//! |---------|---------------|
//! | M1 hello | a whole JSON value has been parsed |
//! | M2 / M3 | a prefix decrypts and parses under the PSK |
//! | Envelope | a prefix carries a valid MAC under `k_mac` |
//!
//! When the buffer holds bytes that do not (yet) verify, the reader waits a
//! short grace period for more. If none arrive the buffer is handed over as
//! is, and the decoder reports why it is invalid (truncated, tampered, ...).

use std::time::Duration;

use serde::de::DeserializeOwned;
use shared_crypto::SecretKey;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::domain::{open_with_psk, SecureChannel, SessionError};

/// Default upper bound for one message.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Default wait for the rest of a message that does not verify yet.
///
/// Segments of one message arriving further apart than this are split and
/// each half is answered as a truncated envelope.
pub const DEFAULT_REASSEMBLY_GRACE: Duration = Duration::from_millis(1000);

const READ_CHUNK: usize = 4096;

/// M2 and M3 are a few blocks long; nothing past this is tried as one.
const PSK_FRAME_SCAN_LIMIT: usize = 512;

/// Verdict on the buffered bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// The first `n` bytes are a complete message.
    Complete(usize),
    /// Something is buffered but it is not a verified message.
    Unverified,
    /// More bytes are needed before anything can be judged.
    Incomplete,
}

/// Frame check for the plaintext JSON hello.
pub fn hello_frame(buf: &[u8]) -> Completeness {
    if buf.is_empty() {
        return Completeness::Incomplete;
    }

    let mut stream = serde_json::Deserializer::from_slice(buf).into_iter::<serde_json::Value>();
    match stream.next() {
        Some(Ok(_)) => {
            // Swallow a trailing newline so it is not mistaken for the next message.
            let end = stream.byte_offset();
            let trailing = buf[end..]
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            Completeness::Complete(end + trailing)
        }
        Some(Err(e)) if e.is_eof() => Completeness::Incomplete,
        // Not JSON at all: hand it over so parsing reports it.
        Some(Err(_)) => Completeness::Complete(buf.len()),
        None => Completeness::Incomplete,
    }
}

/// Frame check for a PSK-encrypted handshake message (M2 or M3).
pub fn psk_frame<'a, T: DeserializeOwned + 'a>(
    psk: &'a SecretKey,
) -> impl Fn(&[u8]) -> Completeness + 'a {
    move |buf: &[u8]| {
        if buf.is_empty() {
            return Completeness::Incomplete;
        }
        // IV plus at least one block, block aligned.
        let mut len = 32;
        while len <= buf.len().min(PSK_FRAME_SCAN_LIMIT) {
            if open_with_psk::<T>(psk, &buf[..len]).is_some() {
                return Completeness::Complete(len);
            }
            len += 16;
        }
        Completeness::Unverified
    }
}

/// Frame check for a post-handshake envelope.
pub fn envelope_frame(channel: &SecureChannel) -> impl Fn(&[u8]) -> Completeness + '_ {
    move |buf: &[u8]| {
        if buf.is_empty() {
            return Completeness::Incomplete;
        }
        match channel.authenticated_prefix(buf) {
            Some(len) => Completeness::Complete(len),
            None => Completeness::Unverified,
        }
    }
}

/// Buffered reader that yields one message at a time.
pub struct MessageReader<R> {
    inner: R,
    buf: Vec<u8>,
    max_message_size: usize,
    grace: Duration,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    /// Reader with default limits.
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_REASSEMBLY_GRACE)
    }

    /// Reader with explicit limits.
    pub fn with_limits(inner: R, max_message_size: usize, grace: Duration) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            max_message_size,
            grace,
        }
    }

    /// Bytes received but not yet returned.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Read until `check` reports a complete message, then return it.
    ///
    /// # Errors
    ///
    /// - `ConnectionClosed` if the stream ends before any byte of a message
    /// - `MessageTooLarge` if the buffer outgrows the limit
    /// - `Io` on socket errors
    ///
    /// A stream that ends mid-message returns the partial bytes so the
    /// caller's decoder can classify them.
    pub async fn read_message<F>(&mut self, check: F) -> Result<Vec<u8>, SessionError>
    where
        F: Fn(&[u8]) -> Completeness,
    {
        loop {
            match check(&self.buf) {
                Completeness::Complete(n) => return Ok(self.take(n)),
                Completeness::Incomplete => {
                    if self.fill().await? == 0 {
                        return self.take_at_eof();
                    }
                }
                Completeness::Unverified => {
                    match tokio::time::timeout(self.grace, self.fill()).await {
                        // Nothing more is coming: let the decoder judge.
                        Err(_elapsed) => return Ok(self.take(self.buf.len())),
                        Ok(Ok(0)) => return self.take_at_eof(),
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => return Err(e),
                    }
                }
            }

            if self.buf.len() > self.max_message_size {
                return Err(SessionError::MessageTooLarge {
                    max: self.max_message_size,
                });
            }
        }
    }

    async fn fill(&mut self) -> Result<usize, SessionError> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.inner.read(&mut chunk).await?;
        self.buf.extend_from_slice(&chunk[..n]);
        Ok(n)
    }

    fn take(&mut self, n: usize) -> Vec<u8> {
        let rest = self.buf.split_off(n);
        std::mem::replace(&mut self.buf, rest)
    }

    fn take_at_eof(&mut self) -> Result<Vec<u8>, SessionError> {
        if self.buf.is_empty() {
            Err(SessionError::ConnectionClosed)
        } else {
            Ok(self.take(self.buf.len()))
        }
    }
}

/// Write one message and flush.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &[u8],
) -> Result<(), SessionError> {
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}
