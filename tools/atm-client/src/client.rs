//! Initiator-side session over TCP.

use std::path::{Path, PathBuf};

use shared_crypto::SecretKey;
use shared_types::{AccountRequest, AccountResponse, Amount, Identity};
use st_01_secure_channel::{
    JsonFileKeyStore, KeyStore, SecureStream, SessionError, SessionLimits,
};
use thiserror::Error;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Errors that can occur while talking to the teller.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection to {addr} failed: {message}")]
    Connect { addr: String, message: String },

    #[error("Failed to load key for {identity} from {path}: {message}")]
    Key {
        identity: String,
        path: PathBuf,
        message: String,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Read `identity`'s PSK from a JSON key file `{identity: hex}`.
pub fn load_psk(path: &Path, identity: &Identity) -> Result<SecretKey, ClientError> {
    let key_error = |message: String| ClientError::Key {
        identity: identity.to_string(),
        path: path.to_path_buf(),
        message,
    };
    let store = JsonFileKeyStore::load(path).map_err(|e| key_error(e.to_string()))?;
    store.lookup(identity).map_err(|e| key_error(e.to_string()))
}

/// An authenticated session with the teller.
pub struct AtmClient {
    identity: Identity,
    stream: SecureStream<OwnedReadHalf, OwnedWriteHalf>,
}

impl AtmClient {
    /// Connect to `addr` and run the handshake as `identity`.
    ///
    /// Connecting and the handshake share `limits.handshake_timeout`.
    pub async fn connect(
        addr: &str,
        identity: Identity,
        psk: SecretKey,
        limits: &SessionLimits,
    ) -> Result<Self, ClientError> {
        let connect_error = |message: String| ClientError::Connect {
            addr: addr.to_string(),
            message,
        };
        let socket = tokio::time::timeout(limits.handshake_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| connect_error("timed out".into()))?
            .map_err(|e| connect_error(e.to_string()))?;
        socket
            .set_nodelay(true)
            .map_err(|e| connect_error(e.to_string()))?;
        debug!(%addr, "Connected");

        let (reader, writer) = socket.into_split();
        let stream = SecureStream::connect(reader, writer, identity.clone(), psk, limits).await?;
        info!(%identity, "Authenticated with server");

        Ok(Self { identity, stream })
    }

    /// Identity this session authenticated as.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Send one request and return the server's result string.
    ///
    /// A reply that fails its MAC check ends the session with
    /// `SessionError::IntegrityViolation`.
    pub async fn request(&mut self, request: &AccountRequest) -> Result<String, ClientError> {
        let response: AccountResponse = self.stream.request(request).await?;
        Ok(response.result)
    }

    pub async fn deposit(&mut self, amount: Amount) -> Result<String, ClientError> {
        self.request(&AccountRequest::deposit(amount)).await
    }

    pub async fn withdraw(&mut self, amount: Amount) -> Result<String, ClientError> {
        self.request(&AccountRequest::withdraw(amount)).await
    }

    pub async fn balance(&mut self) -> Result<String, ClientError> {
        self.request(&AccountRequest::balance()).await
    }

    pub async fn view_log(&mut self) -> Result<String, ClientError> {
        self.request(&AccountRequest::view_log()).await
    }
}
