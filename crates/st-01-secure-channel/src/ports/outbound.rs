//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces the handshake **requires** the host application
//! to implement.

use shared_crypto::SecretKey;
use shared_types::Identity;

use crate::domain::SessionError;

/// Identity to pre-shared key lookup.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: every session task consults the
/// same store concurrently.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct VaultKeyStore { client: VaultClient }
///
/// impl KeyStore for VaultKeyStore {
///     fn lookup(&self, identity: &Identity) -> Result<SecretKey, SessionError> {
///         let hex = self.client.read(identity.as_str())
///             .ok_or_else(|| SessionError::UnknownIdentity(identity.to_string()))?;
///         SecretKey::from_hex(&hex)
///             .map_err(|e| SessionError::InvalidKeyMaterial(e.to_string()))
///     }
/// }
/// ```
pub trait KeyStore: Send + Sync {
    /// Return the 32-byte PSK bound to `identity`.
    ///
    /// # Errors
    ///
    /// - `UnknownIdentity` if no key is registered
    /// - `InvalidKeyMaterial` if the stored key is not exactly 32 bytes
    fn lookup(&self, identity: &Identity) -> Result<SecretKey, SessionError>;
}

impl<T: KeyStore + ?Sized> KeyStore for std::sync::Arc<T> {
    fn lookup(&self, identity: &Identity) -> Result<SecretKey, SessionError> {
        (**self).lookup(identity)
    }
}
