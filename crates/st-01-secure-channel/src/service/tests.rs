use std::time::Duration;

use shared_crypto::SecretKey;
use shared_types::{AccountRequest, AccountResponse, Identity};
use tokio::io::{duplex, split, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};

use super::*;
use crate::adapters::InMemoryKeyStore;
use crate::domain::{Role, SessionError};
use crate::transport::MessageReader;

type Half = (ReadHalf<DuplexStream>, WriteHalf<DuplexStream>);

fn alice() -> Identity {
    "alice".parse().unwrap()
}

fn pipe() -> (Half, Half) {
    let (a, b) = duplex(64 * 1024);
    (split(a), split(b))
}

fn fast_limits() -> SessionLimits {
    SessionLimits {
        reassembly_grace: Duration::from_millis(50),
        ..SessionLimits::default()
    }
    .with_handshake_timeout(Duration::from_secs(2))
    .with_idle_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn test_handshake_and_request_roundtrip() {
    let psk = SecretKey::generate();
    let store = InMemoryKeyStore::new().with_key("alice", &psk);
    let ((sr, sw), (cr, cw)) = pipe();
    let limits = fast_limits();

    let server = tokio::spawn(async move {
        let (identity, mut stream) = SecureStream::accept(sr, sw, &store, &limits).await?;
        let request: AccountRequest = stream.recv().await?;
        assert_eq!(request, AccountRequest::deposit(25));
        stream
            .send(&AccountResponse::new("Deposited $25. New balance: $1025"))
            .await?;
        Ok::<_, SessionError>(identity)
    });

    let mut client = SecureStream::connect(cr, cw, alice(), psk, &limits)
        .await
        .unwrap();
    let response: AccountResponse = client.request(&AccountRequest::deposit(25)).await.unwrap();

    assert_eq!(response.result, "Deposited $25. New balance: $1025");
    assert_eq!(server.await.unwrap().unwrap(), alice());
}

#[tokio::test]
async fn test_wrong_psk_rejected_on_both_sides() {
    let store = InMemoryKeyStore::new().with_key("alice", &SecretKey::generate());
    let ((sr, sw), (cr, cw)) = pipe();
    let limits = fast_limits();

    let server = tokio::spawn(async move {
        SecureStream::accept(sr, sw, &store, &limits)
            .await
            .map(|(identity, _)| identity)
    });

    let client = SecureStream::connect(cr, cw, alice(), SecretKey::generate(), &limits).await;
    assert!(matches!(
        client.err(),
        Some(SessionError::HandshakeNonceMismatch {
            echoed_by: Role::Responder
        })
    ));

    // The client gave up without sending M3.
    let server_result = server.await.unwrap();
    assert!(server_result.is_err());
    assert!(server_result.unwrap_err().is_fatal());
}

#[tokio::test]
async fn test_unknown_identity_closes_handshake() {
    let store = InMemoryKeyStore::new();
    let ((sr, sw), (cr, cw)) = pipe();
    let limits = fast_limits();

    let server =
        tokio::spawn(async move { SecureStream::accept(sr, sw, &store, &limits).await.err() });

    let client = SecureStream::connect(cr, cw, alice(), SecretKey::generate(), &limits).await;
    assert!(client.is_err());
    assert_eq!(
        server.await.unwrap(),
        Some(SessionError::UnknownIdentity("alice".into()))
    );
}

#[tokio::test]
async fn test_malformed_hello() {
    let store = InMemoryKeyStore::new();
    let ((sr, mut sw), (_cr, mut cw)) = pipe();

    cw.write_all(br#"{"identity": 7}"#).await.unwrap();
    let mut reader = MessageReader::new(sr);
    let result = accept_session(&mut reader, &mut sw, &store, &fast_limits()).await;
    assert!(matches!(result, Err(SessionError::MalformedHello(_))));
}

#[tokio::test]
async fn test_silent_client_times_out() {
    let store = InMemoryKeyStore::new();
    let ((sr, mut sw), (_cr, _cw)) = pipe();
    let limits = fast_limits().with_handshake_timeout(Duration::from_millis(50));

    let mut reader = MessageReader::new(sr);
    let result = accept_session(&mut reader, &mut sw, &store, &limits).await;
    assert_eq!(result.err(), Some(SessionError::Timeout("handshake")));
}

#[tokio::test]
async fn test_idle_timeout_after_handshake() {
    let psk = SecretKey::generate();
    let store = InMemoryKeyStore::new().with_key("alice", &psk);
    let ((sr, sw), (cr, cw)) = pipe();
    let limits = fast_limits().with_idle_timeout(Duration::from_millis(50));

    let server = tokio::spawn(async move {
        let (_, mut stream) = SecureStream::accept(sr, sw, &store, &limits).await?;
        stream.recv::<AccountRequest>().await
    });

    let _client = SecureStream::connect(cr, cw, alice(), psk, &limits)
        .await
        .unwrap();
    assert_eq!(
        server.await.unwrap().err(),
        Some(SessionError::Timeout("read"))
    );
}

#[tokio::test]
async fn test_tampered_request_is_integrity_violation() {
    let psk = SecretKey::generate();
    let store = InMemoryKeyStore::new().with_key("alice", &psk);
    let ((sr, sw), (cr, cw)) = pipe();
    let limits = fast_limits();

    let server = tokio::spawn(async move {
        let (_, mut stream) = SecureStream::accept(sr, sw, &store, &limits).await?;
        stream.recv::<AccountRequest>().await
    });

    let mut client = SecureStream::connect(cr, cw, alice(), psk, &limits)
        .await
        .unwrap();
    let mut sealed = client.channel().seal(&AccountRequest::balance()).unwrap();
    sealed[20] ^= 0x01;
    client.send_raw(&sealed).await.unwrap();

    assert_eq!(
        server.await.unwrap().err(),
        Some(SessionError::IntegrityViolation)
    );
}
