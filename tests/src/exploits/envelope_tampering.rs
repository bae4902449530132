//! Post-handshake attacks on the envelope layer.

use atm_client::{AtmClient, ClientError};
use shared_types::{AccountRequest, AccountResponse};
use st_01_secure_channel::{Nonce, SecureStream, ServerChallenge, SessionError};
use st_03_audit_log::AuditReader;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::harness::{identity, test_limits, TestServer, STEP_TIMEOUT};

type RawStream = SecureStream<OwnedReadHalf, OwnedWriteHalf>;

async fn authenticate(server: &TestServer, name: &str) -> RawStream {
    let socket = TcpStream::connect(server.addr).await.unwrap();
    let (reader, writer) = socket.into_split();
    SecureStream::connect(reader, writer, identity(name), server.psk(name), &test_limits())
        .await
        .unwrap()
}

async fn expect_closed(stream: &mut RawStream) {
    let result = tokio::time::timeout(STEP_TIMEOUT, stream.recv_raw())
        .await
        .expect("server neither replied nor closed");
    assert!(result.is_err(), "server kept the session open");
}

#[tokio::test]
async fn test_flipped_ciphertext_bit_closes_session() {
    let server = TestServer::start(&[("alice", 1000)]).await;
    let mut stream = authenticate(&server, "alice").await;

    let mut envelope = stream.channel().seal(&AccountRequest::withdraw(900)).unwrap();
    envelope[20] ^= 0x01;
    stream.send_raw(&envelope).await.unwrap();

    expect_closed(&mut stream).await;
    assert_eq!(server.balance("alice"), 1000);
    assert!(server.audit.read_all(&identity("alice")).await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_envelope_from_another_session_is_rejected() {
    let server = TestServer::start(&[("alice", 1000)]).await;

    let first = authenticate(&server, "alice").await;
    let captured = first.channel().seal(&AccountRequest::withdraw(1000)).unwrap();
    drop(first);

    let mut second = authenticate(&server, "alice").await;
    second.send_raw(&captured).await.unwrap();

    expect_closed(&mut second).await;
    assert_eq!(server.balance("alice"), 1000);
    server.stop().await;
}

#[tokio::test]
async fn test_truncated_envelope_is_answered_and_session_survives() {
    let server = TestServer::start(&[("alice", 1000)]).await;
    let mut stream = authenticate(&server, "alice").await;

    stream.send_raw(&[0u8; 20]).await.unwrap();
    let reply: AccountResponse = stream.recv().await.unwrap();
    assert_eq!(reply.result, "Truncated envelope (20 bytes)");

    let reply: AccountResponse = stream.request(&AccountRequest::balance()).await.unwrap();
    assert_eq!(reply.result, "Current balance: $1000");

    drop(stream);
    server.stop().await;
}

/// Length of M2 on the wire: IV plus PKCS#7-padded JSON.
fn challenge_len() -> usize {
    let sample = ServerChallenge {
        nonce_c: Nonce::generate(),
        nonce_s: Nonce::generate(),
    };
    let json_len = serde_json::to_vec(&sample).unwrap().len();
    16 + (json_len / 16 + 1) * 16
}

/// Relay one connection, flipping the server→client byte at `flip_at`.
async fn tampering_proxy(upstream: std::net::SocketAddr, flip_at: usize) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (client, _) = listener.accept().await.unwrap();
        let server = TcpStream::connect(upstream).await.unwrap();
        let (mut client_rx, mut client_tx) = client.into_split();
        let (mut server_rx, mut server_tx) = server.into_split();

        let forward = tokio::spawn(async move {
            let _ = tokio::io::copy(&mut client_rx, &mut server_tx).await;
        });

        let mut offset = 0;
        let mut chunk = [0u8; 4096];
        loop {
            let n = match server_rx.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            if (offset..offset + n).contains(&flip_at) {
                chunk[flip_at - offset] ^= 0x80;
            }
            offset += n;
            if client_tx.write_all(&chunk[..n]).await.is_err() {
                break;
            }
        }
        forward.abort();
    });

    addr
}

#[tokio::test]
async fn test_tampered_response_is_detected_by_client() {
    let server = TestServer::start(&[("alice", 1000)]).await;
    let proxy = tampering_proxy(server.addr, challenge_len() + 20).await;

    let mut alice = AtmClient::connect(
        &proxy.to_string(),
        identity("alice"),
        server.psk("alice"),
        &test_limits(),
    )
    .await
    .unwrap();

    let result = alice.deposit(100).await;
    assert!(matches!(
        result,
        Err(ClientError::Session(SessionError::IntegrityViolation))
    ));

    // The request itself arrived intact.
    assert_eq!(server.balance("alice"), 1100);

    drop(alice);
    server.stop().await;
}
