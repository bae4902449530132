//! Handshake attacks: forged and replayed confirmations.

use shared_crypto::{encrypt, SecretKey};
use st_01_secure_channel::domain::open_with_psk;
use st_01_secure_channel::transport::{hello_frame, psk_frame, write_message};
use st_01_secure_channel::{
    Confirmation, Hello, MessageReader, Nonce, ServerChallenge, SessionError,
};
use st_03_audit_log::AuditReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::harness::{identity, test_limits, TestServer, STEP_TIMEOUT};

struct RawPeer {
    reader: MessageReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl RawPeer {
    async fn connect(server: &TestServer) -> Self {
        let socket = TcpStream::connect(server.addr).await.unwrap();
        let (reader, writer) = socket.into_split();
        let limits = test_limits();
        Self {
            reader: MessageReader::with_limits(reader, limits.max_message_size, limits.reassembly_grace),
            writer,
        }
    }

    /// Send M1 and decrypt M2 with `psk`.
    async fn hello(&mut self, name: &str, psk: &SecretKey) -> ServerChallenge {
        let hello = Hello {
            identity: identity(name),
            nonce: Nonce::generate(),
        };
        write_message(&mut self.writer, &serde_json::to_vec(&hello).unwrap())
            .await
            .unwrap();

        let m2 = self
            .reader
            .read_message(psk_frame::<ServerChallenge>(psk))
            .await
            .unwrap();
        let challenge: ServerChallenge = open_with_psk(psk, &m2).unwrap();
        assert_eq!(challenge.nonce_c, hello.nonce);
        challenge
    }

    async fn send(&mut self, bytes: &[u8]) {
        write_message(&mut self.writer, bytes).await.unwrap();
    }

    /// Next server message; `Err` once the server has hung up.
    async fn next(&mut self) -> Result<Vec<u8>, SessionError> {
        tokio::time::timeout(STEP_TIMEOUT, self.reader.read_message(hello_frame))
            .await
            .expect("server neither replied nor closed")
    }
}

fn confirmation(psk: &SecretKey, nonce_s: Nonce) -> Vec<u8> {
    encrypt(psk, &serde_json::to_vec(&Confirmation { nonce_s }).unwrap())
}

#[tokio::test]
async fn test_forged_server_nonce_echo_closes_connection() {
    let server = TestServer::start(&[("alice", 1000)]).await;
    let psk = server.psk("alice");
    let mut peer = RawPeer::connect(&server).await;

    let challenge = peer.hello("alice", &psk).await;
    let mut forged = Nonce::generate();
    while forged == challenge.nonce_s {
        forged = Nonce::generate();
    }
    peer.send(&confirmation(&psk, forged)).await;

    assert!(peer.next().await.is_err());
    assert_eq!(server.balance("alice"), 1000);
    assert!(server.audit.read_all(&identity("alice")).await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_replayed_confirmation_is_rejected() {
    let server = TestServer::start(&[("alice", 1000)]).await;
    let psk = server.psk("alice");

    // A confirmation that was valid for an earlier handshake.
    let mut first = RawPeer::connect(&server).await;
    let earlier = first.hello("alice", &psk).await;
    let recorded = confirmation(&psk, earlier.nonce_s);
    drop(first);

    let mut second = RawPeer::connect(&server).await;
    let current = second.hello("alice", &psk).await;
    assert_ne!(current.nonce_s, earlier.nonce_s);
    second.send(&recorded).await;

    assert!(second.next().await.is_err());
    server.stop().await;
}

#[tokio::test]
async fn test_confirmation_under_another_key_is_rejected() {
    let server = TestServer::start(&[("alice", 1000)]).await;
    let psk = server.psk("alice");
    let mut peer = RawPeer::connect(&server).await;

    let challenge = peer.hello("alice", &psk).await;
    peer.send(&confirmation(&server.psk("bob"), challenge.nonce_s)).await;

    assert!(peer.next().await.is_err());
    server.stop().await;
}

#[tokio::test]
async fn test_garbage_hello_closes_connection() {
    let server = TestServer::start(&[]).await;
    let mut peer = RawPeer::connect(&server).await;

    peer.send(b"\x16\x03\x01\x02\x00 not a hello").await;

    assert!(peer.next().await.is_err());
    server.stop().await;
}
