//! Full client/server sessions over loopback TCP.

use atm_client::ClientError;
use shared_types::AccountRequest;
use st_01_secure_channel::SessionError;
use st_03_audit_log::AuditReader;

use crate::harness::{identity, test_limits, TestServer, STEP_TIMEOUT};

#[tokio::test]
async fn test_deposit_updates_balance_and_audit_trail() {
    let server = TestServer::start(&[("alice", 1000)]).await;
    let mut alice = server.client("alice").await;

    let reply = alice.deposit(500).await.unwrap();
    assert_eq!(reply, "Deposited $500. New balance: $1500");
    assert_eq!(server.balance("alice"), 1500);

    let trail = server.audit.read_all(&identity("alice")).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].identity, identity("alice"));
    assert_eq!(trail[0].action, "deposit");

    drop(alice);
    server.stop().await;
}

#[tokio::test]
async fn test_overdraft_is_refused_but_audited() {
    let server = TestServer::start(&[("bob", 500)]).await;
    let mut bob = server.client("bob").await;

    assert_eq!(bob.withdraw(1000).await.unwrap(), "Insufficient funds.");
    assert_eq!(bob.balance().await.unwrap(), "Current balance: $500");
    assert_eq!(server.balance("bob"), 500);

    let trail = server.audit.read_all(&identity("bob")).await.unwrap();
    let actions: Vec<_> = trail.iter().map(|r| r.action.as_str()).collect();
    assert_eq!(actions, ["withdraw", "balance"]);

    drop(bob);
    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_sessions_for_one_identity_do_not_lose_updates() {
    let server = TestServer::start(&[]).await;
    let mut first = server.client("dave").await;
    let mut second = server.client("dave").await;

    let (a, b) = tokio::join!(first.deposit(100), second.deposit(100));
    a.unwrap();
    b.unwrap();

    assert_eq!(server.balance("dave"), 200);
    assert_eq!(first.balance().await.unwrap(), "Current balance: $200");

    drop((first, second));
    server.stop().await;
}

#[tokio::test]
async fn test_view_log_lists_earlier_requests() {
    let server = TestServer::start(&[("charlie", 750)]).await;
    let mut charlie = server.client("charlie").await;

    assert_eq!(charlie.view_log().await.unwrap(), "No log entries found.");
    charlie.withdraw(50).await.unwrap();

    let listing = charlie.view_log().await.unwrap();
    let lines: Vec<_> = listing.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" - view_log"));
    assert!(lines[1].ends_with(" - withdraw"));

    drop(charlie);
    server.stop().await;
}

#[tokio::test]
async fn test_invalid_requests_are_answered_in_session() {
    let server = TestServer::start(&[("alice", 1000)]).await;
    let mut alice = server.client("alice").await;

    let transfer = AccountRequest {
        action: "transfer".into(),
        amount: Some(10),
    };
    assert_eq!(alice.request(&transfer).await.unwrap(), "Invalid action.");
    assert_eq!(alice.deposit(-5).await.unwrap(), "Invalid amount.");
    assert_eq!(alice.balance().await.unwrap(), "Current balance: $1000");

    drop(alice);
    server.stop().await;
}

#[tokio::test]
async fn test_sessions_are_isolated_per_identity() {
    let server = TestServer::start(&[("alice", 1000), ("bob", 500)]).await;
    let mut alice = server.client("alice").await;
    let mut bob = server.client("bob").await;

    alice.withdraw(300).await.unwrap();
    assert_eq!(bob.balance().await.unwrap(), "Current balance: $500");
    assert_eq!(bob.view_log().await.unwrap(), "No log entries found.");

    drop((alice, bob));
    server.stop().await;
}

#[tokio::test]
async fn test_wrong_key_is_rejected_during_handshake() {
    let server = TestServer::start(&[("alice", 1000)]).await;

    // Bob's key presented under Alice's name.
    let result = tokio::time::timeout(
        STEP_TIMEOUT,
        atm_client::AtmClient::connect(
            &server.addr.to_string(),
            identity("alice"),
            server.psk("bob"),
            &test_limits(),
        ),
    )
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(ClientError::Session(SessionError::HandshakeNonceMismatch { .. }))
    ));
    assert_eq!(server.balance("alice"), 1000);
    assert!(server.audit.read_all(&identity("alice")).await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_identity_gets_no_session() {
    let server = TestServer::start(&[]).await;

    let result = atm_client::AtmClient::connect(
        &server.addr.to_string(),
        identity("mallory"),
        server.psk("alice"),
        &test_limits(),
    )
    .await;

    assert!(matches!(result, Err(ClientError::Session(e)) if e.is_fatal()));
    server.stop().await;
}
