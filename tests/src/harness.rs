//! Loopback server fixture.
//!
//! Starts a real `TellerRuntime` on `127.0.0.1:0` with a file audit log in a
//! temporary directory and one fresh PSK per identity.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use atm_client::AtmClient;
use shared_crypto::SecretKey;
use shared_types::{Amount, Identity};
use st_01_secure_channel::{InMemoryKeyStore, SessionLimits};
use st_02_ledger::{InMemoryLedger, Ledger};
use st_03_audit_log::FileAuditLog;
use teller_server::{TellerRuntime, TellerServices};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Identities provisioned in every fixture.
pub const IDENTITIES: [&str; 4] = ["alice", "bob", "charlie", "dave"];

/// Upper bound for any single test step.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(10);

/// Limits used by both ends in tests.
pub fn test_limits() -> SessionLimits {
    SessionLimits {
        reassembly_grace: Duration::from_millis(50),
        ..SessionLimits::default()
    }
    .with_handshake_timeout(Duration::from_secs(5))
    .with_idle_timeout(Duration::from_secs(5))
}

pub fn identity(name: &str) -> Identity {
    name.parse().expect("valid test identity")
}

/// A running server and handles to its state.
pub struct TestServer {
    pub addr: SocketAddr,
    pub ledger: Arc<InMemoryLedger>,
    pub audit: Arc<FileAuditLog>,
    keys: HashMap<&'static str, SecretKey>,
    runtime: Arc<TellerRuntime>,
    task: JoinHandle<anyhow::Result<()>>,
    _audit_dir: TempDir,
}

impl TestServer {
    /// Start with the given opening balances.
    pub async fn start(balances: &[(&str, Amount)]) -> Self {
        let keys: HashMap<_, _> = IDENTITIES
            .iter()
            .map(|name| (*name, SecretKey::generate()))
            .collect();
        let key_store = keys
            .iter()
            .fold(InMemoryKeyStore::new(), |store, (name, key)| {
                store.with_key(name, key)
            });

        let ledger = Arc::new(InMemoryLedger::with_balances(
            balances.iter().map(|(name, amount)| (identity(name), *amount)),
        ));

        let audit_dir = TempDir::new().expect("temp dir");
        let audit = Arc::new(
            FileAuditLog::open(audit_dir.path(), SecretKey::generate())
                .await
                .expect("audit dir"),
        );

        let services = TellerServices::new(key_store, Arc::clone(&ledger), Arc::clone(&audit), test_limits());
        let runtime = Arc::new(TellerRuntime::new(services, 64));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let task = tokio::spawn({
            let runtime = Arc::clone(&runtime);
            async move { runtime.serve(listener).await }
        });

        Self {
            addr,
            ledger,
            audit,
            keys,
            runtime,
            task,
            _audit_dir: audit_dir,
        }
    }

    /// PSK provisioned for `name`.
    pub fn psk(&self, name: &str) -> SecretKey {
        self.keys.get(name).cloned().expect("provisioned identity")
    }

    /// Authenticated client for `name`.
    pub async fn client(&self, name: &str) -> AtmClient {
        tokio::time::timeout(
            STEP_TIMEOUT,
            AtmClient::connect(&self.addr.to_string(), identity(name), self.psk(name), &test_limits()),
        )
        .await
        .expect("handshake timed out")
        .expect("handshake failed")
    }

    pub fn balance(&self, name: &str) -> Amount {
        self.ledger.get(&identity(name))
    }

    /// Stop the acceptor and wait for it.
    pub async fn stop(self) {
        self.runtime.shutdown();
        tokio::time::timeout(STEP_TIMEOUT, self.task)
            .await
            .expect("acceptor did not stop")
            .expect("acceptor panicked")
            .expect("acceptor failed");
    }
}
