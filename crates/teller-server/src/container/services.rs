//! Shared service instances, built once and handed to every session.

use std::sync::Arc;

use st_01_secure_channel::{JsonFileKeyStore, KeyStore, SessionLimits};
use st_02_ledger::{InMemoryLedger, Ledger};
use st_03_audit_log::{AuditReader, AuditSink, FileAuditLog};
use tracing::info;

use super::config::ServerConfig;

/// Collaborators of the session handler.
#[derive(Clone)]
pub struct TellerServices {
    pub key_store: Arc<dyn KeyStore>,
    pub ledger: Arc<dyn Ledger>,
    pub audit_sink: Arc<dyn AuditSink>,
    pub audit_reader: Arc<dyn AuditReader>,
    pub limits: SessionLimits,
}

impl TellerServices {
    /// Assemble from explicit parts. One value serves as both audit sink and reader.
    pub fn new<K, L, A>(key_store: K, ledger: L, audit: Arc<A>, limits: SessionLimits) -> Self
    where
        K: KeyStore + 'static,
        L: Ledger + 'static,
        A: AuditSink + AuditReader + 'static,
    {
        Self {
            key_store: Arc::new(key_store),
            ledger: Arc::new(ledger),
            audit_sink: audit.clone(),
            audit_reader: audit,
            limits,
        }
    }

    /// Build the production services described by `config`.
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let key_store = JsonFileKeyStore::load(&config.storage.key_store)
            .context("Failed to load key store")?;
        info!(
            path = %config.storage.key_store.display(),
            identities = key_store.len(),
            "Key store loaded"
        );

        let audit = FileAuditLog::open(&config.storage.audit_dir, config.security.audit_key()?)
            .await
            .context("Failed to open audit directory")?;
        if config.storage.clear_audit_on_start {
            audit.clear().await.context("Failed to clear audit logs")?;
        }

        let ledger = InMemoryLedger::with_balances(config.ledger.opening_balances.clone());
        info!(accounts = ledger.len(), "Ledger initialized");

        Ok(Self::new(
            key_store,
            ledger,
            Arc::new(audit),
            config.session.limits(),
        ))
    }
}

impl std::fmt::Debug for TellerServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TellerServices")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Action, Identity};
    use st_03_audit_log::record_now;
    use tempfile::TempDir;

    fn alice() -> Identity {
        "alice".parse().unwrap()
    }

    fn config_in(dir: &TempDir, clear_audit_on_start: bool) -> ServerConfig {
        let key_store = dir.path().join("user_keys.json");
        std::fs::write(&key_store, format!(r#"{{"alice": "{}"}}"#, "11".repeat(32))).unwrap();

        let mut config = ServerConfig::default();
        config.storage.key_store = key_store;
        config.storage.audit_dir = dir.path().join("audit_logs");
        config.storage.clear_audit_on_start = clear_audit_on_start;
        config
    }

    async fn seed_audit_log(config: &ServerConfig) {
        let log = FileAuditLog::open(&config.storage.audit_dir, config.security.audit_key().unwrap())
            .await
            .unwrap();
        log.append(&record_now(&alice(), &Action::Deposit)).await.unwrap();
    }

    #[tokio::test]
    async fn test_from_config_wires_files_and_balances() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, false);
        seed_audit_log(&config).await;

        let services = TellerServices::from_config(&config).await.unwrap();

        assert_eq!(
            services.key_store.lookup(&alice()).unwrap().as_bytes(),
            &[0x11; 32]
        );
        assert_eq!(services.ledger.get(&alice()), 1000);
        assert_eq!(services.audit_reader.read_all(&alice()).await.unwrap().len(), 1);
        assert_eq!(services.limits, config.session.limits());
    }

    #[tokio::test]
    async fn test_from_config_clears_audit_logs_when_asked() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, true);
        seed_audit_log(&config).await;

        let services = TellerServices::from_config(&config).await.unwrap();

        assert!(services.audit_reader.read_all(&alice()).await.unwrap().is_empty());
        assert!(!config.storage.audit_dir.join("alice.enc").exists());
    }

    #[tokio::test]
    async fn test_from_config_requires_key_store() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir, false);
        config.storage.key_store = dir.path().join("missing.json");

        let err = TellerServices::from_config(&config).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load key store"));
    }
}
