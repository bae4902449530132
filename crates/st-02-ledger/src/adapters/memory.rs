//! In-memory ledger with one lock per account.
//!
//! The outer map lock is only held long enough to find (or open) an account
//! cell; the read-modify-write then runs under that account's own mutex, so
//! different identities never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use shared_types::{Amount, Identity};

use crate::domain::{self, DebitOutcome, LedgerError};
use crate::ports::Ledger;

type Cell = Arc<Mutex<Amount>>;

/// Process-local ledger. Balances are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: RwLock<HashMap<Identity, Cell>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-populated with opening balances.
    pub fn with_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (Identity, Amount)>,
    {
        let accounts = balances
            .into_iter()
            .map(|(identity, balance)| (identity, Arc::new(Mutex::new(balance))))
            .collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    /// Number of open accounts.
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, identity: &Identity) -> Cell {
        if let Some(cell) = self.accounts.read().get(identity) {
            return Arc::clone(cell);
        }

        let mut accounts = self.accounts.write();
        Arc::clone(accounts.entry(identity.clone()).or_insert_with(|| {
            tracing::debug!(%identity, "Opening account with zero balance");
            Arc::new(Mutex::new(0))
        }))
    }
}

impl Ledger for InMemoryLedger {
    fn get(&self, identity: &Identity) -> Amount {
        match self.accounts.read().get(identity) {
            Some(cell) => *cell.lock(),
            None => 0,
        }
    }

    fn credit(&self, identity: &Identity, amount: Amount) -> Result<Amount, LedgerError> {
        domain::validate_amount(amount)?;
        let cell = self.cell(identity);
        let mut balance = cell.lock();
        *balance = domain::credit(*balance, amount)?;
        Ok(*balance)
    }

    fn debit(&self, identity: &Identity, amount: Amount) -> Result<DebitOutcome, LedgerError> {
        domain::validate_amount(amount)?;
        let cell = self.cell(identity);
        let mut balance = cell.lock();
        let outcome = domain::debit(*balance, amount)?;
        if let DebitOutcome::Applied { balance: new } = outcome {
            *balance = new;
        }
        Ok(outcome)
    }
}
