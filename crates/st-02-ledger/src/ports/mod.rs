//! # Ports Layer

use std::sync::Arc;

use shared_types::{Amount, Identity};

use crate::domain::{DebitOutcome, LedgerError};

/// Balance storage.
///
/// Every operation on one identity is atomic with respect to every other
/// operation on that identity. Unknown identities read as a zero balance.
pub trait Ledger: Send + Sync {
    /// Current balance.
    fn get(&self, identity: &Identity) -> Amount;

    /// Add `amount`, returning the new balance.
    fn credit(&self, identity: &Identity, amount: Amount) -> Result<Amount, LedgerError>;

    /// Take `amount` if the balance covers it.
    fn debit(&self, identity: &Identity, amount: Amount) -> Result<DebitOutcome, LedgerError>;
}

impl<T: Ledger + ?Sized> Ledger for Arc<T> {
    fn get(&self, identity: &Identity) -> Amount {
        (**self).get(identity)
    }

    fn credit(&self, identity: &Identity, amount: Amount) -> Result<Amount, LedgerError> {
        (**self).credit(identity, amount)
    }

    fn debit(&self, identity: &Identity, amount: Amount) -> Result<DebitOutcome, LedgerError> {
        (**self).debit(identity, amount)
    }
}
