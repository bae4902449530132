use shared_types::Amount;
use thiserror::Error;

/// Ledger failures. Insufficient funds is not an error; see `DebitOutcome`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),

    #[error("Balance overflow: {balance} + {amount}")]
    Overflow { balance: Amount, amount: Amount },
}
