//! Pure ledger rules.

pub mod balance;
pub mod errors;

pub use balance::{credit, debit, validate_amount, DebitOutcome};
pub use errors::LedgerError;
