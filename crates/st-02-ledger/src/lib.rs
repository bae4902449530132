//! # Account Ledger
//!
//! Identity to balance mapping used by the teller service.
//!
//! ## Concurrency
//!
//! Each account is an independently lockable cell. A deposit or withdrawal
//! is a read-modify-write under that cell's lock, so two sessions for the
//! same identity serialize while different identities proceed in parallel.
//!
//! ## Example
//!
//! ```rust
//! use shared_types::Identity;
//! use st_02_ledger::{InMemoryLedger, Ledger};
//!
//! let alice: Identity = "alice".parse().unwrap();
//! let ledger = InMemoryLedger::with_balances([(alice.clone(), 1000)]);
//! assert_eq!(ledger.credit(&alice, 500), Ok(1500));
//! assert!(!ledger.debit(&alice, 5000).unwrap().is_applied());
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryLedger;
pub use domain::{DebitOutcome, LedgerError};
pub use ports::Ledger;
