//! # Core Domain Entities
//!
//! Types that cross crate boundaries: the client, the server and the
//! collaborators (ledger, audit log) all speak in these terms.
//!
//! ## Clusters
//!
//! - **Principals**: `Identity`
//! - **Wire payloads**: `AccountRequest`, `AccountResponse`, `Action`
//! - **Audit**: `AuditRecord`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::IdentityError;

// =============================================================================
// CLUSTER A: PRINCIPALS
// =============================================================================

/// Monetary amount in whole currency units.
pub type Amount = i64;

/// Maximum identity length in characters.
pub const MAX_IDENTITY_LEN: usize = 64;

/// A principal known to the key store and the ledger.
///
/// Identities name audit files on disk, so the character set is restricted to
/// `[A-Za-z0-9_.-]` and a leading `.` is refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Validate and wrap an identity string.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let value = value.into();

        if value.is_empty() {
            return Err(IdentityError::Empty);
        }
        if value.chars().count() > MAX_IDENTITY_LEN {
            return Err(IdentityError::TooLong {
                max: MAX_IDENTITY_LEN,
            });
        }
        if value.starts_with('.') {
            return Err(IdentityError::InvalidCharacter('.'));
        }
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(IdentityError::InvalidCharacter(bad));
        }

        Ok(Self(value))
    }

    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

// =============================================================================
// CLUSTER B: WIRE PAYLOADS
// =============================================================================

/// The operation a terminal asks for.
///
/// Unknown action names are kept rather than rejected: they are a business
/// outcome ("Invalid action."), not a protocol error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Credit the ledger.
    Deposit,
    /// Debit the ledger if funds allow.
    Withdraw,
    /// Read the ledger.
    Balance,
    /// List this identity's audit entries.
    ViewLog,
    /// Anything else the terminal sent.
    Unrecognized(String),
}

impl Action {
    /// Wire name of the action.
    pub fn as_str(&self) -> &str {
        match self {
            Action::Deposit => "deposit",
            Action::Withdraw => "withdraw",
            Action::Balance => "balance",
            Action::ViewLog => "view_log",
            Action::Unrecognized(name) => name,
        }
    }

    /// Parse a wire name. Never fails.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "deposit" => Action::Deposit,
            "withdraw" => Action::Withdraw,
            "balance" => Action::Balance,
            "view_log" => Action::ViewLog,
            other => Action::Unrecognized(other.to_string()),
        }
    }

    /// Whether the action needs an `amount`.
    pub fn requires_amount(&self) -> bool {
        matches!(self, Action::Deposit | Action::Withdraw)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request plaintext carried inside an envelope: `{action, amount?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequest {
    /// Wire name of the action.
    pub action: String,
    /// Amount for deposit/withdraw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

impl AccountRequest {
    /// Build a request for `action`, with an optional amount.
    pub fn new(action: Action, amount: Option<Amount>) -> Self {
        Self {
            action: action.as_str().to_string(),
            amount,
        }
    }

    /// `{"action": "deposit", "amount": n}`
    pub fn deposit(amount: Amount) -> Self {
        Self::new(Action::Deposit, Some(amount))
    }

    /// `{"action": "withdraw", "amount": n}`
    pub fn withdraw(amount: Amount) -> Self {
        Self::new(Action::Withdraw, Some(amount))
    }

    /// `{"action": "balance"}`
    pub fn balance() -> Self {
        Self::new(Action::Balance, None)
    }

    /// `{"action": "view_log"}`
    pub fn view_log() -> Self {
        Self::new(Action::ViewLog, None)
    }

    /// Typed view of the action field.
    pub fn action(&self) -> Action {
        Action::from_wire(&self.action)
    }
}

/// Response plaintext carried inside an envelope: `{result}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    /// Human-readable outcome.
    pub result: String,
}

impl AccountResponse {
    /// Wrap a result string.
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
        }
    }
}

// =============================================================================
// CLUSTER C: AUDIT
// =============================================================================

/// One audit entry as persisted (encrypted) by the audit sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Identity that performed the action.
    #[serde(rename = "customer_id")]
    pub identity: Identity,
    /// Wire name of the action.
    pub action: String,
    /// Local time, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
}
