//! Request dispatch: one decoded request in, one result string out.
//!
//! Every request that decoded is audited after it is processed, including
//! business failures such as insufficient funds or an unknown action.

use std::sync::Arc;

use shared_types::{AccountRequest, AccountResponse, Action, Amount, Identity};
use st_02_ledger::{DebitOutcome, Ledger, LedgerError};
use st_03_audit_log::{format_entry, record_now, AuditReader, AuditSink};
use teller_telemetry::{metric_inc, REQUESTS};
use tracing::{debug, error};

/// Routes requests to the ledger and the audit log.
#[derive(Clone)]
pub struct Dispatcher {
    ledger: Arc<dyn Ledger>,
    audit_sink: Arc<dyn AuditSink>,
    audit_reader: Arc<dyn AuditReader>,
}

impl Dispatcher {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        audit_sink: Arc<dyn AuditSink>,
        audit_reader: Arc<dyn AuditReader>,
    ) -> Self {
        Self {
            ledger,
            audit_sink,
            audit_reader,
        }
    }

    /// Handle one request for the authenticated `identity`.
    pub async fn dispatch(&self, identity: &Identity, request: &AccountRequest) -> AccountResponse {
        let action = request.action();
        metric_inc!(REQUESTS, &[metric_label(&action)]);
        debug!(%identity, action = %action, amount = ?request.amount, "Dispatching request");

        let result = match &action {
            Action::Deposit => self.deposit(identity, request.amount),
            Action::Withdraw => self.withdraw(identity, request.amount),
            Action::Balance => format!("Current balance: ${}", self.ledger.get(identity)),
            Action::ViewLog => self.view_log(identity).await,
            Action::Unrecognized(_) => "Invalid action.".to_string(),
        };

        // A failed append does not fail the request; the operator sees it in the logs.
        if let Err(e) = self.audit_sink.append(&record_now(identity, &action)).await {
            error!(%identity, action = %action, error = %e, "Failed to append audit record");
        }

        AccountResponse::new(result)
    }

    fn deposit(&self, identity: &Identity, amount: Option<Amount>) -> String {
        let Some(amount) = amount else {
            return INVALID_AMOUNT.to_string();
        };
        match self.ledger.credit(identity, amount) {
            Ok(balance) => format!("Deposited ${amount}. New balance: ${balance}"),
            Err(e) => ledger_failure(e),
        }
    }

    fn withdraw(&self, identity: &Identity, amount: Option<Amount>) -> String {
        let Some(amount) = amount else {
            return INVALID_AMOUNT.to_string();
        };
        match self.ledger.debit(identity, amount) {
            Ok(DebitOutcome::Applied { balance }) => {
                format!("Withdrew ${amount}. New balance: ${balance}")
            }
            Ok(DebitOutcome::InsufficientFunds { .. }) => "Insufficient funds.".to_string(),
            Err(e) => ledger_failure(e),
        }
    }

    async fn view_log(&self, identity: &Identity) -> String {
        match self.audit_reader.read_all(identity).await {
            Ok(records) if records.is_empty() => "No log entries found.".to_string(),
            Ok(records) => records
                .iter()
                .map(format_entry)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => {
                error!(%identity, error = %e, "Failed to read audit log");
                "Audit log unavailable.".to_string()
            }
        }
    }
}

const INVALID_AMOUNT: &str = "Invalid amount.";

fn ledger_failure(err: LedgerError) -> String {
    match err {
        LedgerError::InvalidAmount(_) => INVALID_AMOUNT.to_string(),
        LedgerError::Overflow { .. } => "Amount exceeds account limit.".to_string(),
    }
}

/// Bounded label set: free-form action names all count as `invalid`.
fn metric_label(action: &Action) -> &'static str {
    match action {
        Action::Deposit => "deposit",
        Action::Withdraw => "withdraw",
        Action::Balance => "balance",
        Action::ViewLog => "view_log",
        Action::Unrecognized(_) => "invalid",
    }
}
