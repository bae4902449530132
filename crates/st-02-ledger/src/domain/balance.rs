//! Balance arithmetic. Callers hold the account lock around these.

use shared_types::Amount;

use super::errors::LedgerError;

/// Result of a debit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Funds were taken; `balance` is the new balance.
    Applied { balance: Amount },
    /// Nothing changed; `balance` is the unchanged balance.
    InsufficientFunds { balance: Amount },
}

impl DebitOutcome {
    /// `true` if the debit was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, DebitOutcome::Applied { .. })
    }

    /// Balance after the attempt.
    pub fn balance(&self) -> Amount {
        match self {
            DebitOutcome::Applied { balance } | DebitOutcome::InsufficientFunds { balance } => {
                *balance
            }
        }
    }
}

/// Amounts must be strictly positive.
pub fn validate_amount(amount: Amount) -> Result<Amount, LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// New balance after adding `amount`.
pub fn credit(balance: Amount, amount: Amount) -> Result<Amount, LedgerError> {
    let amount = validate_amount(amount)?;
    balance
        .checked_add(amount)
        .ok_or(LedgerError::Overflow { balance, amount })
}

/// New balance after taking `amount`, if there is enough.
pub fn debit(balance: Amount, amount: Amount) -> Result<DebitOutcome, LedgerError> {
    let amount = validate_amount(amount)?;
    if amount > balance {
        return Ok(DebitOutcome::InsufficientFunds { balance });
    }
    Ok(DebitOutcome::Applied {
        balance: balance - amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit() {
        assert_eq!(credit(1000, 500), Ok(1500));
        assert_eq!(credit(0, 0), Err(LedgerError::InvalidAmount(0)));
        assert_eq!(
            credit(Amount::MAX, 1),
            Err(LedgerError::Overflow {
                balance: Amount::MAX,
                amount: 1
            })
        );
    }

    #[test]
    fn test_debit() {
        assert_eq!(debit(500, 200), Ok(DebitOutcome::Applied { balance: 300 }));
        assert_eq!(debit(500, 500), Ok(DebitOutcome::Applied { balance: 0 }));
        assert_eq!(
            debit(500, 1000),
            Ok(DebitOutcome::InsufficientFunds { balance: 500 })
        );
        assert_eq!(debit(500, -1), Err(LedgerError::InvalidAmount(-1)));
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = DebitOutcome::Applied { balance: 3 };
        let short = DebitOutcome::InsufficientFunds { balance: 7 };
        assert!(ok.is_applied());
        assert!(!short.is_applied());
        assert_eq!(short.balance(), 7);
    }
}
