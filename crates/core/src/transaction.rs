use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::amount::Amount;
use super::month::Month;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction description is empty")]
    EmptyDescription,
}

/// A validated transaction: trimmed non-empty description, exact amount, and
/// the calendar month it was posted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    description: String,
    amount: Amount,
    month: Month,
}

impl Transaction {
    pub fn new(description: &str, amount: Amount, month: Month) -> Result<Self, TransactionError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(TransactionError::EmptyDescription);
        }
        Ok(Transaction {
            description: description.to_string(),
            amount,
            month,
        })
    }

    pub fn on_date(
        description: &str,
        amount: Amount,
        date: NaiveDate,
    ) -> Result<Self, TransactionError> {
        Self::new(description, amount, Month::from(date))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// The identity this transaction would have with no fuzzy merging.
    pub fn exact_key(&self) -> IdentityKey {
        IdentityKey::new(&self.description, self.amount)
    }
}

/// Grouping identity: canonical description plus exact amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    pub description: String,
    pub amount: Amount,
}

impl IdentityKey {
    pub fn new(description: &str, amount: Amount) -> Self {
        IdentityKey {
            description: description.to_string(),
            amount,
        }
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ${}", self.description, self.amount)
    }
}
