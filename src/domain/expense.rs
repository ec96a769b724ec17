use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Cents, MAX_AMOUNT_CENTS, Payer, ValidationError};

pub type ExpenseId = Uuid;

/// A single shared expense.
/// Expenses are immutable: there is no update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    /// Amount in cents (always positive)
    #[serde(rename = "amount", with = "super::money::decimal")]
    pub amount_cents: Cents,
    pub payer: Payer,
    /// When the expense was recorded. The only time dimension for queries.
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense stamped with the current time.
    pub fn new(
        description: impl Into<String>,
        amount_cents: Cents,
        payer: Payer,
    ) -> Result<Self, ValidationError> {
        Self::recorded_at(description, amount_cents, payer, Utc::now())
    }

    /// Create a new expense with an explicit creation time.
    ///
    /// The timestamp is truncated to microseconds, the precision kept by storage.
    pub fn recorded_at(
        description: impl Into<String>,
        amount_cents: Cents,
        payer: Payer,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if amount_cents <= 0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(ValidationError::AmountTooLarge);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            description,
            amount_cents,
            payer,
            created_at: created_at.trunc_subsecs(6),
        })
    }
}
