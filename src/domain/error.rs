use thiserror::Error;

use super::ParseCentsError;

/// Bad input. Always recoverable by the caller correcting the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Amount must not exceed {}", super::format_cents(super::MAX_AMOUNT_CENTS))]
    AmountTooLarge,

    #[error("Invalid amount: {0}")]
    InvalidAmount(ParseCentsError),

    #[error("Unknown payer '{0}' (expected Trung or Thang)")]
    UnknownPayer(String),

    #[error("Invalid month {0} (expected 1-12)")]
    MonthOutOfRange(i64),

    #[error("Invalid year {0} (expected a 4-digit year)")]
    YearOutOfRange(i64),

    #[error("Year and month are required")]
    MissingPeriod,

    #[error("Invalid {field} '{value}'")]
    InvalidPeriod { field: &'static str, value: String },
}

impl From<ParseCentsError> for ValidationError {
    fn from(err: ParseCentsError) -> Self {
        ValidationError::InvalidAmount(err)
    }
}
