use std::time::Duration;

use thiserror::Error;

use crate::domain::{MonthWindow, ValidationError};

/// The backing store failed or did not answer in time.
/// Surfaced as-is: nothing is retried here.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0:#}")]
    Backend(#[from] anyhow::Error),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Stored amounts are individually valid but their sum is not representable.
    #[error("Expenses for {0} exceed the supported total")]
    TotalOutOfRange(MonthWindow),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Storage(StorageError::Backend(err))
    }
}
