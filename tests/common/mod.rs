// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, Utc};
use shared_fund::application::ExpenseService;
use shared_fund::domain::{Cents, Expense, Payer, ReferenceZone};
use std::collections::BTreeSet;
use shared_fund::storage::Repository;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database.
/// Months are delimited in UTC so that results do not depend on the host zone.
pub async fn test_service() -> Result<(ExpenseService, TempDir)> {
    let (_, service, temp_dir) = test_repo_service().await?;
    Ok((service, temp_dir))
}

/// Like [test_service], but also hands out the repository so tests can
/// record expenses at fixed instants.
pub async fn test_repo_service() -> Result<(Repository, ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.to_str().unwrap());

    let repo = Repository::init(&db_url).await?;
    let service = ExpenseService::new(repo.clone()).with_reference_zone(ReferenceZone::utc());
    Ok((repo, service, temp_dir))
}

/// Helper to parse an RFC 3339 timestamp into DateTime<Utc>
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Record an expense at a fixed instant, bypassing the clock.
pub async fn record_at(
    repo: &Repository,
    description: &str,
    amount_cents: Cents,
    payer: Payer,
    at: &str,
) -> Result<Expense> {
    let expense = Expense::recorded_at(description, amount_cents, payer, parse_datetime(at))?;
    repo.save_expense(&expense).await?;
    Ok(expense)
}

/// Count the expenses recorded from the month `started_in` up to the current
/// month, so a run that crosses a month boundary still sees every record.
pub async fn count_since(service: &ExpenseService, started_in: (i32, u32)) -> Result<i64> {
    let months: BTreeSet<_> = [started_in, service.current_month()].into();
    let mut count = 0;
    for (year, month) in months {
        count += service
            .count_expenses_by_month_year(year as i64, month as i64)
            .await?;
    }
    Ok(count)
}
