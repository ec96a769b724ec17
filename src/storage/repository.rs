use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Cents, Expense, MonthWindow, PageRequest, Payer};

use super::MIGRATION_001_INITIAL;

const EXPENSE_COLUMNS: &str = "id, description, amount_cents, payer, created_at";

/// Repository for persisting and querying expenses.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the connection pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Save a new expense to the database.
    pub async fn save_expense(&self, expense: &Expense) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, description, amount_cents, payer, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.to_string())
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(expense.payer.as_str())
        .bind(to_db_timestamp(expense.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;
        Ok(())
    }

    /// Count expenses created within the window.
    ///
    /// This is a number of records, not an amount of money.
    pub async fn count_in_window(&self, window: &MonthWindow) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM expenses
            WHERE created_at >= ? AND created_at < ?
            "#,
        )
        .bind(to_db_timestamp(window.start))
        .bind(to_db_timestamp(window.end))
        .fetch_one(&self.pool)
        .await
        .context("Failed to count expenses")?;

        Ok(row.get("count"))
    }

    /// List one page of the expenses created within the window, most recent first.
    pub async fn list_in_window(
        &self,
        window: &MonthWindow,
        page: PageRequest,
    ) -> Result<Vec<Expense>> {
        let query = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses \
             WHERE created_at >= ? AND created_at < ? \
             ORDER BY created_at DESC, sequence DESC \
             LIMIT ? OFFSET ?"
        );

        let rows = sqlx::query(&query)
            .bind(to_db_timestamp(window.start))
            .bind(to_db_timestamp(window.end))
            .bind(page.page_size())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    /// List every expense created within the window, oldest first.
    pub async fn list_all_in_window(&self, window: &MonthWindow) -> Result<Vec<Expense>> {
        let query = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses \
             WHERE created_at >= ? AND created_at < ? \
             ORDER BY created_at, sequence"
        );

        let rows = sqlx::query(&query)
            .bind(to_db_timestamp(window.start))
            .bind(to_db_timestamp(window.end))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    /// Sum the amounts paid by `payer` within the window using SQL aggregation.
    /// Returns 0 when there are no matching expenses.
    pub async fn sum_amount_by_payer_in_window(
        &self,
        window: &MonthWindow,
        payer: Payer,
    ) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) as total
            FROM expenses
            WHERE payer = ? AND created_at >= ? AND created_at < ?
            "#,
        )
        .bind(payer.as_str())
        .bind(to_db_timestamp(window.start))
        .bind(to_db_timestamp(window.end))
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to sum expenses paid by {}", payer))?;

        Ok(row.get("total"))
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let id_str: String = row.get("id");
        let payer_str: String = row.get("payer");
        let created_at_str: String = row.get("created_at");

        Ok(Expense {
            id: Uuid::parse_str(&id_str).context("Invalid expense ID")?,
            description: row.get("description"),
            amount_cents: row.get("amount_cents"),
            payer: payer_str
                .parse::<Payer>()
                .with_context(|| format!("Invalid payer: {}", payer_str))?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}

/// Timestamps are stored as fixed-width UTC strings so that comparing them
/// as text orders them chronologically.
fn to_db_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}
