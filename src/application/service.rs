use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::domain::{
    BalanceReport, Cents, Expense, MonthWindow, PageRequest, Payer, PayerAmounts,
    ReferenceZone, outstanding_balance,
};
use crate::storage::Repository;

use super::{AppError, StorageError};

/// How long a single store query may run before it is abandoned.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Application service providing the expense ledger operations.
/// This is the primary interface for any client (CLI, HTTP API, etc.).
#[derive(Clone)]
pub struct ExpenseService {
    repo: Repository,
    zone: ReferenceZone,
    query_timeout: Duration,
}

/// Pagination metadata for a page of expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    /// Number of expenses in the whole month (a count, not an amount).
    pub total: i64,
}

/// One page of a month's expenses together with its pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub pagination: Pagination,
}

impl ExpenseService {
    /// Create a new expense service over the given repository.
    /// Months are delimited in the local zone until configured otherwise.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            zone: ReferenceZone::Local,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_reference_zone(mut self, zone: ReferenceZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    pub fn reference_zone(&self) -> ReferenceZone {
        self.zone
    }

    /// Close the underlying connection pool.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    /// The window for (`year`, `month`) in the reference zone.
    pub fn month_window(&self, year: i64, month: i64) -> Result<MonthWindow, AppError> {
        Ok(MonthWindow::new(year, month, self.zone)?)
    }

    /// The (year, month) that is current in the reference zone.
    pub fn current_month(&self) -> (i32, u32) {
        self.zone.year_month_of(Utc::now())
    }

    /// Run a store query under the configured timeout.
    async fn bounded<T>(
        &self,
        query: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, StorageError> {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!("Query abandoned after {:?}", self.query_timeout);
                Err(StorageError::Timeout(self.query_timeout))
            }
        }
    }

    // ========================
    // Expense operations
    // ========================

    /// Record a new expense.
    ///
    /// The input is validated before anything is written, so a rejected
    /// expense is never persisted.
    pub async fn create_expense(
        &self,
        description: impl Into<String>,
        amount_cents: Cents,
        payer: &str,
    ) -> Result<Expense, AppError> {
        let payer: Payer = payer.parse()?;
        let expense = Expense::new(description, amount_cents, payer)?;

        self.bounded(self.repo.save_expense(&expense)).await?;

        tracing::info!(
            id = %expense.id,
            payer = %expense.payer,
            amount_cents = expense.amount_cents,
            "Recorded expense"
        );
        Ok(expense)
    }

    /// Count the expenses recorded in a month.
    ///
    /// Note this is a number of records used for pagination, not a sum of
    /// amounts. See [Self::get_total_by_payer] for monetary totals.
    pub async fn count_expenses_by_month_year(&self, year: i64, month: i64) -> Result<i64, AppError> {
        let window = self.month_window(year, month)?;
        tracing::debug!(%window, "Counting expenses");
        Ok(self.bounded(self.repo.count_in_window(&window)).await?)
    }

    /// List one page of a month's expenses, most recent first.
    pub async fn list_expenses_by_month_year(
        &self,
        year: i64,
        month: i64,
        page: PageRequest,
    ) -> Result<Vec<Expense>, AppError> {
        let window = self.month_window(year, month)?;
        tracing::debug!(
            %window,
            page = page.page(),
            page_size = page.page_size(),
            "Listing expenses"
        );
        Ok(self.bounded(self.repo.list_in_window(&window, page)).await?)
    }

    /// List one page of a month's expenses along with the month's expense count.
    pub async fn get_expense_page(
        &self,
        year: i64,
        month: i64,
        page: PageRequest,
    ) -> Result<ExpensePage, AppError> {
        let expenses = self.list_expenses_by_month_year(year, month, page).await?;
        let total = self.count_expenses_by_month_year(year, month).await?;

        Ok(ExpensePage {
            expenses,
            pagination: Pagination {
                page: page.page(),
                page_size: page.page_size(),
                total,
            },
        })
    }

    /// List every expense recorded in a month, oldest first.
    pub async fn list_all_expenses_by_month_year(
        &self,
        year: i64,
        month: i64,
    ) -> Result<Vec<Expense>, AppError> {
        let window = self.month_window(year, month)?;
        Ok(self.bounded(self.repo.list_all_in_window(&window)).await?)
    }

    // ========================
    // Balance operations
    // ========================

    /// Total amount paid by each payer in a month.
    ///
    /// Fails as a whole if any payer's query fails; no partial totals.
    pub async fn get_total_by_payer(&self, year: i64, month: i64) -> Result<PayerAmounts, AppError> {
        let window = self.month_window(year, month)?;
        tracing::debug!(%window, "Summing expenses by payer");

        let mut totals = PayerAmounts::default();
        for payer in Payer::ALL {
            let total = self
                .bounded(self.repo.sum_amount_by_payer_in_window(&window, payer))
                .await?;
            totals.set(payer, total);
        }

        if totals.total().is_none() {
            return Err(AppError::TotalOutOfRange(window));
        }
        Ok(totals)
    }

    /// Each payer's signed balance for a month relative to an equal split.
    pub async fn get_outstanding_balance(
        &self,
        year: i64,
        month: i64,
    ) -> Result<PayerAmounts, AppError> {
        let totals = self.get_total_by_payer(year, month).await?;
        Ok(outstanding_balance(&totals))
    }

    /// Full balance summary for a month.
    pub async fn get_balance_report(&self, year: i64, month: i64) -> Result<BalanceReport, AppError> {
        let window = self.month_window(year, month)?;
        let totals = self.get_total_by_payer(year, month).await?;
        BalanceReport::from_totals(totals).ok_or(AppError::TotalOutOfRange(window))
    }
}
