use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::application::ExpenseService;
use crate::domain::{BalanceReport, Expense, format_cents};

/// A month's expenses and balance summary, for JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct MonthSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub year: i64,
    pub month: i64,
    pub summary: BalanceReport,
    pub expenses: Vec<Expense>,
}

/// Exporter for writing a month of the ledger to various formats
pub struct Exporter<'a> {
    service: &'a ExpenseService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Export a month's expenses to CSV format, oldest first
    pub async fn export_expenses_csv<W: Write>(
        &self,
        writer: W,
        year: i64,
        month: i64,
    ) -> Result<usize> {
        let expenses = self
            .service
            .list_all_expenses_by_month_year(year, month)
            .await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "created_at", "payer", "amount", "description"])?;

        for expense in &expenses {
            csv_writer.write_record([
                expense.id.to_string(),
                expense.created_at.to_rfc3339(),
                expense.payer.to_string(),
                format_cents(expense.amount_cents),
                expense.description.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(expenses.len())
    }

    /// Export a month's expenses and balance summary as a JSON snapshot
    pub async fn export_month_json<W: Write>(
        &self,
        mut writer: W,
        year: i64,
        month: i64,
    ) -> Result<MonthSnapshot> {
        let expenses = self
            .service
            .list_all_expenses_by_month_year(year, month)
            .await?;
        let summary = self.service.get_balance_report(year, month).await?;

        let snapshot = MonthSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            year,
            month,
            summary,
            expenses,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
