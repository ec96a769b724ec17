use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::{DEFAULT_QUERY_TIMEOUT, ExpenseService};
use crate::domain::{
    BalanceReport, DEFAULT_PAGE_SIZE, PageRequest, Payer, ReferenceZone, format_cents,
    parse_cents,
};

/// Shared Fund - a shared expense ledger for two
#[derive(Parser)]
#[command(name = "shared-fund")]
#[command(about = "Track shared expenses between Trung and Thang and see who owes whom")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SHARED_FUND_DB", default_value = "shared-fund.db")]
    pub database: String,

    /// Timezone that delimits months: "local" or a UTC offset such as "+07:00"
    #[arg(long, env = "SHARED_FUND_UTC_OFFSET", default_value = "local")]
    pub utc_offset: ReferenceZone,

    /// Maximum seconds a single database query may take
    #[arg(long, env = "SHARED_FUND_QUERY_TIMEOUT", default_value_t = DEFAULT_QUERY_TIMEOUT.as_secs())]
    pub query_timeout: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record a shared expense
    Add {
        /// Amount paid (e.g., "50.00" or "50")
        amount: String,

        /// Who paid: Trung or Thang
        #[arg(short, long)]
        payer: String,

        /// What the money was spent on
        #[arg(short, long)]
        description: String,
    },

    /// List a month's expenses, most recent first
    List {
        #[command(flatten)]
        period: PeriodArgs,

        /// Page number (starting at 1)
        #[arg(long, default_value_t = 1)]
        page: i64,

        /// Expenses per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: i64,
    },

    /// Show how much each payer spent in a month
    Totals {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the outstanding balance for a month (who owes whom)
    Balance {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export a month's expenses to CSV or JSON
    Export {
        #[command(flatten)]
        period: PeriodArgs,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

/// The month to report on. Defaults to the current month.
#[derive(Args, Debug, Clone, Copy)]
pub struct PeriodArgs {
    /// Year (e.g., 2024)
    #[arg(short, long)]
    pub year: Option<i64>,

    /// Month (1-12)
    #[arg(short, long)]
    pub month: Option<i64>,
}

/// Connection settings shared by every command that touches the database.
struct ServiceConfig {
    database: String,
    zone: ReferenceZone,
    query_timeout: Duration,
}

impl ServiceConfig {
    fn configure(&self, service: ExpenseService) -> ExpenseService {
        service
            .with_reference_zone(self.zone)
            .with_query_timeout(self.query_timeout)
    }

    async fn connect(&self) -> Result<ExpenseService> {
        let service = ExpenseService::connect(&self.database)
            .await
            .with_context(|| format!("Failed to open database '{}'. Run `init` first?", self.database))?;
        Ok(self.configure(service))
    }

    async fn init(&self) -> Result<ExpenseService> {
        let service = ExpenseService::init(&self.database).await?;
        Ok(self.configure(service))
    }
}

impl Cli {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence. Otherwise the server logs at `info`, other
    /// commands only report warnings, and `--verbose` enables `debug`.
    pub fn init_tracing(&self) {
        let default_level = match (&self.command, self.verbose) {
            (_, true) => "debug",
            (Commands::Serve { .. }, false) => "info",
            _ => "warn",
        };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub async fn run(self) -> Result<()> {
        let config = ServiceConfig {
            database: self.database,
            zone: self.utc_offset,
            query_timeout: Duration::from_secs(self.query_timeout),
        };

        match self.command {
            Commands::Init => {
                config.init().await?;
                println!("Database initialized: {}", config.database);
            }

            Commands::Add {
                amount,
                payer,
                description,
            } => {
                let service = config.connect().await?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

                let expense = service
                    .create_expense(description, amount_cents, &payer)
                    .await?;

                println!(
                    "Recorded expense: {} paid {} for {} ({})",
                    expense.payer,
                    format_cents(expense.amount_cents),
                    expense.description,
                    expense.id
                );
            }

            Commands::List {
                period,
                page,
                page_size,
            } => {
                let service = config.connect().await?;
                run_list_command(&service, period, PageRequest::new(page, page_size)).await?;
            }

            Commands::Totals { period, format } => {
                let service = config.connect().await?;
                run_totals_command(&service, period, &format).await?;
            }

            Commands::Balance { period, format } => {
                let service = config.connect().await?;
                run_balance_command(&service, period, &format).await?;
            }

            Commands::Export {
                period,
                format,
                output,
            } => {
                let service = config.connect().await?;
                run_export_command(&service, period, &format, output.as_deref()).await?;
            }

            Commands::Serve { bind, port } => {
                let service = config.init().await?;
                crate::api::serve(service, SocketAddr::new(bind, port)).await?;
            }
        }

        Ok(())
    }
}

/// Resolve the requested month, filling gaps from the current month.
fn resolve_period(service: &ExpenseService, period: PeriodArgs) -> (i64, i64) {
    let (current_year, current_month) = service.current_month();
    (
        period.year.unwrap_or(current_year as i64),
        period.month.unwrap_or(current_month as i64),
    )
}

async fn run_list_command(
    service: &ExpenseService,
    period: PeriodArgs,
    page: PageRequest,
) -> Result<()> {
    let (year, month) = resolve_period(service, period);
    let result = service.get_expense_page(year, month, page).await?;
    let pagination = result.pagination;

    if result.expenses.is_empty() {
        println!("No expenses found for {:04}-{:02}.", year, month);
        return Ok(());
    }

    println!(
        "{:<20} {:<8} {:>12}  {:<40}",
        "CREATED", "PAYER", "AMOUNT", "DESCRIPTION"
    );
    println!("{}", "-".repeat(84));
    for expense in &result.expenses {
        println!(
            "{:<20} {:<8} {:>12}  {:<40}",
            expense.created_at.format("%Y-%m-%d %H:%M:%S"),
            expense.payer,
            format_cents(expense.amount_cents),
            truncate(&expense.description, 40)
        );
    }

    println!();
    println!(
        "Page {} of {} ({} expenses in {:04}-{:02})",
        pagination.page,
        page_count(pagination.total, pagination.page_size),
        pagination.total,
        year,
        month
    );

    Ok(())
}

async fn run_totals_command(service: &ExpenseService, period: PeriodArgs, format: &str) -> Result<()> {
    let (year, month) = resolve_period(service, period);
    let totals = service.get_total_by_payer(year, month).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&totals)?),
        "table" => {
            println!("Totals for {:04}-{:02}", year, month);
            println!();
            println!("{:<10} {:>12}", "PAYER", "AMOUNT");
            println!("{}", "-".repeat(23));
            for (payer, amount) in totals.iter() {
                println!("{:<10} {:>12}", payer, format_cents(amount));
            }
            println!("{}", "-".repeat(23));
            let total = totals.total().context("Monthly total is out of range")?;
            println!("{:<10} {:>12}", "TOTAL", format_cents(total));
        }
        _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format),
    }

    Ok(())
}

async fn run_balance_command(service: &ExpenseService, period: PeriodArgs, format: &str) -> Result<()> {
    let (year, month) = resolve_period(service, period);
    let report = service.get_balance_report(year, month).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "table" => print_balance_report(year, month, &report),
        _ => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", format),
    }

    Ok(())
}

fn print_balance_report(year: i64, month: i64, report: &BalanceReport) {
    println!("Balance for {:04}-{:02}", year, month);
    println!();
    println!("{:<10} {:>12} {:>12}", "PAYER", "PAID", "BALANCE");
    println!("{}", "-".repeat(36));
    for payer in Payer::ALL {
        println!(
            "{:<10} {:>12} {:>12}",
            payer,
            format_cents(report.totals.get(payer)),
            format_cents(report.balances.get(payer))
        );
    }
    println!("{}", "-".repeat(36));
    println!("Total spent:   {}", format_cents(report.total_fund));
    println!("Each person:   {}", format_cents(report.each_person_share));
    println!();

    match &report.debt {
        Some(debt) => println!(
            "{} owes {} {}",
            debt.from,
            debt.to,
            format_cents(debt.amount)
        ),
        None => println!("All settled."),
    }
}

async fn run_export_command(
    service: &ExpenseService,
    period: PeriodArgs,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let format = ExportFormat::parse(format)?;
    let (year, month) = resolve_period(service, period);
    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        ExportFormat::Csv => {
            let count = exporter.export_expenses_csv(writer, year, month).await?;
            if output.is_some() {
                eprintln!("Exported {} expenses", count);
            }
        }
        ExportFormat::Json => {
            let snapshot = exporter.export_month_json(writer, year, month).await?;
            if output.is_some() {
                eprintln!(
                    "Exported {:04}-{:02}: {} expenses, {} total",
                    year,
                    month,
                    snapshot.expenses.len(),
                    format_cents(snapshot.summary.total_fund)
                );
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    fn parse(format: &str) -> Result<Self> {
        match format {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format),
        }
    }
}

/// Number of pages needed for `total` items, at least 1.
fn page_count(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        1
    } else {
        (total - 1) / page_size + 1
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
