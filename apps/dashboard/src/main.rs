//! # Oakline Dashboard CLI
//!
//! Runs one dashboard command and prints its result as JSON.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Load configuration from `OAKLINE_*` variables
//! 3. Open the store (in-memory fixtures or SQLite, seeded on first run)
//! 4. Dispatch the subcommand
//! 5. Print JSON, close the store
//!
//! ```text
//! $ oakline-dashboard invoices --search elite --filter status=Partial
//! $ oakline-dashboard record-payment INV-002 3840.00
//! $ OAKLINE_STORAGE=sqlite oakline-dashboard report balance-sheet
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use oakline_core::inventory::MovementKind;
use oakline_core::list::SortDirection;
use oakline_core::report::ReportKind;
use oakline_core::{CategorySelection, ListQuery, Money};
use serde::Serialize;
use tracing::info;

use oakline_dashboard::commands::billing::CreateInvoiceInput;
use oakline_dashboard::commands::inventory::StockMoveInput;
use oakline_dashboard::commands::{
    accounting, analytics, billing, credit, inventory, orders, pricing, reports, tax,
};
use oakline_dashboard::state::{DashboardConfig, SelectionState, StoreState};

#[derive(Debug, Parser)]
#[command(name = "oakline-dashboard", version, about = "Oakline ERP dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Search, filter, sort and page options shared by every table screen.
#[derive(Debug, Args)]
struct ListArgs {
    /// Case-insensitive search text
    #[arg(short, long, default_value = "")]
    search: String,

    /// Dropdown filter as NAME=LABEL, repeatable
    #[arg(short, long = "filter", value_name = "NAME=LABEL", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Sort key
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// 1-based page number
    #[arg(long)]
    page: Option<usize>,

    /// Rows per page
    #[arg(long)]
    per_page: Option<usize>,
}

impl ListArgs {
    fn to_query(&self, config: &DashboardConfig) -> ListQuery {
        let mut query = ListQuery::search(self.search.as_str());
        for (name, label) in &self.filters {
            query = query.with_category(name.as_str(), CategorySelection::only(label.as_str()));
        }
        if let Some(key) = &self.sort {
            let direction = if self.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            query = query.sorted_by(key.as_str(), direction);
        }
        if self.page.is_some() || self.per_page.is_some() {
            query = query.paged(
                self.page.unwrap_or(1),
                self.per_page.unwrap_or(config.page_size),
            );
        }
        query
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MovementArg {
    Receipt,
    Sale,
    Adjustment,
    Transfer,
    Return,
}

impl From<MovementArg> for MovementKind {
    fn from(arg: MovementArg) -> Self {
        match arg {
            MovementArg::Receipt => MovementKind::Receipt,
            MovementArg::Sale => MovementKind::Sale,
            MovementArg::Adjustment => MovementKind::Adjustment,
            MovementArg::Transfer => MovementKind::Transfer,
            MovementArg::Return => MovementKind::Return,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chart of accounts with the accounting equation
    Accounts(ListArgs),
    /// Trial balance over every account
    TrialBalance,
    /// Journal entries
    Journal(ListArgs),
    /// Balances before and after posting a journal entry, without saving
    JournalPreview { entry_id: String },
    /// Invoices
    Invoices(ListArgs),
    /// One invoice with its payment transactions
    Invoice { id: String },
    /// Record a payment against an invoice
    RecordPayment {
        id: String,
        #[arg(value_parser = parse_amount)]
        amount: Money,
    },
    /// Create an invoice from a JSON file
    CreateInvoice {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
    },
    /// Receivables aging as of the configured date
    Aging,
    /// Payment transactions
    Payments(ListArgs),
    /// Customer statements
    Statements(ListArgs),
    /// Customer credit accounts
    Credit(ListArgs),
    /// Charge a purchase against a credit line
    CreditCharge {
        id: String,
        #[arg(value_parser = parse_amount)]
        amount: Money,
    },
    /// Inventory levels and alerts
    Inventory(ListArgs),
    /// Record a stock movement
    StockMove {
        id: String,
        #[arg(value_enum)]
        kind: MovementArg,
        /// Signed quantity; sales are negative
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
        #[arg(long)]
        reference: String,
        /// Movement date, defaults to the reporting date
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Sales orders
    Orders(ListArgs),
    /// Price list with margins
    Pricing(ListArgs),
    /// Tax filings
    Tax(ListArgs),
    /// File a tax return
    TaxFile {
        id: String,
        date: NaiveDate,
    },
    /// Mark a filed tax return paid
    TaxPay {
        id: String,
        date: NaiveDate,
    },
    /// Sales analytics
    Analytics {
        #[arg(long, default_value_t = analytics::DEFAULT_TOP_CUSTOMERS)]
        top: usize,
    },
    /// Financial report (balance-sheet, income-statement, trial-balance,
    /// receivables-aging, tax-summary, inventory-valuation)
    Report { kind: ReportKind },
}

#[tokio::main]
async fn main() -> Result<()> {
    oakline_dashboard::init_tracing();
    let cli = Cli::parse();

    let config = DashboardConfig::from_env().context("invalid configuration")?;
    info!(
        business = %config.business_name,
        storage = ?config.storage,
        as_of = %config.as_of,
        "Configuration loaded"
    );

    let store = StoreState::open(&config)
        .await
        .context("failed to open the dashboard store")?;

    let result = run(cli.command, &store, &config).await;
    store.close().await;
    result
}

async fn run(command: Command, store: &StoreState, config: &DashboardConfig) -> Result<()> {
    match command {
        Command::Accounts(args) => {
            emit(&accounting::list_accounts(store, config, &args.to_query(config)).await?)
        }
        Command::TrialBalance => emit(&accounting::get_trial_balance(store).await?),
        Command::Journal(args) => {
            emit(&accounting::list_journal(store, config, &args.to_query(config)).await?)
        }
        Command::JournalPreview { entry_id } => {
            emit(&accounting::preview_posting(store, &entry_id).await?)
        }
        Command::Invoices(args) => {
            emit(&billing::list_invoices(store, config, &args.to_query(config)).await?)
        }
        Command::Invoice { id } => {
            let selections = SelectionState::new();
            emit(&billing::open_invoice(store, &selections, config, &id).await?)
        }
        Command::RecordPayment { id, amount } => {
            emit(&billing::record_payment(store, &id, amount).await?)
        }
        Command::CreateInvoice { input } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let input: CreateInvoiceInput =
                serde_json::from_str(&raw).context("invalid invoice JSON")?;
            emit(&billing::create_invoice(store, config, input).await?)
        }
        Command::Aging => emit(&billing::receivables_aging(store, config).await?),
        Command::Payments(args) => {
            emit(&billing::list_payments(store, config, &args.to_query(config)).await?)
        }
        Command::Statements(args) => {
            emit(&billing::list_statements(store, config, &args.to_query(config)).await?)
        }
        Command::Credit(args) => {
            emit(&credit::list_credit_accounts(store, config, &args.to_query(config)).await?)
        }
        Command::CreditCharge { id, amount } => {
            emit(&credit::charge_credit(store, &id, amount).await?)
        }
        Command::Inventory(args) => {
            emit(&inventory::list_inventory(store, config, &args.to_query(config)).await?)
        }
        Command::StockMove {
            id,
            kind,
            quantity,
            reference,
            date,
        } => {
            let input = StockMoveInput {
                kind: kind.into(),
                quantity,
                reference,
                date: date.unwrap_or(config.as_of),
            };
            emit(&inventory::record_stock_movement(store, &id, input).await?)
        }
        Command::Orders(args) => {
            emit(&orders::list_orders(store, config, &args.to_query(config)).await?)
        }
        Command::Pricing(args) => {
            emit(&pricing::list_prices(store, config, &args.to_query(config)).await?)
        }
        Command::Tax(args) => {
            emit(&tax::list_tax_filings(store, config, &args.to_query(config)).await?)
        }
        Command::TaxFile { id, date } => emit(&tax::file_tax_return(store, &id, date).await?),
        Command::TaxPay { id, date } => emit(&tax::mark_tax_paid(store, &id, date).await?),
        Command::Analytics { top } => emit(&analytics::get_sales_analytics(store, top).await?),
        Command::Report { kind } => emit(&reports::generate_report(store, config, kind).await?),
    }
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (name, label) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=LABEL, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("filter name is empty".to_string());
    }
    Ok((name.to_string(), label.trim().to_string()))
}

/// Parses a decimal amount such as `3840`, `3840.5` or `-12.34` into cents.
fn parse_amount(raw: &str) -> Result<Money, String> {
    let raw = raw.trim().replace(',', "");
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || fraction.len() > 2 || !digits_only(whole) || !digits_only(fraction) {
        return Err(format!("'{}' is not an amount with at most two decimals", raw));
    }
    let whole: i64 = whole
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    let fraction: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<2}", fraction)
            .parse()
            .map_err(|_| format!("'{}' is not a number", raw))?
    };
    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(|| format!("'{}' is too large", raw))?;
    Ok(Money::from_cents(if negative { -cents } else { cents }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("3840"), Ok(Money::from_major(3_840)));
        assert_eq!(parse_amount("1,250.5"), Ok(Money::from_cents(125_050)));
        assert_eq!(parse_amount("-0.07"), Ok(Money::from_cents(-7)));
        assert!(parse_amount("12.345").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount(".5").is_err());
        assert!(parse_amount("1.-5").is_err());
        assert!(parse_amount("1.+5").is_err());
        assert!(parse_amount("+1").is_err());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("status=Partial"),
            Ok(("status".to_string(), "Partial".to_string()))
        );
        assert!(parse_filter("status").is_err());
    }

    #[test]
    fn test_list_args_build_query() {
        let cli = Cli::parse_from([
            "oakline-dashboard",
            "invoices",
            "--search",
            "elite",
            "--filter",
            "status=Partial",
            "--sort",
            "dueDate",
            "--desc",
            "--page",
            "2",
        ]);
        let Command::Invoices(args) = cli.command else {
            panic!("expected invoices");
        };
        let query = args.to_query(&DashboardConfig::default());
        assert_eq!(query.search, "elite");
        assert_eq!(
            query.categories.get("status"),
            Some(&CategorySelection::only("Partial"))
        );
        assert_eq!(query.page.map(|p| p.page), Some(2));
    }

    #[test]
    fn test_negative_sale_quantity_parses() {
        let cli = Cli::parse_from([
            "oakline-dashboard",
            "stock-move",
            "INV-001",
            "sale",
            "-5",
            "--reference",
            "ORD-2024-011",
        ]);
        assert!(matches!(cli.command, Command::StockMove { quantity: -5, .. }));
    }
}
