//! # Financial Reports
//!
//! Every report the dashboard can open, as one tagged union. Each variant
//! carries its own statically-typed body, so a consumer matches on `kind`
//! and never has to guess a payload's shape.
//!
//! ```json
//! { "kind": "trialBalance", "data": { "rows": [...], "totalDebits": ... } }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::accounting::{trial_balance, Account, AccountType, AccountingSummary, TrialBalance};
use crate::billing::{aging_report, AgingReport, Invoice};
use crate::error::ValidationError;
use crate::inventory::InventoryItem;
use crate::money::{Money, Rate};
use crate::tax::{tax_summary, TaxFiling, TaxSummary};

// =============================================================================
// Report Bodies
// =============================================================================

/// One account line on a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub code: String,
    pub name: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    #[ts(as = "String")]
    pub as_of: NaiveDate,
    pub assets: Vec<ReportLine>,
    pub liabilities: Vec<ReportLine>,
    /// Equity accounts plus a current-earnings line.
    pub equity: Vec<ReportLine>,
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub total_equity: Money,
    pub balanced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    pub revenue: Vec<ReportLine>,
    pub expenses: Vec<ReportLine>,
    pub total_revenue: Money,
    pub total_expenses: Money,
    pub net_income: Money,
    pub net_margin: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValuationLine {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub units: i64,
    pub unit_cost: Money,
    pub value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryValue {
    pub category: String,
    pub value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryValuation {
    pub lines: Vec<ValuationLine>,
    pub by_category: Vec<CategoryValue>,
    pub total_units: i64,
    pub total_value: Money,
}

// =============================================================================
// Report Union
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum FinancialReport {
    BalanceSheet(BalanceSheet),
    IncomeStatement(IncomeStatement),
    TrialBalance(TrialBalance),
    ReceivablesAging(AgingReport),
    TaxSummary(TaxSummary),
    InventoryValuation(InventoryValuation),
}

impl FinancialReport {
    pub fn kind(&self) -> ReportKind {
        match self {
            FinancialReport::BalanceSheet(_) => ReportKind::BalanceSheet,
            FinancialReport::IncomeStatement(_) => ReportKind::IncomeStatement,
            FinancialReport::TrialBalance(_) => ReportKind::TrialBalance,
            FinancialReport::ReceivablesAging(_) => ReportKind::ReceivablesAging,
            FinancialReport::TaxSummary(_) => ReportKind::TaxSummary,
            FinancialReport::InventoryValuation(_) => ReportKind::InventoryValuation,
        }
    }
}

/// Selects a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    BalanceSheet,
    IncomeStatement,
    TrialBalance,
    ReceivablesAging,
    TaxSummary,
    InventoryValuation,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::BalanceSheet,
        ReportKind::IncomeStatement,
        ReportKind::TrialBalance,
        ReportKind::ReceivablesAging,
        ReportKind::TaxSummary,
        ReportKind::InventoryValuation,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::BalanceSheet => "balance-sheet",
            ReportKind::IncomeStatement => "income-statement",
            ReportKind::TrialBalance => "trial-balance",
            ReportKind::ReceivablesAging => "receivables-aging",
            ReportKind::TaxSummary => "tax-summary",
            ReportKind::InventoryValuation => "inventory-valuation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::BalanceSheet => "Balance Sheet",
            ReportKind::IncomeStatement => "Income Statement",
            ReportKind::TrialBalance => "Trial Balance",
            ReportKind::ReceivablesAging => "Receivables Aging",
            ReportKind::TaxSummary => "Tax Summary",
            ReportKind::InventoryValuation => "Inventory Valuation",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "report".to_string(),
                allowed: ReportKind::ALL.iter().map(|k| k.slug().to_string()).collect(),
            })
    }
}

// =============================================================================
// Generation
// =============================================================================

/// The record sets reports are built from.
#[derive(Debug, Clone, Copy)]
pub struct Books<'a> {
    pub accounts: &'a [Account],
    pub invoices: &'a [Invoice],
    pub tax_filings: &'a [TaxFiling],
    pub inventory: &'a [InventoryItem],
    pub as_of: NaiveDate,
}

pub fn generate(kind: ReportKind, books: &Books<'_>) -> FinancialReport {
    match kind {
        ReportKind::BalanceSheet => {
            FinancialReport::BalanceSheet(balance_sheet(books.accounts, books.as_of))
        }
        ReportKind::IncomeStatement => {
            FinancialReport::IncomeStatement(income_statement(books.accounts))
        }
        ReportKind::TrialBalance => FinancialReport::TrialBalance(trial_balance(books.accounts)),
        ReportKind::ReceivablesAging => {
            FinancialReport::ReceivablesAging(aging_report(books.invoices, books.as_of))
        }
        ReportKind::TaxSummary => FinancialReport::TaxSummary(tax_summary(books.tax_filings)),
        ReportKind::InventoryValuation => {
            FinancialReport::InventoryValuation(inventory_valuation(books.inventory))
        }
    }
}

fn lines_of(accounts: &[Account], account_type: AccountType) -> Vec<ReportLine> {
    let mut lines: Vec<ReportLine> = accounts
        .iter()
        .filter(|a| a.account_type == account_type)
        .map(|a| ReportLine {
            code: a.code.clone(),
            name: a.name.clone(),
            amount: a.balance,
        })
        .collect();
    lines.sort_by(|a, b| a.code.cmp(&b.code));
    lines
}

pub fn balance_sheet(accounts: &[Account], as_of: NaiveDate) -> BalanceSheet {
    let summary = AccountingSummary::from_accounts(accounts);
    let mut equity = lines_of(accounts, AccountType::Equity);
    equity.push(ReportLine {
        code: String::new(),
        name: "Current Earnings".to_string(),
        amount: summary.net_income,
    });
    let total_equity = summary.total_equity + summary.net_income;

    BalanceSheet {
        as_of,
        assets: lines_of(accounts, AccountType::Asset),
        liabilities: lines_of(accounts, AccountType::Liability),
        equity,
        total_assets: summary.total_assets,
        total_liabilities: summary.total_liabilities,
        total_equity,
        balanced: summary.is_balanced(),
    }
}

pub fn income_statement(accounts: &[Account]) -> IncomeStatement {
    let summary = AccountingSummary::from_accounts(accounts);
    IncomeStatement {
        revenue: lines_of(accounts, AccountType::Revenue),
        expenses: lines_of(accounts, AccountType::Expense),
        total_revenue: summary.total_revenue,
        total_expenses: summary.total_expenses,
        net_income: summary.net_income,
        net_margin: Rate::ratio(summary.net_income, summary.total_revenue).unwrap_or_default(),
    }
}

pub fn inventory_valuation(items: &[InventoryItem]) -> InventoryValuation {
    let lines: Vec<ValuationLine> = items
        .iter()
        .map(|item| ValuationLine {
            sku: item.sku.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            units: item.current_stock,
            unit_cost: item.unit_cost,
            value: item.stock_value(),
        })
        .collect();

    let mut categories: BTreeMap<&str, Money> = BTreeMap::new();
    for line in &lines {
        *categories.entry(line.category.as_str()).or_default() += line.value;
    }
    let by_category = categories
        .into_iter()
        .map(|(category, value)| CategoryValue {
            category: category.to_string(),
            value,
        })
        .collect();

    InventoryValuation {
        total_units: lines.iter().map(|l| l.units).sum(),
        total_value: lines.iter().map(|l| l.value).sum(),
        by_category,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn with_books<R>(f: impl FnOnce(&Books<'_>) -> R) -> R {
        let accounts = fixtures::accounts();
        let invoices = fixtures::invoices();
        let filings = fixtures::tax_filings();
        let inventory = fixtures::inventory_items();
        let books = Books {
            accounts: &accounts,
            invoices: &invoices,
            tax_filings: &filings,
            inventory: &inventory,
            as_of: fixtures::as_of(),
        };
        f(&books)
    }

    #[test]
    fn test_every_kind_generates_matching_variant() {
        with_books(|books| {
            for kind in ReportKind::ALL {
                assert_eq!(generate(kind, books).kind(), kind);
            }
        });
    }

    #[test]
    fn test_balance_sheet_balances() {
        with_books(|books| {
            let FinancialReport::BalanceSheet(sheet) = generate(ReportKind::BalanceSheet, books)
            else {
                panic!("wrong variant");
            };
            assert!(sheet.balanced);
            assert_eq!(sheet.total_assets, sheet.total_liabilities + sheet.total_equity);
        });
    }

    #[test]
    fn test_income_statement_margin() {
        let statement = income_statement(&fixtures::accounts());
        assert_eq!(statement.total_revenue, Money::from_major(397_000));
        assert_eq!(statement.net_income, Money::from_major(25_000));
        // 25,000 / 397,000
        assert_eq!(statement.net_margin, Rate::from_bps(630));
        assert_eq!(income_statement(&[]).net_margin, Rate::zero());
    }

    #[test]
    fn test_inventory_valuation() {
        let valuation = inventory_valuation(&fixtures::inventory_items());
        // 45×1,200 + 12×700 + 150×180 + 0×850 + 60×150
        assert_eq!(valuation.total_value, Money::from_major(98_400));
        assert_eq!(valuation.total_units, 267);
        let by_category: Money = valuation.by_category.iter().map(|c| c.value).sum();
        assert_eq!(by_category, valuation.total_value);
    }

    #[test]
    fn test_report_json_is_tagged() {
        let report = with_books(|books| generate(ReportKind::TaxSummary, books));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "taxSummary");
        assert!(json["data"]["totalCollected"].is_number());
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("trial-balance".parse::<ReportKind>().unwrap(), ReportKind::TrialBalance);
        assert_eq!(" Balance-Sheet ".parse::<ReportKind>().unwrap(), ReportKind::BalanceSheet);
        assert!("cash-flow".parse::<ReportKind>().is_err());
    }
}
