//! # Accounting
//!
//! Chart of accounts, journal entries, posting and the trial balance.
//!
//! ## Normal Sides
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Where a balance sits in the trial balance              │
//! │                                                                         │
//! │   Debit column               │   Credit column                          │
//! │   ─────────────              │   ─────────────                          │
//! │   asset                      │   liability                              │
//! │   expense                    │   equity                                 │
//! │                              │   revenue                                │
//! │                                                                         │
//! │   Σ debit column == Σ credit column  ⇔  books balance                  │
//! │   assets == liabilities + equity + (revenue - expenses)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Balances are stored as positive amounts on the account's normal side.
//! Posting a journal line adds `debit - credit` to debit-normal accounts
//! and `credit - debit` to credit-normal accounts, so a balanced entry keeps
//! the trial balance balanced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::list::{count_where, sum_money, AggregateScope, AggregateValue, ListSpec};
use crate::money::Money;
use crate::record::Record;
use crate::validation::validate_account_code;

// =============================================================================
// Account Type
// =============================================================================

/// The five account classes of double-entry bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::Asset,
        AccountType::Liability,
        AccountType::Equity,
        AccountType::Revenue,
        AccountType::Expense,
    ];

    /// Dropdown label.
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
        }
    }

    pub fn normal_side(&self) -> NormalSide {
        NormalSide::of(*self)
    }
}

/// The side of the ledger on which an account's balance increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    Debit,
    Credit,
}

impl NormalSide {
    /// Asset and expense accounts are debit-normal; all others credit-normal.
    pub fn of(account_type: AccountType) -> NormalSide {
        match account_type {
            AccountType::Asset | AccountType::Expense => NormalSide::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => {
                NormalSide::Credit
            }
        }
    }
}

// =============================================================================
// Account
// =============================================================================

/// A ledger account in the chart of accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    /// Four-digit chart code ("1000" = Cash).
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Balance on the account's normal side.
    pub balance: Money,
    pub active: bool,
}

impl Account {
    pub fn normal_side(&self) -> NormalSide {
        self.account_type.normal_side()
    }

    pub fn status_label(&self) -> &'static str {
        if self.active {
            "Active"
        } else {
            "Inactive"
        }
    }

    /// Applies one journal line to this account's balance.
    fn apply_line(&mut self, line: &JournalLine) {
        let debit = line.debit.unwrap_or_default();
        let credit = line.credit.unwrap_or_default();
        match self.normal_side() {
            NormalSide::Debit => self.balance += debit - credit,
            NormalSide::Credit => self.balance += credit - debit,
        }
    }
}

/// State changes an account's detail overlay can make.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum AccountPatch {
    Rename { name: String },
    SetActive { active: bool },
}

impl Record for Account {
    const KIND: &'static str = "Account";
    type Patch = AccountPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: AccountPatch) -> CoreResult<()> {
        match patch {
            AccountPatch::Rename { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ValidationError::Required {
                        field: "name".to_string(),
                    }
                    .into());
                }
                self.name = name.to_string();
            }
            AccountPatch::SetActive { active } => {
                if !active && !self.balance.is_zero() {
                    return Err(CoreError::invalid_status(
                        Self::KIND,
                        &self.id,
                        format!("carrying a balance of {}", self.balance),
                        "deactivate",
                    ));
                }
                self.active = active;
            }
        }
        Ok(())
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("code", |a| a.code.as_str())
            .search_field("name", |a| a.name.as_str())
            .category("type", |a| a.account_type.label())
            .category("status", |a| a.status_label())
            .sort_key("code", |a, b| a.code.cmp(&b.code))
            .sort_key("name", |a, b| a.name.cmp(&b.name))
            .sort_key("balance", |a, b| a.balance.cmp(&b.balance))
            .aggregate("totalAssets", AggregateScope::All, |rows| {
                AggregateValue::Money(total_of(rows, AccountType::Asset))
            })
            .aggregate("totalLiabilities", AggregateScope::All, |rows| {
                AggregateValue::Money(total_of(rows, AccountType::Liability))
            })
            .aggregate("totalEquity", AggregateScope::All, |rows| {
                AggregateValue::Money(total_of(rows, AccountType::Equity))
            })
            .aggregate("totalRevenue", AggregateScope::All, |rows| {
                AggregateValue::Money(total_of(rows, AccountType::Revenue))
            })
            .aggregate("totalExpenses", AggregateScope::All, |rows| {
                AggregateValue::Money(total_of(rows, AccountType::Expense))
            })
            .aggregate("netIncome", AggregateScope::All, |rows| {
                AggregateValue::Money(
                    total_of(rows, AccountType::Revenue) - total_of(rows, AccountType::Expense),
                )
            })
            .aggregate("activeAccounts", AggregateScope::Filtered, |rows| {
                AggregateValue::Count(count_where(rows, |a| a.active))
            })
            .aggregate("filteredBalance", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |a| a.balance))
            })
    }
}

fn total_of(rows: &[&Account], account_type: AccountType) -> Money {
    rows.iter()
        .filter(|a| a.account_type == account_type)
        .map(|a| a.balance)
        .sum()
}

// =============================================================================
// Accounting Summary
// =============================================================================

/// The accounting screen's header tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AccountingSummary {
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub total_equity: Money,
    pub total_revenue: Money,
    pub total_expenses: Money,
    pub net_income: Money,
    /// `assets - (liabilities + equity + net income)`; zero when balanced.
    pub equation_difference: Money,
}

impl AccountingSummary {
    pub fn from_accounts(accounts: &[Account]) -> Self {
        let rows: Vec<&Account> = accounts.iter().collect();
        let total_assets = total_of(&rows, AccountType::Asset);
        let total_liabilities = total_of(&rows, AccountType::Liability);
        let total_equity = total_of(&rows, AccountType::Equity);
        let total_revenue = total_of(&rows, AccountType::Revenue);
        let total_expenses = total_of(&rows, AccountType::Expense);
        let net_income = total_revenue - total_expenses;

        AccountingSummary {
            total_assets,
            total_liabilities,
            total_equity,
            total_revenue,
            total_expenses,
            net_income,
            equation_difference: total_assets - (total_liabilities + total_equity + net_income),
        }
    }

    /// True when `assets == liabilities + equity + net income`.
    pub fn is_balanced(&self) -> bool {
        self.equation_difference.is_zero()
    }
}

// =============================================================================
// Trial Balance
// =============================================================================

/// One account row of the trial balance. Exactly one column is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceRow {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
}

/// All accounts split into debit and credit columns, with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debits: Money,
    pub total_credits: Money,
    pub is_balanced: bool,
}

impl TrialBalance {
    pub fn difference(&self) -> Money {
        self.total_debits - self.total_credits
    }
}

/// Builds the trial balance in chart-code order.
///
/// The column is chosen by account type alone, so every row has exactly
/// one amount; a negative balance shows as a negative amount in its
/// normal column.
pub fn trial_balance(accounts: &[Account]) -> TrialBalance {
    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by(|a, b| a.code.cmp(&b.code));

    let rows: Vec<TrialBalanceRow> = sorted
        .into_iter()
        .map(|account| {
            let (debit, credit) = match account.normal_side() {
                NormalSide::Debit => (Some(account.balance), None),
                NormalSide::Credit => (None, Some(account.balance)),
            };
            TrialBalanceRow {
                code: account.code.clone(),
                name: account.name.clone(),
                account_type: account.account_type,
                debit,
                credit,
            }
        })
        .collect();

    let total_debits: Money = rows.iter().filter_map(|r| r.debit).sum();
    let total_credits: Money = rows.iter().filter_map(|r| r.credit).sum();

    TrialBalance {
        rows,
        total_debits,
        total_credits,
        is_balanced: total_debits == total_credits,
    }
}

// =============================================================================
// Journal Entries
// =============================================================================

/// One line of a journal entry: an account code and one side's amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct JournalLine {
    pub account: String,
    #[serde(default)]
    pub debit: Option<Money>,
    #[serde(default)]
    pub credit: Option<Money>,
}

impl JournalLine {
    pub fn debit(account: impl Into<String>, amount: Money) -> Self {
        JournalLine {
            account: account.into(),
            debit: Some(amount),
            credit: None,
        }
    }

    pub fn credit(account: impl Into<String>, amount: Money) -> Self {
        JournalLine {
            account: account.into(),
            debit: None,
            credit: Some(amount),
        }
    }
}

/// A dated, referenced set of balanced journal lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub lines: Vec<JournalLine>,
    pub total: Money,
    pub posted: bool,
}

impl JournalEntry {
    pub fn debits(&self) -> Money {
        self.lines.iter().filter_map(|l| l.debit).sum()
    }

    pub fn credits(&self) -> Money {
        self.lines.iter().filter_map(|l| l.credit).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.debits() == self.credits()
    }

    pub fn status_label(&self) -> &'static str {
        if self.posted {
            "Posted"
        } else {
            "Draft"
        }
    }

    /// Checks line shape, balance and the stated total.
    ///
    /// ## Rules
    /// - At least two lines
    /// - Each line has exactly one side, with a positive amount
    /// - Σ debits == Σ credits
    /// - `total` equals Σ debits
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.len() < 2 {
            return Err(ValidationError::OutOfRange {
                field: "lines".to_string(),
                min: 2,
                max: i64::MAX,
            }
            .into());
        }

        for line in &self.lines {
            validate_account_code(&line.account)?;
            match (line.debit, line.credit) {
                (Some(amount), None) | (None, Some(amount)) if amount.is_positive() => {}
                (Some(_), None) | (None, Some(_)) => {
                    return Err(ValidationError::MustBePositive {
                        field: format!("amount on {}", line.account),
                    }
                    .into());
                }
                _ => {
                    return Err(ValidationError::InvalidFormat {
                        field: format!("line {}", line.account),
                        reason: "must have exactly one of debit or credit".to_string(),
                    }
                    .into());
                }
            }
        }

        let debits = self.debits();
        let credits = self.credits();
        if debits != credits {
            return Err(CoreError::UnbalancedEntry {
                entry_id: self.id.clone(),
                debits: debits.cents(),
                credits: credits.cents(),
            });
        }

        if self.total != debits {
            return Err(CoreError::InvariantViolation {
                id: self.id.clone(),
                rule: format!("total {} != debits {}", self.total, debits),
            });
        }

        Ok(())
    }
}

/// Posts a journal entry to the chart of accounts.
///
/// Validates the entry and resolves every account code before touching any
/// balance, so a rejected entry leaves `accounts` unchanged.
pub fn post_journal_entry(accounts: &mut [Account], entry: &JournalEntry) -> CoreResult<()> {
    entry.validate()?;
    if entry.posted {
        return Err(CoreError::invalid_status(
            JournalEntry::KIND,
            &entry.id,
            "Posted",
            "post again",
        ));
    }

    let mut targets = Vec::with_capacity(entry.lines.len());
    for line in &entry.lines {
        let index = accounts
            .iter()
            .position(|a| a.code == line.account)
            .ok_or_else(|| CoreError::UnknownAccount(line.account.clone()))?;
        if !accounts[index].active {
            return Err(CoreError::invalid_status(
                Account::KIND,
                &accounts[index].id,
                "Inactive",
                "post",
            ));
        }
        targets.push(index);
    }

    for (line, index) in entry.lines.iter().zip(targets) {
        accounts[index].apply_line(line);
    }
    Ok(())
}

/// Editable journal header fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryPatch {
    pub reference: Option<String>,
    pub description: Option<String>,
}

impl Record for JournalEntry {
    const KIND: &'static str = "JournalEntry";
    type Patch = JournalEntryPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: JournalEntryPatch) -> CoreResult<()> {
        if self.posted {
            return Err(CoreError::invalid_status(Self::KIND, &self.id, "Posted", "edit"));
        }
        if let Some(reference) = patch.reference {
            if reference.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "reference".to_string(),
                }
                .into());
            }
            self.reference = reference.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        Ok(())
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("id", |e| e.id.as_str())
            .search_field("reference", |e| e.reference.as_str())
            .search_field("description", |e| e.description.as_str())
            .category("status", |e| e.status_label())
            .sort_key("date", |a, b| a.date.cmp(&b.date))
            .sort_key("total", |a, b| a.total.cmp(&b.total))
            .aggregate("entryCount", AggregateScope::Filtered, |rows| {
                AggregateValue::Count(rows.len() as u64)
            })
            .aggregate("totalAmount", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |e| e.total))
            })
            .aggregate("unbalancedEntries", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |e| !e.is_balanced()))
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::list::{CategorySelection, ListQuery};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(lines: Vec<JournalLine>, total: i64) -> JournalEntry {
        JournalEntry {
            id: "JE-900".to_string(),
            date: date(2024, 2, 1),
            reference: "TEST".to_string(),
            description: "test entry".to_string(),
            lines,
            total: Money::from_major(total),
            posted: false,
        }
    }

    #[test]
    fn test_normal_sides() {
        assert_eq!(NormalSide::of(AccountType::Asset), NormalSide::Debit);
        assert_eq!(NormalSide::of(AccountType::Expense), NormalSide::Debit);
        assert_eq!(NormalSide::of(AccountType::Liability), NormalSide::Credit);
        assert_eq!(NormalSide::of(AccountType::Equity), NormalSide::Credit);
        assert_eq!(NormalSide::of(AccountType::Revenue), NormalSide::Credit);
    }

    #[test]
    fn test_trial_balance_columns_follow_type() {
        let tb = trial_balance(&fixtures::accounts());
        for row in &tb.rows {
            assert!(row.debit.is_some() ^ row.credit.is_some());
            let debit_side = matches!(row.account_type, AccountType::Asset | AccountType::Expense);
            assert_eq!(row.debit.is_some(), debit_side, "row {}", row.code);
        }
        assert!(tb.is_balanced);
        assert_eq!(tb.difference(), Money::zero());
    }

    #[test]
    fn test_summary_equation() {
        let summary = AccountingSummary::from_accounts(&fixtures::accounts());
        assert_eq!(summary.net_income, Money::from_major(25_000));
        assert!(summary.is_balanced());
    }

    #[test]
    fn test_validate_rejects_unbalanced_and_malformed() {
        let unbalanced = entry(
            vec![
                JournalLine::debit("5100", Money::from_major(1000)),
                JournalLine::credit("1000", Money::from_major(900)),
            ],
            1000,
        );
        assert!(matches!(
            unbalanced.validate(),
            Err(CoreError::UnbalancedEntry { .. })
        ));

        let both_sides = entry(
            vec![
                JournalLine {
                    account: "5100".to_string(),
                    debit: Some(Money::from_major(10)),
                    credit: Some(Money::from_major(10)),
                },
                JournalLine::credit("1000", Money::from_major(10)),
            ],
            10,
        );
        assert!(matches!(both_sides.validate(), Err(CoreError::Validation(_))));

        let single = entry(vec![JournalLine::debit("5100", Money::from_major(10))], 10);
        assert!(single.validate().is_err());
    }

    #[test]
    fn test_posting_keeps_trial_balance_balanced() {
        let mut accounts = fixtures::accounts();
        let je = entry(
            vec![
                JournalLine::debit("1100", Money::from_major(4_000)),
                JournalLine::credit("4000", Money::from_major(4_000)),
            ],
            4_000,
        );
        post_journal_entry(&mut accounts, &je).unwrap();

        let receivable = accounts.iter().find(|a| a.code == "1100").unwrap();
        assert_eq!(receivable.balance, Money::from_major(88_500));
        let sales = accounts.iter().find(|a| a.code == "4000").unwrap();
        assert_eq!(sales.balance, Money::from_major(389_000));
        assert!(trial_balance(&accounts).is_balanced);
    }

    #[test]
    fn test_posting_unknown_account_changes_nothing() {
        let mut accounts = fixtures::accounts();
        let before = accounts.clone();
        let je = entry(
            vec![
                JournalLine::debit("1000", Money::from_major(50)),
                JournalLine::credit("9999", Money::from_major(50)),
            ],
            50,
        );
        assert!(matches!(
            post_journal_entry(&mut accounts, &je),
            Err(CoreError::UnknownAccount(code)) if code == "9999"
        ));
        assert_eq!(accounts, before);
    }

    #[test]
    fn test_fixture_journal_entries_are_balanced() {
        for je in fixtures::journal_entries() {
            je.validate().unwrap();
        }
    }

    #[test]
    fn test_account_list_filters_by_type() {
        let accounts = fixtures::accounts();
        let query = ListQuery::default().with_category("type", CategorySelection::only("expense"));
        let page = Account::list_spec().view(&accounts, &query);
        assert!(page.items.iter().all(|a| a.account_type == AccountType::Expense));
        // header tiles use the full chart regardless of the filter
        assert_eq!(
            page.aggregate("totalAssets").and_then(|v| v.as_money()),
            Some(Money::from_major(514_500))
        );
    }

    #[test]
    fn test_deactivate_requires_zero_balance() {
        let mut accounts = fixtures::accounts();
        let cash = accounts.iter_mut().find(|a| a.code == "1000").unwrap();
        assert!(cash.apply_patch(AccountPatch::SetActive { active: false }).is_err());

        let marketing = accounts.iter_mut().find(|a| a.code == "5400").unwrap();
        marketing
            .apply_patch(AccountPatch::SetActive { active: true })
            .unwrap();
        assert!(marketing.active);
    }
}
