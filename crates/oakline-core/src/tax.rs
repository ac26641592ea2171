//! # Tax Management
//!
//! Periodic sales-tax filings: what was collected, what was paid on
//! purchases, and what is owed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::list::{count_where, sum_money, AggregateScope, AggregateValue, ListSpec};
use crate::money::Money;
use crate::record::Record;
use crate::validation::{check_invariant, validate_date_order};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum FilingStatus {
    Draft,
    Filed,
    Paid,
    Overdue,
}

impl FilingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FilingStatus::Draft => "Draft",
            FilingStatus::Filed => "Filed",
            FilingStatus::Paid => "Paid",
            FilingStatus::Overdue => "Overdue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxFiling {
    pub id: String,
    /// Display period, e.g. "Q4 2023".
    pub period: String,
    pub jurisdiction: String,
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    #[ts(as = "String")]
    pub period_end: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub tax_collected: Money,
    pub input_tax: Money,
    pub net_payable: Money,
    pub status: FilingStatus,
    #[ts(as = "Option<String>")]
    pub filed_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub paid_date: Option<NaiveDate>,
}

impl TaxFiling {
    /// Whether the filing still owes money.
    pub fn is_outstanding(&self) -> bool {
        self.status != FilingStatus::Paid
    }

    pub fn check_invariants(&self) -> CoreResult<()> {
        check_invariant(
            &self.id,
            self.net_payable == self.tax_collected - self.input_tax,
            || {
                format!(
                    "net payable {} != collected {} - input {}",
                    self.net_payable, self.tax_collected, self.input_tax
                )
            },
        )?;
        let dates_consistent = match self.status {
            FilingStatus::Draft | FilingStatus::Overdue => self.filed_date.is_none(),
            FilingStatus::Filed => self.filed_date.is_some() && self.paid_date.is_none(),
            FilingStatus::Paid => self.filed_date.is_some() && self.paid_date.is_some(),
        };
        check_invariant(&self.id, dates_consistent, || {
            format!("{} filing with inconsistent dates", self.status.label())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum TaxAction {
    File { date: NaiveDate },
    MarkPaid { date: NaiveDate },
}

impl Record for TaxFiling {
    const KIND: &'static str = "TaxFiling";
    type Patch = TaxAction;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: TaxAction) -> CoreResult<()> {
        match patch {
            TaxAction::File { date } => {
                if !matches!(self.status, FilingStatus::Draft | FilingStatus::Overdue) {
                    return Err(CoreError::invalid_status(
                        Self::KIND,
                        &self.id,
                        self.status.label(),
                        "file",
                    ));
                }
                validate_date_order("filedDate", self.period_end, date)?;
                self.filed_date = Some(date);
                self.status = FilingStatus::Filed;
            }
            TaxAction::MarkPaid { date } => {
                let Some(filed) = self.filed_date.filter(|_| self.status == FilingStatus::Filed) else {
                    return Err(CoreError::invalid_status(
                        Self::KIND,
                        &self.id,
                        self.status.label(),
                        "mark paid",
                    ));
                };
                validate_date_order("paidDate", filed, date)?;
                self.paid_date = Some(date);
                self.status = FilingStatus::Paid;
            }
        }
        self.check_invariants()
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("id", |t| t.id.as_str())
            .search_field("period", |t| t.period.as_str())
            .search_field("jurisdiction", |t| t.jurisdiction.as_str())
            .category("status", |t| t.status.label())
            .category("jurisdiction", |t| t.jurisdiction.as_str())
            .sort_key("dueDate", |a, b| a.due_date.cmp(&b.due_date))
            .sort_key("netPayable", |a, b| a.net_payable.cmp(&b.net_payable))
            .aggregate("totalCollected", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |t| t.tax_collected))
            })
            .aggregate("totalInputTax", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |t| t.input_tax))
            })
            .aggregate("outstandingPayable", AggregateScope::All, |rows| {
                AggregateValue::Money(sum_money(rows, |t| {
                    if t.is_outstanding() {
                        t.net_payable
                    } else {
                        Money::zero()
                    }
                }))
            })
            .aggregate("overdueCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |t| t.status == FilingStatus::Overdue))
            })
    }
}

/// Totals over a set of filings, for the tax summary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummary {
    pub filings: Vec<TaxFiling>,
    pub total_collected: Money,
    pub total_input_tax: Money,
    pub total_net_payable: Money,
    pub outstanding: Money,
    pub overdue_count: u64,
}

pub fn tax_summary(filings: &[TaxFiling]) -> TaxSummary {
    TaxSummary {
        filings: filings.to_vec(),
        total_collected: filings.iter().map(|f| f.tax_collected).sum(),
        total_input_tax: filings.iter().map(|f| f.input_tax).sum(),
        total_net_payable: filings.iter().map(|f| f.net_payable).sum(),
        outstanding: filings
            .iter()
            .filter(|f| f.is_outstanding())
            .map(|f| f.net_payable)
            .sum(),
        overdue_count: filings
            .iter()
            .filter(|f| f.status == FilingStatus::Overdue)
            .count() as u64,
    }
}
