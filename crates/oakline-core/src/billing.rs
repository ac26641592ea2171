//! # Billing
//!
//! Invoices, customer statements, payment transactions and receivables
//! aging.
//!
//! ## Invoice Lifecycle
//! ```text
//!              send              record_payment            record_payment
//!   Draft ───────────► Sent ───────────────────► Partial ─────────────────► Paid
//!     │                 │  │                        │
//!     │                 │  └──mark_overdue──► Overdue ◄──mark_overdue──┘
//!     │                 │                        │
//!     └─────cancel──────┴────────cancel──────────┘ (only while paid == 0)
//!                       ▼
//!                   Cancelled
//! ```
//!
//! ## Invariants
//! - `subtotal == Σ line amounts`, `line amount == quantity × unit price`
//! - `total == subtotal + tax - discount`
//! - `balance == total - paid`, `0 <= paid <= total`
//! - `Paid` ⇔ positive total with zero balance

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::list::{count_where, rate_or_zero, sum_money, AggregateScope, AggregateValue, ListSpec};
use crate::money::{Money, Rate};
use crate::record::{NoPatch, Record};
use crate::types::PaymentMethod;
use crate::validation::{
    check_invariant, validate_date_order, validate_name, validate_positive_amount,
    validate_quantity, validate_rate,
};

// =============================================================================
// Invoice
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Sent => "Sent",
            InvoiceStatus::Partial => "Partial",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::Cancelled => "Cancelled",
        }
    }

    /// Statuses whose balance counts as a receivable.
    pub fn is_receivable(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Sent | InvoiceStatus::Partial | InvoiceStatus::Overdue
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
}

impl InvoiceLineItem {
    pub fn new(description: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        InvoiceLineItem {
            description: description.into(),
            quantity,
            unit_price,
            amount: unit_price.multiply_quantity(quantity),
        }
    }
}

/// A customer invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub order_number: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub line_items: Vec<InvoiceLineItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub paid: Money,
    pub balance: Money,
    pub status: InvoiceStatus,
}

impl Invoice {
    /// Re-derives subtotal, total and balance from lines, tax, discount and paid.
    pub fn recalculate(&mut self) {
        for line in &mut self.line_items {
            line.amount = line.unit_price.multiply_quantity(line.quantity);
        }
        self.subtotal = self.line_items.iter().map(|l| l.amount).sum();
        self.total = self.subtotal + self.tax - self.discount;
        self.balance = self.total - self.paid;
    }

    /// Whole days past due as of `as_of`; zero when not yet due.
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.due_date).num_days().max(0)
    }

    /// Checks every arithmetic and status invariant.
    pub fn check_invariants(&self) -> CoreResult<()> {
        for line in &self.line_items {
            check_invariant(
                &self.id,
                line.amount == line.unit_price.multiply_quantity(line.quantity),
                || format!("line '{}' amount != quantity × unit price", line.description),
            )?;
        }
        let lines: Money = self.line_items.iter().map(|l| l.amount).sum();
        check_invariant(&self.id, self.subtotal == lines, || {
            format!("subtotal {} != line total {}", self.subtotal, lines)
        })?;
        check_invariant(
            &self.id,
            self.total == self.subtotal + self.tax - self.discount,
            || "total != subtotal + tax - discount".to_string(),
        )?;
        check_invariant(&self.id, self.balance == self.total - self.paid, || {
            format!("balance {} != total {} - paid {}", self.balance, self.total, self.paid)
        })?;
        check_invariant(
            &self.id,
            !self.paid.is_negative() && self.paid <= self.total,
            || format!("paid {} outside 0..={}", self.paid, self.total),
        )?;
        let settled = self.total.is_positive() && self.balance.is_zero();
        check_invariant(
            &self.id,
            (self.status == InvoiceStatus::Paid) == settled,
            || format!("status {} with balance {}", self.status.label(), self.balance),
        )
    }

    fn record_payment(&mut self, amount: Money) -> CoreResult<()> {
        match self.status {
            InvoiceStatus::Sent | InvoiceStatus::Partial | InvoiceStatus::Overdue => {}
            other => {
                return Err(CoreError::invalid_status(
                    Self::KIND,
                    &self.id,
                    other.label(),
                    "record payment",
                ))
            }
        }
        validate_positive_amount("amount", amount)?;
        if amount > self.balance {
            return Err(CoreError::Overpayment {
                invoice_id: self.id.clone(),
                amount: amount.cents(),
                balance: self.balance.cents(),
            });
        }

        self.paid += amount;
        self.recalculate();
        self.status = if self.balance.is_zero() {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Partial
        };
        Ok(())
    }
}

/// State changes available from the invoice detail overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum InvoiceAction {
    Send,
    RecordPayment { amount: Money },
    MarkOverdue,
    Cancel,
}

impl Record for Invoice {
    const KIND: &'static str = "Invoice";
    type Patch = InvoiceAction;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: InvoiceAction) -> CoreResult<()> {
        match patch {
            InvoiceAction::Send => {
                if self.status != InvoiceStatus::Draft {
                    return Err(CoreError::invalid_status(
                        Self::KIND,
                        &self.id,
                        self.status.label(),
                        "send",
                    ));
                }
                self.status = InvoiceStatus::Sent;
            }
            InvoiceAction::RecordPayment { amount } => self.record_payment(amount)?,
            InvoiceAction::MarkOverdue => {
                let open = matches!(self.status, InvoiceStatus::Sent | InvoiceStatus::Partial);
                if !open || !self.balance.is_positive() {
                    return Err(CoreError::invalid_status(
                        Self::KIND,
                        &self.id,
                        self.status.label(),
                        "mark overdue",
                    ));
                }
                self.status = InvoiceStatus::Overdue;
            }
            InvoiceAction::Cancel => {
                if !self.paid.is_zero() || self.status == InvoiceStatus::Cancelled {
                    return Err(CoreError::invalid_status(
                        Self::KIND,
                        &self.id,
                        self.status.label(),
                        "cancel",
                    ));
                }
                self.status = InvoiceStatus::Cancelled;
            }
        }
        self.check_invariants()
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("invoiceNumber", |i| i.invoice_number.as_str())
            .search_field("orderNumber", |i| i.order_number.as_str())
            .search_field("customerName", |i| i.customer_name.as_str())
            .category("status", |i| i.status.label())
            .sort_key("issueDate", |a, b| a.issue_date.cmp(&b.issue_date))
            .sort_key("dueDate", |a, b| a.due_date.cmp(&b.due_date))
            .sort_key("customer", |a, b| a.customer_name.cmp(&b.customer_name))
            .sort_key("total", |a, b| a.total.cmp(&b.total))
            .sort_key("balance", |a, b| a.balance.cmp(&b.balance))
            .aggregate("totalInvoiced", AggregateScope::All, |rows| {
                AggregateValue::Money(sum_money(rows, |i| i.total))
            })
            .aggregate("totalCollected", AggregateScope::All, |rows| {
                AggregateValue::Money(sum_money(rows, |i| i.paid))
            })
            .aggregate("outstanding", AggregateScope::All, |rows| {
                AggregateValue::Money(sum_money(rows, |i| {
                    if i.status.is_receivable() {
                        i.balance
                    } else {
                        Money::zero()
                    }
                }))
            })
            .aggregate("overdueCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |i| i.status == InvoiceStatus::Overdue))
            })
            .aggregate("filteredTotal", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |i| i.total))
            })
            .aggregate("filteredBalance", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |i| i.balance))
            })
    }
}

// =============================================================================
// Building Invoices
// =============================================================================

/// Input for a new draft invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub id: String,
    pub invoice_number: String,
    pub order_number: String,
    pub customer_name: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub lines: Vec<NewInvoiceLine>,
    pub tax_rate: Rate,
    #[serde(default)]
    pub discount_rate: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoiceLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
}

fn out_of_range(field: &str, min: i64, max: i64) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min,
        max,
    }
    .into()
}

/// Builds a draft invoice, pricing tax and discount off the subtotal.
///
/// ```rust
/// use chrono::NaiveDate;
/// use oakline_core::billing::{build_invoice, NewInvoice, NewInvoiceLine};
/// use oakline_core::money::{Money, Rate};
///
/// let invoice = build_invoice(NewInvoice {
///     id: "INV-010".into(),
///     invoice_number: "INV-2024-010".into(),
///     order_number: "ORD-2024-010".into(),
///     customer_name: "Coastal Living Co".into(),
///     issue_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
///     due_date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
///     lines: vec![NewInvoiceLine {
///         description: "Oak Dining Table".into(),
///         quantity: 2,
///         unit_price: Money::from_major(2_500),
///     }],
///     tax_rate: Rate::from_bps(800),
///     discount_rate: Rate::zero(),
/// })
/// .unwrap();
/// assert_eq!(invoice.total, Money::from_major(5_400));
/// ```
pub fn build_invoice(input: NewInvoice) -> CoreResult<Invoice> {
    let customer_name = validate_name("customerName", &input.customer_name)?;
    let invoice_number = validate_name("invoiceNumber", &input.invoice_number)?;
    validate_date_order("dueDate", input.issue_date, input.due_date)?;
    validate_rate("taxRate", input.tax_rate)?;
    validate_rate("discountRate", input.discount_rate)?;
    if input.lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        }
        .into());
    }

    let mut line_items = Vec::with_capacity(input.lines.len());
    let mut subtotal = Money::zero();
    for line in input.lines {
        let description = validate_name("description", &line.description)?;
        validate_quantity("quantity", line.quantity)?;
        validate_positive_amount("unitPrice", line.unit_price)?;
        let amount = line
            .unit_price
            .checked_multiply_quantity(line.quantity)
            .ok_or_else(|| out_of_range("quantity", 1, i64::MAX / line.unit_price.cents()))?;
        // tax can add up to the whole subtotal again
        subtotal = subtotal
            .checked_add(amount)
            .filter(|s| s.checked_add(*s).is_some())
            .ok_or_else(|| out_of_range("subtotal", 0, i64::MAX / 2))?;
        line_items.push(InvoiceLineItem {
            description,
            quantity: line.quantity,
            unit_price: line.unit_price,
            amount,
        });
    }

    let mut invoice = Invoice {
        id: input.id,
        invoice_number,
        order_number: input.order_number,
        customer_name,
        issue_date: input.issue_date,
        due_date: input.due_date,
        line_items,
        subtotal,
        tax: subtotal.apply_rate(input.tax_rate),
        discount: subtotal.apply_rate(input.discount_rate),
        total: Money::zero(),
        paid: Money::zero(),
        balance: Money::zero(),
        status: InvoiceStatus::Draft,
    };
    invoice.recalculate();
    invoice.check_invariants()?;
    Ok(invoice)
}

// =============================================================================
// Receivables Aging
// =============================================================================

/// How far past due an outstanding balance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum AgingBucket {
    Current,
    Days1To30,
    Days31To60,
    Days61To90,
    Over90,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 5] = [
        AgingBucket::Current,
        AgingBucket::Days1To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    pub fn for_days_overdue(days: i64) -> AgingBucket {
        match days {
            i64::MIN..=0 => AgingBucket::Current,
            1..=30 => AgingBucket::Days1To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgingBucket::Current => "Current",
            AgingBucket::Days1To30 => "1-30",
            AgingBucket::Days31To60 => "31-60",
            AgingBucket::Days61To90 => "61-90",
            AgingBucket::Over90 => "90+",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BucketAmount {
    pub bucket: AgingBucket,
    pub amount: Money,
    pub invoices: u64,
}

fn empty_buckets() -> Vec<BucketAmount> {
    AgingBucket::ALL
        .iter()
        .map(|bucket| BucketAmount {
            bucket: *bucket,
            amount: Money::zero(),
            invoices: 0,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAging {
    pub customer_name: String,
    pub buckets: Vec<BucketAmount>,
    pub total: Money,
}

/// Outstanding receivables by bucket and by customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AgingReport {
    #[ts(as = "String")]
    pub as_of: NaiveDate,
    pub buckets: Vec<BucketAmount>,
    pub customers: Vec<CustomerAging>,
    pub total_outstanding: Money,
}

impl AgingReport {
    pub fn bucket(&self, bucket: AgingBucket) -> Money {
        self.buckets[bucket.index()].amount
    }
}

/// Buckets every receivable invoice balance by days past due.
///
/// Drafts, cancelled and settled invoices are skipped. Customers appear in
/// the order their first outstanding invoice does.
pub fn aging_report(invoices: &[Invoice], as_of: NaiveDate) -> AgingReport {
    let mut buckets = empty_buckets();
    let mut customers: Vec<CustomerAging> = Vec::new();

    for invoice in invoices
        .iter()
        .filter(|i| i.status.is_receivable() && i.balance.is_positive())
    {
        let bucket = AgingBucket::for_days_overdue(invoice.days_overdue(as_of));
        let slot = &mut buckets[bucket.index()];
        slot.amount += invoice.balance;
        slot.invoices += 1;

        let position = customers
            .iter()
            .position(|c| c.customer_name == invoice.customer_name);
        let customer = match position {
            Some(index) => &mut customers[index],
            None => {
                customers.push(CustomerAging {
                    customer_name: invoice.customer_name.clone(),
                    buckets: empty_buckets(),
                    total: Money::zero(),
                });
                let last = customers.len() - 1;
                &mut customers[last]
            }
        };
        customer.buckets[bucket.index()].amount += invoice.balance;
        customer.buckets[bucket.index()].invoices += 1;
        customer.total += invoice.balance;
    }

    let total_outstanding = buckets.iter().map(|b| b.amount).sum();
    AgingReport {
        as_of,
        buckets,
        customers,
        total_outstanding,
    }
}

// =============================================================================
// Customer Statements
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatementLine {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub charge: Money,
    pub payment: Money,
}

/// A periodic customer statement. Read-only once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub id: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    #[ts(as = "String")]
    pub period_end: NaiveDate,
    pub opening_balance: Money,
    pub lines: Vec<StatementLine>,
    pub total_charges: Money,
    pub total_payments: Money,
    pub closing_balance: Money,
}

impl Statement {
    /// `opening + Σ charges - Σ payments`, from the lines.
    pub fn computed_closing_balance(&self) -> Money {
        let charges: Money = self.lines.iter().map(|l| l.charge).sum();
        let payments: Money = self.lines.iter().map(|l| l.payment).sum();
        self.opening_balance + charges - payments
    }

    /// Checks the stated totals and closing balance against the lines.
    pub fn verify(&self) -> CoreResult<()> {
        let charges: Money = self.lines.iter().map(|l| l.charge).sum();
        let payments: Money = self.lines.iter().map(|l| l.payment).sum();
        check_invariant(&self.id, charges == self.total_charges, || {
            format!("total charges {} != lines {}", self.total_charges, charges)
        })?;
        check_invariant(&self.id, payments == self.total_payments, || {
            format!("total payments {} != lines {}", self.total_payments, payments)
        })?;
        let closing = self.computed_closing_balance();
        check_invariant(&self.id, closing == self.closing_balance, || {
            format!("closing balance {} != {}", self.closing_balance, closing)
        })
    }
}

impl Record for Statement {
    const KIND: &'static str = "Statement";
    type Patch = NoPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: NoPatch) -> CoreResult<()> {
        match patch {}
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("id", |s| s.id.as_str())
            .search_field("customerName", |s| s.customer_name.as_str())
            .category("customer", |s| s.customer_name.as_str())
            .sort_key("periodEnd", |a, b| a.period_end.cmp(&b.period_end))
            .sort_key("closingBalance", |a, b| a.closing_balance.cmp(&b.closing_balance))
            .aggregate("totalCharges", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |s| s.total_charges))
            })
            .aggregate("totalPayments", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |s| s.total_payments))
            })
            .aggregate("closingBalances", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |s| s.closing_balance))
            })
    }
}

// =============================================================================
// Payment Transactions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Failed => "Failed",
            TransactionStatus::Refunded => "Refunded",
        }
    }
}

/// A gateway payment against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransaction {
    pub id: String,
    pub invoice_id: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub amount: Money,
    pub fee: Money,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    pub reference: String,
}

impl PaymentTransaction {
    /// Amount received after the gateway fee.
    pub fn net_amount(&self) -> Money {
        self.amount - self.fee
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum TransactionAction {
    Complete,
    Fail,
    Refund,
}

impl Record for PaymentTransaction {
    const KIND: &'static str = "PaymentTransaction";
    type Patch = TransactionAction;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: TransactionAction) -> CoreResult<()> {
        let (required, next, operation) = match patch {
            TransactionAction::Complete => {
                (TransactionStatus::Pending, TransactionStatus::Completed, "complete")
            }
            TransactionAction::Fail => (TransactionStatus::Pending, TransactionStatus::Failed, "fail"),
            TransactionAction::Refund => {
                (TransactionStatus::Completed, TransactionStatus::Refunded, "refund")
            }
        };
        if self.status != required {
            return Err(CoreError::invalid_status(
                Self::KIND,
                &self.id,
                self.status.label(),
                operation,
            ));
        }
        self.status = next;
        Ok(())
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("id", |t| t.id.as_str())
            .search_field("invoiceId", |t| t.invoice_id.as_str())
            .search_field("customerName", |t| t.customer_name.as_str())
            .search_field("reference", |t| t.reference.as_str())
            .category("status", |t| t.status.label())
            .category("method", |t| t.method.label())
            .sort_key("date", |a, b| a.date.cmp(&b.date))
            .sort_key("amount", |a, b| a.amount.cmp(&b.amount))
            .aggregate("totalVolume", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |t| {
                    if t.status == TransactionStatus::Completed {
                        t.amount
                    } else {
                        Money::zero()
                    }
                }))
            })
            .aggregate("totalFees", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |t| {
                    if t.status == TransactionStatus::Completed {
                        t.fee
                    } else {
                        Money::zero()
                    }
                }))
            })
            .aggregate("netReceived", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |t| {
                    if t.status == TransactionStatus::Completed {
                        t.net_amount()
                    } else {
                        Money::zero()
                    }
                }))
            })
            .aggregate("successRate", AggregateScope::Filtered, |rows| {
                let completed = count_where(rows, |t| t.status == TransactionStatus::Completed);
                AggregateValue::Rate(
                    Rate::ratio_of(completed as i64, rows.len() as i64).unwrap_or_default(),
                )
            })
            .aggregate("pendingCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |t| t.status == TransactionStatus::Pending))
            })
            .aggregate("feeRate", AggregateScope::Filtered, |rows| {
                AggregateValue::Rate(rate_or_zero(
                    sum_money(rows, |t| t.fee),
                    sum_money(rows, |t| t.amount),
                ))
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

    fn invoice(id: &str) -> Invoice {
        fixtures::invoices().into_iter().find(|i| i.id == id).unwrap()
    }

    #[test]
    fn test_fixture_invoices_hold_invariants() {
        for invoice in fixtures::invoices() {
            invoice.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_elite_partial_filter() {
        let invoices = fixtures::invoices();
        let query =
            ListQuery::search("Elite").with_category("status", CategorySelection::only("Partial"));
        let hits = Invoice::list_spec().apply_filters(&invoices, &query);
        let ids: Vec<&str> = hits.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["INV-002"]);

        // search alone also finds the draft for Elite Office Solutions
        let hits = Invoice::list_spec().apply_filters(&invoices, &ListQuery::search("elite"));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_status_filter_is_exact() {
        let invoices = fixtures::invoices();
        let query = ListQuery::default().with_category("status", CategorySelection::only("partial"));
        assert!(Invoice::list_spec().apply_filters(&invoices, &query).is_empty());

        // the sentinel alone folds case
        let query = ListQuery::default().with_category("status", CategorySelection::only("all"));
        assert_eq!(
            Invoice::list_spec().apply_filters(&invoices, &query).len(),
            invoices.len()
        );
    }

    #[test]
    fn test_partial_payment_then_settle() {
        let mut inv = invoice("INV-001");
        inv.apply_patch(InvoiceAction::RecordPayment {
            amount: Money::from_major(5_000),
        })
        .unwrap();
        assert_eq!(inv.status, InvoiceStatus::Partial);
        assert_eq!(inv.balance, Money::from_major(8_500));
        assert_eq!(inv.balance, inv.total - inv.paid);

        inv.apply_patch(InvoiceAction::RecordPayment {
            amount: Money::from_major(8_500),
        })
        .unwrap();
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert!(inv.balance.is_zero());
    }

    #[test]
    fn test_overpayment_rejected() {
        let mut inv = invoice("INV-002");
        let before = inv.clone();
        let err = inv
            .apply_patch(InvoiceAction::RecordPayment {
                amount: Money::from_major(20_000),
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Overpayment { .. }));
        assert_eq!(inv, before);
    }

    #[test]
    fn test_status_guards() {
        let mut draft = invoice("INV-005");
        assert!(draft
            .clone()
            .apply_patch(InvoiceAction::RecordPayment {
                amount: Money::from_major(1)
            })
            .is_err());
        draft.apply_patch(InvoiceAction::Send).unwrap();
        assert_eq!(draft.status, InvoiceStatus::Sent);
        assert!(draft.apply_patch(InvoiceAction::Send).is_err());

        let mut partial = invoice("INV-002");
        assert!(partial.apply_patch(InvoiceAction::Cancel).is_err());
        partial.apply_patch(InvoiceAction::MarkOverdue).unwrap();
        assert_eq!(partial.status, InvoiceStatus::Overdue);

        let mut paid = invoice("INV-003");
        assert!(paid.apply_patch(InvoiceAction::MarkOverdue).is_err());
    }

    #[test]
    fn test_build_invoice_prices_tax_and_discount() {
        let built = build_invoice(NewInvoice {
            id: "INV-020".to_string(),
            invoice_number: "INV-2024-020".to_string(),
            order_number: "ORD-2024-020".to_string(),
            customer_name: "Urban Loft Designs".to_string(),
            issue_date: date(2024, 2, 1),
            due_date: date(2024, 3, 2),
            lines: vec![NewInvoiceLine {
                description: "King Bed Frame".to_string(),
                quantity: 8,
                unit_price: Money::from_major(1_900),
            }],
            tax_rate: Rate::from_bps(800),
            discount_rate: Rate::from_bps(500),
        })
        .unwrap();
        assert_eq!(built.subtotal, Money::from_major(15_200));
        assert_eq!(built.tax, Money::from_major(1_216));
        assert_eq!(built.discount, Money::from_major(760));
        assert_eq!(built.total, Money::from_major(15_656));
        assert_eq!(built.status, InvoiceStatus::Draft);
    }

    #[test]
    fn test_build_invoice_rejects_bad_input() {
        let base = NewInvoice {
            id: "INV-021".to_string(),
            invoice_number: "INV-2024-021".to_string(),
            order_number: "ORD-2024-021".to_string(),
            customer_name: "Coastal Living Co".to_string(),
            issue_date: date(2024, 2, 1),
            due_date: date(2024, 1, 1),
            lines: vec![],
            tax_rate: Rate::from_bps(800),
            discount_rate: Rate::zero(),
        };
        assert!(build_invoice(base.clone()).is_err());
        let no_lines = NewInvoice {
            due_date: date(2024, 3, 1),
            ..base
        };
        assert!(build_invoice(no_lines).is_err());
    }

    #[test]
    fn test_build_invoice_rejects_overflowing_lines() {
        let line = |quantity| NewInvoiceLine {
            description: "Oak Dining Table".to_string(),
            quantity,
            unit_price: Money::from_major(2_500),
        };
        let input = |lines| NewInvoice {
            id: "INV-022".to_string(),
            invoice_number: "INV-2024-022".to_string(),
            order_number: "ORD-2024-022".to_string(),
            customer_name: "Coastal Living Co".to_string(),
            issue_date: date(2024, 2, 1),
            due_date: date(2024, 3, 2),
            lines,
            tax_rate: Rate::from_bps(800),
            discount_rate: Rate::zero(),
        };

        let err = build_invoice(input(vec![line(i64::MAX)])).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "quantity"
        ));

        // each line fits, their sum does not
        let big = i64::MAX / Money::from_major(2_500).cents();
        let err = build_invoice(input(vec![line(big), line(big)])).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "subtotal"
        ));
    }

    #[test]
    fn test_aging_buckets() {
        assert_eq!(AgingBucket::for_days_overdue(-5), AgingBucket::Current);
        assert_eq!(AgingBucket::for_days_overdue(0), AgingBucket::Current);
        assert_eq!(AgingBucket::for_days_overdue(30), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::for_days_overdue(31), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_days_overdue(90), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::for_days_overdue(91), AgingBucket::Over90);
    }

    #[test]
    fn test_aging_report() {
        let report = aging_report(&fixtures::invoices(), date(2024, 2, 1));
        assert_eq!(report.bucket(AgingBucket::Current), Money::from_major(27_340));
        assert_eq!(report.bucket(AgingBucket::Days31To60), Money::from_major(15_656));
        assert_eq!(report.total_outstanding, Money::from_major(42_996));
        let per_customer: Money = report.customers.iter().map(|c| c.total).sum();
        assert_eq!(per_customer, report.total_outstanding);
        assert!(report
            .customers
            .iter()
            .all(|c| c.customer_name != "Elite Office Solutions"));
    }

    #[test]
    fn test_fixture_statements_verify() {
        for statement in fixtures::statements() {
            statement.verify().unwrap();
        }
    }

    #[test]
    fn test_transaction_refund_only_when_completed() {
        let mut txns = fixtures::payment_transactions();
        let completed = txns
            .iter_mut()
            .find(|t| t.status == TransactionStatus::Completed)
            .unwrap();
        completed.apply_patch(TransactionAction::Refund).unwrap();
        assert_eq!(completed.status, TransactionStatus::Refunded);
        assert!(completed.apply_patch(TransactionAction::Refund).is_err());
    }

    #[test]
    fn test_transaction_aggregates_on_empty_filter() {
        let txns = fixtures::payment_transactions();
        let page = PaymentTransaction::list_spec().view(&txns, &ListQuery::search("no-such-ref"));
        assert_eq!(page.aggregate("successRate"), Some(AggregateValue::Rate(Rate::zero())));
        assert_eq!(page.aggregate("feeRate"), Some(AggregateValue::Rate(Rate::zero())));
    }
}
