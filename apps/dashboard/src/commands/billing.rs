//! # Billing Commands
//!
//! Invoices, the payment detail overlay, receivables aging, payment
//! transactions and customer statements.
//!
//! ## Record Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_payment("INV-002", $3,840.00)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.invoices.update(id, InvoiceAction::RecordPayment { amount })    │
//! │       │                                                                 │
//! │       ├── Draft / Cancelled / Paid? ──► BUSINESS_LOGIC                 │
//! │       ├── amount > balance?         ──► PAYMENT_ERROR                  │
//! │       ▼                                                                 │
//! │  paid += amount, balance = total - paid, status → Partial | Paid       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use oakline_core::billing::{
    aging_report, build_invoice, AgingReport, Invoice, InvoiceAction, NewInvoice, NewInvoiceLine,
    PaymentTransaction, Statement,
};
use oakline_core::{ListQuery, Money, Rate, Record};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{screen, ScreenDto};
use crate::error::ApiError;
use crate::state::{DashboardConfig, SelectionState, StoreState};

/// The invoice detail overlay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetailDto {
    pub invoice: Invoice,
    pub days_overdue: i64,
    /// Gateway transactions recorded against this invoice.
    pub transactions: Vec<PaymentTransaction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRowDto {
    #[serde(flatten)]
    pub transaction: PaymentTransaction,
    pub net_amount: Money,
}

impl From<PaymentTransaction> for TransactionRowDto {
    fn from(transaction: PaymentTransaction) -> Self {
        TransactionRowDto {
            net_amount: transaction.net_amount(),
            transaction,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRowDto {
    #[serde(flatten)]
    pub statement: Statement,
    pub computed_closing_balance: Money,
    /// Whether the stated totals agree with the lines.
    pub verified: bool,
}

impl From<Statement> for StatementRowDto {
    fn from(statement: Statement) -> Self {
        StatementRowDto {
            computed_closing_balance: statement.computed_closing_balance(),
            verified: statement.verify().is_ok(),
            statement,
        }
    }
}

/// A new draft invoice. `taxRate` falls back to the configured default.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceInput {
    pub id: String,
    pub invoice_number: String,
    pub order_number: String,
    pub customer_name: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub lines: Vec<NewInvoiceLine>,
    #[serde(default)]
    pub tax_rate: Option<Rate>,
    #[serde(default)]
    pub discount_rate: Rate,
}

pub async fn list_invoices(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<ScreenDto<Invoice>, ApiError> {
    debug!(?query, "list_invoices command");
    let invoices = store.invoices.all().await?;
    screen(invoices, query, config)
}

/// Opens the detail overlay on one invoice.
pub async fn open_invoice(
    store: &StoreState,
    selections: &SelectionState,
    config: &DashboardConfig,
    id: &str,
) -> Result<InvoiceDetailDto, ApiError> {
    debug!(id = %id, "open_invoice command");

    selections.select(Invoice::KIND, id);
    let invoices = store.invoices.all().await?;
    let invoice = match selections.get(Invoice::KIND).resolve(&invoices) {
        Ok(Some(invoice)) => invoice.clone(),
        Ok(None) => return Err(ApiError::not_found(Invoice::KIND, id)),
        Err(e) => {
            selections.clear(Invoice::KIND);
            return Err(e.into());
        }
    };

    let transactions = store
        .payments
        .all()
        .await?
        .into_iter()
        .filter(|t| t.invoice_id == invoice.id)
        .collect();

    Ok(InvoiceDetailDto {
        days_overdue: invoice.days_overdue(config.as_of),
        invoice,
        transactions,
    })
}

pub fn close_invoice(selections: &SelectionState) {
    selections.clear(Invoice::KIND);
}

pub async fn record_payment(store: &StoreState, id: &str, amount: Money) -> Result<Invoice, ApiError> {
    debug!(id = %id, amount = %amount, "record_payment command");

    let invoice = store
        .invoices
        .update(id, InvoiceAction::RecordPayment { amount })
        .await?;

    info!(
        id = %invoice.id,
        balance = %invoice.balance,
        status = invoice.status.label(),
        "Payment recorded"
    );
    Ok(invoice)
}

pub async fn create_invoice(
    store: &StoreState,
    config: &DashboardConfig,
    input: CreateInvoiceInput,
) -> Result<Invoice, ApiError> {
    debug!(id = %input.id, "create_invoice command");

    let invoice = build_invoice(NewInvoice {
        id: input.id,
        invoice_number: input.invoice_number,
        order_number: input.order_number,
        customer_name: input.customer_name,
        issue_date: input.issue_date,
        due_date: input.due_date,
        lines: input.lines,
        tax_rate: input.tax_rate.unwrap_or(config.default_tax_rate),
        discount_rate: input.discount_rate,
    })?;

    let invoice = store.invoices.insert(invoice).await?;
    info!(id = %invoice.id, total = %invoice.total, "Invoice created");
    Ok(invoice)
}

pub async fn receivables_aging(
    store: &StoreState,
    config: &DashboardConfig,
) -> Result<AgingReport, ApiError> {
    debug!(as_of = %config.as_of, "receivables_aging command");
    let invoices = store.invoices.all().await?;
    Ok(aging_report(&invoices, config.as_of))
}

pub async fn list_payments(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<ScreenDto<TransactionRowDto>, ApiError> {
    debug!(?query, "list_payments command");
    let transactions = store.payments.all().await?;
    screen(transactions, query, config)
}

pub async fn list_statements(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<ScreenDto<StatementRowDto>, ApiError> {
    debug!(?query, "list_statements command");
    let statements = store.statements.all().await?;
    screen(statements, query, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use oakline_core::billing::{AgingBucket, InvoiceStatus};
    use oakline_core::list::CategorySelection;

    #[tokio::test]
    async fn test_elite_partial_screen() {
        let store = StoreState::in_memory();
        let config = DashboardConfig::default();
        let query = ListQuery::search("Elite").with_category("status", CategorySelection::only("Partial"));

        let dto = list_invoices(&store, &config, &query).await.unwrap();
        let ids: Vec<&str> = dto.rows.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["INV-002"]);

        let status = dto.filters.iter().find(|f| f.name == "status").unwrap();
        assert_eq!(status.options[0], "All");
    }

    #[tokio::test]
    async fn test_unknown_sort_key_is_rejected() {
        let store = StoreState::in_memory();
        let config = DashboardConfig::default();
        let query = ListQuery::default().sorted_by("colour", Default::default());
        let err = list_invoices(&store, &config, &query).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_payment_then_overpayment() {
        let store = StoreState::in_memory();

        let invoice = record_payment(&store, "INV-002", Money::from_major(3_840))
            .await
            .unwrap();
        assert_eq!(invoice.balance, invoice.total - invoice.paid);

        let err = record_payment(&store, "INV-002", Money::from_major(10_001))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);

        let err = record_payment(&store, "INV-404", Money::from_major(1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_open_and_close_overlay() {
        let store = StoreState::in_memory();
        let selections = SelectionState::new();
        let config = DashboardConfig::default();

        let detail = open_invoice(&store, &selections, &config, "INV-002").await.unwrap();
        assert_eq!(detail.invoice.status, InvoiceStatus::Partial);
        assert!(detail.transactions.iter().all(|t| t.invoice_id == "INV-002"));
        assert!(selections.get(Invoice::KIND).is_open());

        close_invoice(&selections);
        assert!(!selections.get(Invoice::KIND).is_open());

        let err = open_invoice(&store, &selections, &config, "INV-404").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(!selections.get(Invoice::KIND).is_open());
    }

    #[tokio::test]
    async fn test_aging_uses_configured_date() {
        let store = StoreState::in_memory();
        let config = DashboardConfig::default();
        let report = receivables_aging(&store, &config).await.unwrap();
        assert_eq!(report.as_of, config.as_of);
        assert_eq!(report.bucket(AgingBucket::Current), Money::from_major(27_340));
        assert_eq!(report.total_outstanding, Money::from_major(42_996));
    }

    #[tokio::test]
    async fn test_create_invoice_uses_default_tax_rate() {
        let store = StoreState::in_memory();
        let config = DashboardConfig::default();
        let input: CreateInvoiceInput = serde_json::from_value(serde_json::json!({
            "id": "INV-006",
            "invoiceNumber": "INV-2024-006",
            "orderNumber": "ORD-2024-009",
            "customerName": "Harbor View Hotels",
            "issueDate": "2024-02-01",
            "dueDate": "2024-03-02",
            "lines": [{ "description": "Oak Nightstand", "quantity": 4, "unitPrice": 50000 }]
        }))
        .unwrap();

        let invoice = create_invoice(&store, &config, input).await.unwrap();
        assert_eq!(invoice.subtotal, Money::from_major(2_000));
        assert_eq!(invoice.tax, Money::from_major(165));
        assert_eq!(store.invoices.get("INV-006").await.unwrap(), invoice);
    }

    #[tokio::test]
    async fn test_statement_rows_verify() {
        let store = StoreState::in_memory();
        let dto = list_statements(&store, &DashboardConfig::default(), &ListQuery::default())
            .await
            .unwrap();
        assert!(!dto.rows.is_empty());
        assert!(dto.rows.iter().all(|s| s.verified));
    }
}
