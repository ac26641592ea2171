//! # Order Management
//!
//! Sales orders and their fulfilment lifecycle.
//!
//! ```text
//!   Pending ──► Processing ──► Shipped ──► Delivered
//!      │            │
//!      └──cancel────┴──► Cancelled   (payments become Refunded)
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::list::{average_money, count_where, sum_money, AggregateScope, AggregateValue, ListSpec};
use crate::money::Money;
use crate::record::Record;
use crate::validation::check_invariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// The next fulfilment step, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentState {
    Unpaid,
    Partial,
    Paid,
    Refunded,
}

impl PaymentState {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentState::Unpaid => "Unpaid",
            PaymentState::Partial => "Partial",
            PaymentState::Paid => "Paid",
            PaymentState::Refunded => "Refunded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub sku: String,
    pub product_name: String,
    pub category: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
}

impl OrderLine {
    pub fn new(
        sku: impl Into<String>,
        product_name: impl Into<String>,
        category: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        OrderLine {
            sku: sku.into(),
            product_name: product_name.into(),
            category: category.into(),
            quantity,
            unit_price,
            amount: unit_price.multiply_quantity(quantity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub payment_state: PaymentState,
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

impl SalesOrder {
    pub fn computed_total(&self) -> Money {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Whether this order counts toward revenue.
    pub fn is_revenue(&self) -> bool {
        self.status != OrderStatus::Cancelled
    }

    pub fn units(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn check_invariants(&self) -> CoreResult<()> {
        for line in &self.lines {
            check_invariant(
                &self.id,
                line.amount == line.unit_price.multiply_quantity(line.quantity),
                || format!("line {} amount != quantity × unit price", line.sku),
            )?;
        }
        let computed = self.computed_total();
        check_invariant(&self.id, computed == self.total, || {
            format!("total {} != lines {}", self.total, computed)
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OrderAction {
    Advance,
    Cancel,
    SetPaymentState { state: PaymentState },
}

impl Record for SalesOrder {
    const KIND: &'static str = "SalesOrder";
    type Patch = OrderAction;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: OrderAction) -> CoreResult<()> {
        match patch {
            OrderAction::Advance => {
                let next = self.status.next().ok_or_else(|| {
                    CoreError::invalid_status(Self::KIND, &self.id, self.status.label(), "advance")
                })?;
                self.status = next;
            }
            OrderAction::Cancel => {
                if !self.status.can_cancel() {
                    return Err(CoreError::invalid_status(
                        Self::KIND,
                        &self.id,
                        self.status.label(),
                        "cancel",
                    ));
                }
                self.status = OrderStatus::Cancelled;
                if matches!(self.payment_state, PaymentState::Paid | PaymentState::Partial) {
                    self.payment_state = PaymentState::Refunded;
                }
            }
            OrderAction::SetPaymentState { state } => {
                if self.status == OrderStatus::Cancelled && state != PaymentState::Refunded {
                    return Err(CoreError::invalid_status(
                        Self::KIND,
                        &self.id,
                        self.status.label(),
                        "take payment",
                    ));
                }
                self.payment_state = state;
            }
        }
        self.check_invariants()
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("orderNumber", |o| o.order_number.as_str())
            .search_field("customerName", |o| o.customer_name.as_str())
            .category("status", |o| o.status.label())
            .category("payment", |o| o.payment_state.label())
            .sort_key("orderDate", |a, b| a.order_date.cmp(&b.order_date))
            .sort_key("customer", |a, b| a.customer_name.cmp(&b.customer_name))
            .sort_key("total", |a, b| a.total.cmp(&b.total))
            .aggregate("totalRevenue", AggregateScope::All, |rows| {
                AggregateValue::Money(sum_money(rows, |o| {
                    if o.is_revenue() {
                        o.total
                    } else {
                        Money::zero()
                    }
                }))
            })
            .aggregate("averageOrderValue", AggregateScope::All, |rows| {
                let revenue: Vec<&SalesOrder> = rows.iter().copied().filter(|o| o.is_revenue()).collect();
                AggregateValue::Money(average_money(&revenue, |o| o.total))
            })
            .aggregate("pendingCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |o| o.status == OrderStatus::Pending))
            })
            .aggregate("processingCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |o| o.status == OrderStatus::Processing))
            })
            .aggregate("shippedCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |o| o.status == OrderStatus::Shipped))
            })
            .aggregate("deliveredCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |o| o.status == OrderStatus::Delivered))
            })
            .aggregate("filteredTotal", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |o| o.total))
            })
    }
}
