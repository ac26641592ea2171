//! # Inventory Tracking
//!
//! Stock levels, reservations, the movement log and derived alerts.
//!
//! ## Stock Arithmetic
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  movements: +60 receipt, -15 sale      ──Σ──►  current   = 45           │
//! │                                                reserved  =  8           │
//! │                                                available = 37           │
//! │                                                                         │
//! │  alerts (re-derived after every action):                               │
//! │  ├── OutOfStock  ⇔ current == 0                                        │
//! │  ├── LowStock    ⇔ 0 < available <= reorder point                      │
//! │  └── Overstock   ⇔ current > max stock                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::list::{count_where, sum_money, sum_quantity, AggregateScope, AggregateValue, ListSpec};
use crate::money::Money;
use crate::record::Record;
use crate::validation::{check_invariant, validate_quantity};

// =============================================================================
// Movements
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum MovementKind {
    Receipt,
    Sale,
    Adjustment,
    Transfer,
    Return,
}

impl MovementKind {
    pub fn label(&self) -> &'static str {
        match self {
            MovementKind::Receipt => "Receipt",
            MovementKind::Sale => "Sale",
            MovementKind::Adjustment => "Adjustment",
            MovementKind::Transfer => "Transfer",
            MovementKind::Return => "Return",
        }
    }

    /// Whether a signed quantity fits this kind. Receipts and returns add
    /// stock, sales remove it, adjustments and transfers go either way.
    fn accepts(&self, quantity: i64) -> bool {
        match self {
            MovementKind::Receipt | MovementKind::Return => quantity > 0,
            MovementKind::Sale => quantity < 0,
            MovementKind::Adjustment | MovementKind::Transfer => quantity != 0,
        }
    }
}

/// One entry of an item's append-only movement log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub kind: MovementKind,
    /// Signed change in on-hand units.
    pub quantity: i64,
    pub reference: String,
}

// =============================================================================
// Alerts
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AlertKind {
    OutOfStock,
    LowStock,
    Overstock,
}

impl AlertKind {
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::OutOfStock => "Out of Stock",
            AlertKind::LowStock => "Low Stock",
            AlertKind::Overstock => "Overstock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub kind: AlertKind,
    pub message: String,
}

/// Computes the alerts an item's current levels warrant.
pub fn derive_alerts(item: &InventoryItem) -> Vec<StockAlert> {
    let mut alerts = Vec::new();
    if item.current_stock == 0 {
        alerts.push(StockAlert {
            kind: AlertKind::OutOfStock,
            message: format!("{} is out of stock", item.name),
        });
    }
    if item.available_stock > 0 && item.available_stock <= item.reorder_point {
        alerts.push(StockAlert {
            kind: AlertKind::LowStock,
            message: format!(
                "{} available, at or below reorder point {}",
                item.available_stock, item.reorder_point
            ),
        });
    }
    if item.current_stock > item.max_stock {
        alerts.push(StockAlert {
            kind: AlertKind::Overstock,
            message: format!(
                "{} on hand exceeds maximum {}",
                item.current_stock, item.max_stock
            ),
        });
    }
    alerts
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A stocked product at one warehouse location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub location: String,
    pub current_stock: i64,
    pub reserved_stock: i64,
    pub available_stock: i64,
    pub reorder_point: i64,
    pub reorder_quantity: i64,
    pub max_stock: i64,
    pub unit_cost: Money,
    pub average_daily_usage: f64,
    pub movements: Vec<StockMovement>,
    pub alerts: Vec<StockAlert>,
}

impl InventoryItem {
    /// Days the available stock lasts at the average usage rate.
    ///
    /// `None` when nothing is being used.
    pub fn days_of_stock(&self) -> Option<f64> {
        if self.average_daily_usage <= 0.0 {
            return None;
        }
        Some(self.available_stock as f64 / self.average_daily_usage)
    }

    /// On-hand value at cost.
    pub fn stock_value(&self) -> Money {
        self.unit_cost.multiply_quantity(self.current_stock)
    }

    /// On-hand units implied by the movement log.
    pub fn stock_from_movements(&self) -> i64 {
        self.movements.iter().map(|m| m.quantity).sum()
    }

    pub fn has_alert(&self, kind: AlertKind) -> bool {
        self.alerts.iter().any(|a| a.kind == kind)
    }

    /// Single status label for the table's status column and filter.
    pub fn status_label(&self) -> &'static str {
        if self.has_alert(AlertKind::OutOfStock) {
            AlertKind::OutOfStock.label()
        } else if self.has_alert(AlertKind::LowStock) {
            AlertKind::LowStock.label()
        } else if self.has_alert(AlertKind::Overstock) {
            AlertKind::Overstock.label()
        } else {
            "In Stock"
        }
    }

    /// Re-derives available stock and alerts.
    pub fn refresh(&mut self) {
        self.available_stock = self.current_stock - self.reserved_stock;
        self.alerts = derive_alerts(self);
    }

    pub fn check_invariants(&self) -> CoreResult<()> {
        check_invariant(
            &self.id,
            self.available_stock == self.current_stock - self.reserved_stock,
            || {
                format!(
                    "available {} != current {} - reserved {}",
                    self.available_stock, self.current_stock, self.reserved_stock
                )
            },
        )?;
        check_invariant(
            &self.id,
            (0..=self.current_stock).contains(&self.reserved_stock),
            || format!("reserved {} outside 0..={}", self.reserved_stock, self.current_stock),
        )?;
        let logged = self.stock_from_movements();
        check_invariant(&self.id, logged == self.current_stock, || {
            format!("movement log sums to {}, current is {}", logged, self.current_stock)
        })?;
        check_invariant(&self.id, self.alerts == derive_alerts(self), || {
            "alerts are stale".to_string()
        })
    }

    fn record_movement(
        &mut self,
        kind: MovementKind,
        quantity: i64,
        reference: String,
        date: NaiveDate,
    ) -> CoreResult<()> {
        if !kind.accepts(quantity) {
            return Err(ValidationError::InvalidFormat {
                field: "quantity".to_string(),
                reason: format!("{} has the wrong sign for a {} movement", quantity, kind.label()),
            }
            .into());
        }
        // on-hand value must stay representable
        let max_units = match self.unit_cost.cents() {
            cents if cents > 0 => i64::MAX / cents,
            _ => i64::MAX,
        };
        let next = self
            .current_stock
            .checked_add(quantity)
            .filter(|next| *next <= max_units)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: -self.current_stock,
                max: max_units - self.current_stock,
            })?;
        if next < self.reserved_stock {
            return Err(CoreError::InsufficientStock {
                sku: self.sku.clone(),
                available: self.available_stock,
                requested: quantity.saturating_neg(),
            });
        }

        self.movements.push(StockMovement {
            id: format!("{}-M{:03}", self.id, self.movements.len() + 1),
            date,
            kind,
            quantity,
            reference,
        });
        self.current_stock = next;
        Ok(())
    }

    fn reserve(&mut self, quantity: i64) -> CoreResult<()> {
        validate_quantity("quantity", quantity)?;
        if quantity > self.available_stock {
            return Err(CoreError::InsufficientStock {
                sku: self.sku.clone(),
                available: self.available_stock,
                requested: quantity,
            });
        }
        self.reserved_stock += quantity;
        Ok(())
    }

    fn release(&mut self, quantity: i64) -> CoreResult<()> {
        validate_quantity("quantity", quantity)?;
        if quantity > self.reserved_stock {
            return Err(CoreError::InsufficientStock {
                sku: self.sku.clone(),
                available: self.reserved_stock,
                requested: quantity,
            });
        }
        self.reserved_stock -= quantity;
        Ok(())
    }

    fn set_reorder_point(&mut self, reorder_point: i64, reorder_quantity: i64) -> CoreResult<()> {
        if !(0..=self.max_stock).contains(&reorder_point) {
            return Err(ValidationError::OutOfRange {
                field: "reorderPoint".to_string(),
                min: 0,
                max: self.max_stock,
            }
            .into());
        }
        validate_quantity("reorderQuantity", reorder_quantity)?;
        self.reorder_point = reorder_point;
        self.reorder_quantity = reorder_quantity;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum InventoryAction {
    #[serde(rename_all = "camelCase")]
    RecordMovement {
        kind: MovementKind,
        quantity: i64,
        reference: String,
        date: NaiveDate,
    },
    Reserve {
        quantity: i64,
    },
    Release {
        quantity: i64,
    },
    #[serde(rename_all = "camelCase")]
    SetReorderPoint {
        reorder_point: i64,
        reorder_quantity: i64,
    },
}

impl Record for InventoryItem {
    const KIND: &'static str = "InventoryItem";
    type Patch = InventoryAction;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: InventoryAction) -> CoreResult<()> {
        match patch {
            InventoryAction::RecordMovement {
                kind,
                quantity,
                reference,
                date,
            } => self.record_movement(kind, quantity, reference, date)?,
            InventoryAction::Reserve { quantity } => self.reserve(quantity)?,
            InventoryAction::Release { quantity } => self.release(quantity)?,
            InventoryAction::SetReorderPoint {
                reorder_point,
                reorder_quantity,
            } => self.set_reorder_point(reorder_point, reorder_quantity)?,
        }
        self.refresh();
        self.check_invariants()
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("sku", |i| i.sku.as_str())
            .search_field("name", |i| i.name.as_str())
            .search_field("location", |i| i.location.as_str())
            .category("category", |i| i.category.as_str())
            .category("location", |i| i.location.as_str())
            .category("status", |i| i.status_label())
            .sort_key("name", |a, b| a.name.cmp(&b.name))
            .sort_key("available", |a, b| a.available_stock.cmp(&b.available_stock))
            .sort_key("value", |a, b| a.stock_value().cmp(&b.stock_value()))
            .aggregate("totalValue", AggregateScope::All, |rows| {
                AggregateValue::Money(sum_money(rows, |i| i.stock_value()))
            })
            .aggregate("lowStockCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |i| i.has_alert(AlertKind::LowStock)))
            })
            .aggregate("outOfStockCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |i| i.has_alert(AlertKind::OutOfStock)))
            })
            .aggregate("overstockCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |i| i.has_alert(AlertKind::Overstock)))
            })
            .aggregate("filteredUnits", AggregateScope::Filtered, |rows| {
                AggregateValue::Quantity(sum_quantity(rows, |i| i.current_stock))
            })
            .aggregate("filteredValue", AggregateScope::Filtered, |rows| {
                AggregateValue::Money(sum_money(rows, |i| i.stock_value()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn item(id: &str) -> InventoryItem {
        fixtures::inventory_items().into_iter().find(|i| i.id == id).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixture_alerts_match_rules() {
        for item in fixtures::inventory_items() {
            assert_eq!(item.alerts, derive_alerts(&item), "{}", item.id);
            assert_eq!(
                item.has_alert(AlertKind::OutOfStock),
                item.current_stock == 0,
                "{}",
                item.id
            );
        }
        assert!(item("INV-002").has_alert(AlertKind::LowStock));
        assert!(item("INV-003").has_alert(AlertKind::Overstock));
    }

    #[test]
    fn test_days_of_stock() {
        let table = item("INV-001");
        let days = table.days_of_stock().unwrap();
        assert!((days - 37.0 / 1.5).abs() < 1e-9);

        let mut idle = table.clone();
        idle.average_daily_usage = 0.0;
        assert_eq!(idle.days_of_stock(), None);
    }

    #[test]
    fn test_receipt_clears_out_of_stock() {
        let mut bed = item("INV-004");
        bed.apply_patch(InventoryAction::RecordMovement {
            kind: MovementKind::Receipt,
            quantity: 12,
            reference: "PO-2024-031".to_string(),
            date: date(2024, 2, 2),
        })
        .unwrap();
        assert_eq!(bed.current_stock, 12);
        assert_eq!(bed.available_stock, 12);
        assert!(!bed.has_alert(AlertKind::OutOfStock));
        assert_eq!(bed.stock_from_movements(), 12);
        assert_eq!(bed.movements.last().map(|m| m.id.as_str()), Some("INV-004-M003"));
    }

    #[test]
    fn test_sale_cannot_eat_reserved_stock() {
        let mut sofa = item("INV-002");
        let err = sofa
            .apply_patch(InventoryAction::RecordMovement {
                kind: MovementKind::Sale,
                quantity: -9,
                reference: "ORD-2024-009".to_string(),
                date: date(2024, 2, 2),
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(sofa.current_stock, 12);

        // wrong sign for the kind
        assert!(sofa
            .apply_patch(InventoryAction::RecordMovement {
                kind: MovementKind::Sale,
                quantity: 2,
                reference: "X".to_string(),
                date: date(2024, 2, 2),
            })
            .is_err());
    }

    #[test]
    fn test_huge_movement_is_rejected_not_overflowed() {
        let mut table = item("INV-001");
        let receipt = |quantity| InventoryAction::RecordMovement {
            kind: MovementKind::Receipt,
            quantity,
            reference: "PO-2024-099".to_string(),
            date: date(2024, 2, 2),
        };

        let err = table.apply_patch(receipt(i64::MAX)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "quantity"
        ));
        assert_eq!((table.current_stock, table.available_stock), (45, 37));
        assert_eq!(table.stock_from_movements(), 45);

        let err = table
            .apply_patch(InventoryAction::RecordMovement {
                kind: MovementKind::Sale,
                quantity: i64::MIN,
                reference: "ORD-2024-099".to_string(),
                date: date(2024, 2, 2),
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(table.current_stock, 45);
    }

    #[test]
    fn test_reserve_and_release() {
        let mut table = item("INV-001");
        table.apply_patch(InventoryAction::Reserve { quantity: 30 }).unwrap();
        assert_eq!(table.available_stock, 7);
        assert!(table.has_alert(AlertKind::LowStock));
        assert!(table.apply_patch(InventoryAction::Reserve { quantity: 8 }).is_err());

        table.apply_patch(InventoryAction::Release { quantity: 38 }).unwrap();
        assert_eq!(table.available_stock, 45);
        assert!(table.apply_patch(InventoryAction::Release { quantity: 1 }).is_err());
    }

    #[test]
    fn test_set_reorder_point_bounds() {
        let mut shelf = item("INV-005");
        assert!(shelf
            .apply_patch(InventoryAction::SetReorderPoint {
                reorder_point: 101,
                reorder_quantity: 10
            })
            .is_err());
        shelf
            .apply_patch(InventoryAction::SetReorderPoint {
                reorder_point: 55,
                reorder_quantity: 40,
            })
            .unwrap();
        assert!(shelf.has_alert(AlertKind::LowStock));
    }
}
