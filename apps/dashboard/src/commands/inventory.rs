//! # Inventory Commands
//!
//! Stock levels with derived alerts, and recording stock movements.

use chrono::NaiveDate;
use oakline_core::inventory::{InventoryAction, InventoryItem, MovementKind};
use oakline_core::{ListQuery, Money};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{screen, ScreenDto};
use crate::error::ApiError;
use crate::state::{DashboardConfig, StoreState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRowDto {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub stock_value: Money,
    pub days_of_stock: Option<f64>,
    pub status: &'static str,
}

impl From<InventoryItem> for InventoryRowDto {
    fn from(item: InventoryItem) -> Self {
        InventoryRowDto {
            stock_value: item.stock_value(),
            days_of_stock: item.days_of_stock(),
            status: item.status_label(),
            item,
        }
    }
}

/// One stock movement to record.
#[derive(Debug, Clone)]
pub struct StockMoveInput {
    pub kind: MovementKind,
    /// Signed: positive adds stock, negative removes it.
    pub quantity: i64,
    pub reference: String,
    pub date: NaiveDate,
}

pub async fn list_inventory(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<ScreenDto<InventoryRowDto>, ApiError> {
    debug!(?query, "list_inventory command");
    let items = store.inventory.all().await?;
    screen(items, query, config)
}

pub async fn record_stock_movement(
    store: &StoreState,
    id: &str,
    input: StockMoveInput,
) -> Result<InventoryItem, ApiError> {
    debug!(id = %id, kind = input.kind.label(), quantity = input.quantity, "record_stock_movement command");

    let item = store
        .inventory
        .update(
            id,
            InventoryAction::RecordMovement {
                kind: input.kind,
                quantity: input.quantity,
                reference: input.reference,
                date: input.date,
            },
        )
        .await?;

    info!(
        id = %item.id,
        current = item.current_stock,
        available = item.available_stock,
        "Stock movement recorded"
    );
    for alert in &item.alerts {
        warn!(id = %item.id, alert = alert.kind.label(), "{}", alert.message);
    }
    Ok(item)
}
