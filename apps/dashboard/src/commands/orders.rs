//! # Order Commands

use oakline_core::orders::SalesOrder;
use oakline_core::ListQuery;
use serde::Serialize;
use tracing::debug;

use super::{screen, ScreenDto};
use crate::error::ApiError;
use crate::state::{DashboardConfig, StoreState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRowDto {
    #[serde(flatten)]
    pub order: SalesOrder,
    pub units: i64,
    pub can_cancel: bool,
}

impl From<SalesOrder> for OrderRowDto {
    fn from(order: SalesOrder) -> Self {
        OrderRowDto {
            units: order.units(),
            can_cancel: order.status.can_cancel(),
            order,
        }
    }
}

pub async fn list_orders(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<ScreenDto<OrderRowDto>, ApiError> {
    debug!(?query, "list_orders command");
    let orders = store.orders.all().await?;
    screen(orders, query, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oakline_core::Money;

    #[tokio::test]
    async fn test_revenue_tiles_skip_cancelled() {
        let store = StoreState::in_memory();
        let dto = list_orders(&store, &DashboardConfig::default(), &ListQuery::default())
            .await
            .unwrap();
        let revenue = dto.tile("totalRevenue").unwrap();
        assert_eq!(revenue.value.as_money(), Some(Money::from_major(82_050)));
        assert_eq!(revenue.display, "$82,050.00");
    }
}
