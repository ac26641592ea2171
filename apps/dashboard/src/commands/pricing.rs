//! # Pricing Commands

use oakline_core::pricing::PriceListItem;
use oakline_core::{ListQuery, Money, Rate};
use serde::Serialize;
use tracing::debug;

use super::{screen, ScreenDto};
use crate::error::ApiError;
use crate::state::{DashboardConfig, StoreState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRowDto {
    #[serde(flatten)]
    pub item: PriceListItem,
    pub profit: Money,
    /// `None` for a zero list price.
    pub margin: Option<Rate>,
    /// `None` for a zero cost.
    pub markup: Option<Rate>,
    pub low_margin: bool,
}

impl From<PriceListItem> for PriceRowDto {
    fn from(item: PriceListItem) -> Self {
        PriceRowDto {
            profit: item.profit(),
            margin: item.margin_rate(),
            markup: item.markup_rate(),
            low_margin: item.is_low_margin(),
            item,
        }
    }
}

pub async fn list_prices(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<ScreenDto<PriceRowDto>, ApiError> {
    debug!(?query, "list_prices command");
    let items = store.prices.all().await?;
    screen(items, query, config)
}
