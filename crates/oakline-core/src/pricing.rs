//! # Pricing
//!
//! The price list with derived margin and markup.
//!
//! - `margin = (price - cost) / price`
//! - `markup = (price - cost) / cost`
//!
//! Both are undefined (`None`) when the divisor is zero, and such rows are
//! skipped by the list averages instead of turning them into NaN.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::list::{average_rate, count_where, AggregateScope, AggregateValue, ListSpec};
use crate::money::{Money, Rate};
use crate::record::Record;
use crate::validation::validate_non_negative;

/// Margin below which a price is flagged for review.
pub const LOW_MARGIN_BPS: i64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PriceStatus {
    Active,
    Discontinued,
}

impl PriceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PriceStatus::Active => "Active",
            PriceStatus::Discontinued => "Discontinued",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceListItem {
    pub id: String,
    pub sku: String,
    pub product_name: String,
    pub category: String,
    pub unit_cost: Money,
    pub list_price: Money,
    #[ts(as = "String")]
    pub effective_date: NaiveDate,
    pub status: PriceStatus,
}

impl PriceListItem {
    pub fn profit(&self) -> Money {
        self.list_price - self.unit_cost
    }

    pub fn margin_rate(&self) -> Option<Rate> {
        Rate::ratio(self.profit(), self.list_price)
    }

    pub fn markup_rate(&self) -> Option<Rate> {
        Rate::ratio(self.profit(), self.unit_cost)
    }

    pub fn is_low_margin(&self) -> bool {
        self.margin_rate()
            .map(|m| m.bps() < LOW_MARGIN_BPS)
            .unwrap_or(false)
    }
}

/// Edits from the price detail overlay. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePatch {
    pub list_price: Option<Money>,
    pub unit_cost: Option<Money>,
    pub effective_date: Option<NaiveDate>,
    pub status: Option<PriceStatus>,
}

impl Record for PriceListItem {
    const KIND: &'static str = "PriceListItem";
    type Patch = PricePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: PricePatch) -> CoreResult<()> {
        if let Some(price) = patch.list_price {
            validate_non_negative("listPrice", price)?;
        }
        if let Some(cost) = patch.unit_cost {
            validate_non_negative("unitCost", cost)?;
        }

        if let Some(price) = patch.list_price {
            self.list_price = price;
        }
        if let Some(cost) = patch.unit_cost {
            self.unit_cost = cost;
        }
        if let Some(date) = patch.effective_date {
            self.effective_date = date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        Ok(())
    }

    fn list_spec() -> ListSpec<Self> {
        ListSpec::<Self>::new()
            .search_field("sku", |p| p.sku.as_str())
            .search_field("productName", |p| p.product_name.as_str())
            .category("category", |p| p.category.as_str())
            .category("status", |p| p.status.label())
            .sort_key("productName", |a, b| a.product_name.cmp(&b.product_name))
            .sort_key("listPrice", |a, b| a.list_price.cmp(&b.list_price))
            .sort_key("margin", |a, b| a.margin_rate().cmp(&b.margin_rate()))
            .aggregate("itemCount", AggregateScope::Filtered, |rows| {
                AggregateValue::Count(rows.len() as u64)
            })
            .aggregate("averageMargin", AggregateScope::Filtered, |rows| {
                AggregateValue::Rate(average_rate(rows, |p| p.margin_rate()))
            })
            .aggregate("averageMarkup", AggregateScope::Filtered, |rows| {
                AggregateValue::Rate(average_rate(rows, |p| p.markup_rate()))
            })
            .aggregate("lowMarginCount", AggregateScope::All, |rows| {
                AggregateValue::Count(count_where(rows, |p| p.is_low_margin()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::list::{CategorySelection, ListQuery};

    fn price(id: &str) -> PriceListItem {
        fixtures::price_list().into_iter().find(|p| p.id == id).unwrap()
    }

    #[test]
    fn test_margin_and_markup() {
        let table = price("PRC-001");
        assert_eq!(table.margin_rate(), Some(Rate::from_bps(5_200)));
        assert_eq!(table.markup_rate(), Some(Rate::from_bps(10_833)));
        assert!(price("PRC-006").is_low_margin());
    }

    #[test]
    fn test_zero_price_has_no_margin() {
        let stool = price("PRC-007");
        assert_eq!(stool.margin_rate(), None);
        assert!(stool.markup_rate().is_some());
        assert!(!stool.is_low_margin());
    }

    #[test]
    fn test_average_margin_over_empty_filter_is_zero() {
        let items = fixtures::price_list();
        let query = ListQuery::default().with_category("category", CategorySelection::only("Outdoor"));
        let page = PriceListItem::list_spec().view(&items, &query);
        assert_eq!(page.matched, 0);
        assert_eq!(page.aggregate("averageMargin"), Some(AggregateValue::Rate(Rate::zero())));
    }

    #[test]
    fn test_average_margin_skips_undefined() {
        let items = fixtures::price_list();
        let query =
            ListQuery::default().with_category("category", CategorySelection::only("Accessories"));
        let page = PriceListItem::list_spec().view(&items, &query);
        assert_eq!(page.matched, 1);
        assert_eq!(page.aggregate("averageMargin"), Some(AggregateValue::Rate(Rate::zero())));
    }

    #[test]
    fn test_patch_rejects_negative_amounts() {
        let mut item = price("PRC-002");
        let before = item.clone();
        assert!(item
            .apply_patch(PricePatch {
                list_price: Some(Money::from_major(1_400)),
                unit_cost: Some(Money::from_major(-1)),
                ..PricePatch::default()
            })
            .is_err());
        assert_eq!(item, before);

        item.apply_patch(PricePatch {
            list_price: Some(Money::from_major(1_400)),
            ..PricePatch::default()
        })
        .unwrap();
        assert_eq!(item.margin_rate(), Some(Rate::from_bps(5_000)));
    }
}
