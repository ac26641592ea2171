//! # Sales Analytics
//!
//! Revenue breakdowns computed from sales orders. Cancelled orders never
//! count as revenue.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::{Money, Rate};
use crate::orders::SalesOrder;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: Money,
    pub units: i64,
    /// Share of total revenue.
    pub share: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    /// `YYYY-MM`.
    pub month: String,
    pub revenue: Money,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRevenue {
    pub customer_name: String,
    pub revenue: Money,
    pub orders: u64,
}

/// Everything the analytics screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesAnalytics {
    pub total_revenue: Money,
    pub order_count: u64,
    pub average_order_value: Money,
    pub by_category: Vec<CategoryRevenue>,
    pub by_month: Vec<MonthlyRevenue>,
    pub top_customers: Vec<CustomerRevenue>,
    /// Latest month against the one before; `None` with fewer than two
    /// months or a zero base.
    pub month_over_month_growth: Option<Rate>,
}

fn revenue_orders(orders: &[SalesOrder]) -> impl Iterator<Item = &SalesOrder> {
    orders.iter().filter(|o| o.is_revenue())
}

pub fn total_revenue(orders: &[SalesOrder]) -> Money {
    revenue_orders(orders).map(|o| o.total).sum()
}

/// Average order value; zero when there are no revenue orders.
pub fn average_order_value(orders: &[SalesOrder]) -> Money {
    total_revenue(orders).average_over(revenue_orders(orders).count())
}

/// Revenue per line category, largest first. Ties keep name order.
pub fn revenue_by_category(orders: &[SalesOrder]) -> Vec<CategoryRevenue> {
    let mut totals: BTreeMap<&str, (Money, i64)> = BTreeMap::new();
    for line in revenue_orders(orders).flat_map(|o| o.lines.iter()) {
        let entry = totals.entry(line.category.as_str()).or_default();
        entry.0 += line.amount;
        entry.1 += line.quantity;
    }

    let grand_total: Money = totals.values().map(|(revenue, _)| *revenue).sum();
    let mut rows: Vec<CategoryRevenue> = totals
        .into_iter()
        .map(|(category, (revenue, units))| CategoryRevenue {
            category: category.to_string(),
            revenue,
            units,
            share: Rate::ratio(revenue, grand_total).unwrap_or_default(),
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows
}

/// Revenue per calendar month, oldest first.
pub fn revenue_by_month(orders: &[SalesOrder]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<(i32, u32), (Money, u64)> = BTreeMap::new();
    for order in revenue_orders(orders) {
        let key = (order.order_date.year(), order.order_date.month());
        let entry = months.entry(key).or_default();
        entry.0 += order.total;
        entry.1 += 1;
    }
    months
        .into_iter()
        .map(|((year, month), (revenue, count))| MonthlyRevenue {
            month: format!("{:04}-{:02}", year, month),
            revenue,
            orders: count,
        })
        .collect()
}

/// The `limit` customers with the most revenue.
pub fn top_customers(orders: &[SalesOrder], limit: usize) -> Vec<CustomerRevenue> {
    let mut customers: BTreeMap<&str, (Money, u64)> = BTreeMap::new();
    for order in revenue_orders(orders) {
        let entry = customers.entry(order.customer_name.as_str()).or_default();
        entry.0 += order.total;
        entry.1 += 1;
    }
    let mut rows: Vec<CustomerRevenue> = customers
        .into_iter()
        .map(|(name, (revenue, count))| CustomerRevenue {
            customer_name: name.to_string(),
            revenue,
            orders: count,
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows.truncate(limit);
    rows
}

fn month_start(month: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()
}

/// Growth of the last month over the previous one.
///
/// `None` unless the two latest months are calendar neighbours; a month
/// with no orders leaves no row to compare against.
pub fn month_over_month_growth(months: &[MonthlyRevenue]) -> Option<Rate> {
    let [.., previous, latest] = months else {
        return None;
    };
    let expected = month_start(&previous.month)?.checked_add_months(Months::new(1))?;
    if month_start(&latest.month)? != expected {
        return None;
    }
    Rate::ratio(latest.revenue - previous.revenue, previous.revenue)
}

pub fn sales_analytics(orders: &[SalesOrder], top_n: usize) -> SalesAnalytics {
    let by_month = revenue_by_month(orders);
    SalesAnalytics {
        total_revenue: total_revenue(orders),
        order_count: revenue_orders(orders).count() as u64,
        average_order_value: average_order_value(orders),
        by_category: revenue_by_category(orders),
        month_over_month_growth: month_over_month_growth(&by_month),
        by_month,
        top_customers: top_customers(orders, top_n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_category_breakdown() {
        let rows = revenue_by_category(&fixtures::sales_orders());
        let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Office", "Bedroom", "Living Room", "Dining"]);
        assert_eq!(rows[0].revenue, Money::from_major(36_800));
        let total: Money = rows.iter().map(|r| r.revenue).sum();
        assert_eq!(total, Money::from_major(82_050));
    }

    #[test]
    fn test_monthly_and_growth() {
        let months = revenue_by_month(&fixtures::sales_orders());
        let keys: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, vec!["2023-11", "2023-12", "2024-01"]);
        assert_eq!(months[2].revenue, Money::from_major(59_450));
        assert_eq!(months[2].orders, 5);
        // (59,450 - 7,400) / 7,400
        assert_eq!(month_over_month_growth(&months), Some(Rate::from_bps(70_338)));
        assert_eq!(month_over_month_growth(&months[..1]), None);
    }

    #[test]
    fn test_growth_skips_gap_months() {
        let months = revenue_by_month(&fixtures::sales_orders());
        let gapped = vec![months[0].clone(), months[2].clone()];
        assert_eq!(month_over_month_growth(&gapped), None);

        // December to January is still consecutive
        let year_end = month_over_month_growth(&months[1..]);
        assert_eq!(year_end, month_over_month_growth(&months));
        assert!(year_end.is_some());
    }

    #[test]
    fn test_top_customers() {
        let top = top_customers(&fixtures::sales_orders(), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].customer_name, "Elite Furnishings LLC");
        assert_eq!(top[1].customer_name, "Urban Loft Designs");
        assert_eq!(top[1].revenue, Money::from_major(19_000));
    }

    #[test]
    fn test_empty_orders() {
        let analytics = sales_analytics(&[], 5);
        assert_eq!(analytics.total_revenue, Money::zero());
        assert_eq!(analytics.average_order_value, Money::zero());
        assert!(analytics.by_category.is_empty());
        assert_eq!(analytics.month_over_month_growth, None);
    }
}
