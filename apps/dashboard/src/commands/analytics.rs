//! # Analytics Commands

use oakline_core::analytics::{sales_analytics, SalesAnalytics};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::StoreState;

pub const DEFAULT_TOP_CUSTOMERS: usize = 5;

pub async fn get_sales_analytics(store: &StoreState, top_n: usize) -> Result<SalesAnalytics, ApiError> {
    debug!(top_n, "get_sales_analytics command");
    let start = std::time::Instant::now();

    let orders = store.orders.all().await?;
    let analytics = sales_analytics(&orders, top_n);

    info!(
        orders = analytics.order_count,
        revenue = %analytics.total_revenue,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Sales analytics computed"
    );
    Ok(analytics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oakline_core::Money;

    #[tokio::test]
    async fn test_analytics_over_store() {
        let store = StoreState::in_memory();
        let analytics = get_sales_analytics(&store, 2).await.unwrap();
        assert_eq!(analytics.total_revenue, Money::from_major(82_050));
        assert_eq!(analytics.top_customers.len(), 2);
        assert_eq!(analytics.by_month.len(), 3);
    }
}
