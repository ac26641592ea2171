//! # Tax Commands

use chrono::NaiveDate;
use oakline_core::tax::{TaxAction, TaxFiling};
use oakline_core::ListQuery;
use tracing::{debug, info};

use super::{screen, ScreenDto};
use crate::error::ApiError;
use crate::state::{DashboardConfig, StoreState};

pub async fn list_tax_filings(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<ScreenDto<TaxFiling>, ApiError> {
    debug!(?query, "list_tax_filings command");
    let filings = store.tax_filings.all().await?;
    screen(filings, query, config)
}

/// Files a draft or overdue return.
pub async fn file_tax_return(store: &StoreState, id: &str, date: NaiveDate) -> Result<TaxFiling, ApiError> {
    debug!(id = %id, %date, "file_tax_return command");
    let filing = store.tax_filings.update(id, TaxAction::File { date }).await?;
    info!(id = %filing.id, payable = %filing.net_payable, "Tax return filed");
    Ok(filing)
}

pub async fn mark_tax_paid(store: &StoreState, id: &str, date: NaiveDate) -> Result<TaxFiling, ApiError> {
    debug!(id = %id, %date, "mark_tax_paid command");
    let filing = store.tax_filings.update(id, TaxAction::MarkPaid { date }).await?;
    info!(id = %filing.id, "Tax filing paid");
    Ok(filing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use oakline_core::tax::FilingStatus;
    use oakline_core::Money;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_outstanding_tile() {
        let store = StoreState::in_memory();
        let dto = list_tax_filings(&store, &DashboardConfig::default(), &ListQuery::default())
            .await
            .unwrap();
        let outstanding = dto.tile("outstandingPayable").unwrap();
        assert_eq!(outstanding.value.as_money(), Some(Money::from_major(10_000)));
    }

    #[tokio::test]
    async fn test_pay_filed_return() {
        let store = StoreState::in_memory();
        let err = mark_tax_paid(&store, "TAX-2023-Q4", date(2024, 1, 20)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let filing = mark_tax_paid(&store, "TAX-2023-Q4", date(2024, 1, 30)).await.unwrap();
        assert_eq!(filing.status, FilingStatus::Paid);

        let err = file_tax_return(&store, "TAX-2023-Q4", date(2024, 2, 1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }
}
