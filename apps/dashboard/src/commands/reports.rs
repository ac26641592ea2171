//! # Report Commands
//!
//! Reports are generated from a consistent read of the four record sets
//! they draw on, stamped with the business name and reporting date.

use chrono::NaiveDate;
use oakline_core::report::{generate, Books, FinancialReport, ReportKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{DashboardConfig, StoreState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDto {
    pub title: &'static str,
    pub business_name: String,
    pub as_of: NaiveDate,
    pub report: FinancialReport,
}

pub async fn generate_report(
    store: &StoreState,
    config: &DashboardConfig,
    kind: ReportKind,
) -> Result<ReportDto, ApiError> {
    debug!(report = %kind, "generate_report command");
    let start = std::time::Instant::now();

    let (accounts, invoices, tax_filings, inventory) = tokio::try_join!(
        store.accounts.all(),
        store.invoices.all(),
        store.tax_filings.all(),
        store.inventory.all(),
    )?;

    let books = Books {
        accounts: &accounts,
        invoices: &invoices,
        tax_filings: &tax_filings,
        inventory: &inventory,
        as_of: config.as_of,
    };
    let report = generate(kind, &books);

    info!(
        report = %kind,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Report generated"
    );
    Ok(ReportDto {
        title: kind.title(),
        business_name: config.business_name.clone(),
        as_of: config.as_of,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use oakline_core::Money;

    #[tokio::test]
    async fn test_every_report_generates() {
        let store = StoreState::in_memory();
        let config = DashboardConfig::default();
        for kind in ReportKind::ALL {
            let dto = generate_report(&store, &config, kind).await.unwrap();
            assert_eq!(dto.report.kind(), kind);
            assert_eq!(dto.title, kind.title());
        }
    }

    #[tokio::test]
    async fn test_aging_uses_configured_date() {
        let store = StoreState::in_memory();
        let dto = generate_report(&store, &DashboardConfig::default(), ReportKind::ReceivablesAging)
            .await
            .unwrap();
        let FinancialReport::ReceivablesAging(aging) = dto.report else {
            panic!("expected aging report");
        };
        assert_eq!(aging.total_outstanding, Money::from_major(42_996));
    }
}
