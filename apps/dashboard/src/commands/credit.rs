//! # Credit Commands

use oakline_core::credit::{CreditAccount, CreditAction};
use oakline_core::{ListQuery, Money, Rate};
use serde::Serialize;
use tracing::{debug, info};

use super::{screen, ScreenDto};
use crate::error::ApiError;
use crate::state::{DashboardConfig, StoreState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRowDto {
    #[serde(flatten)]
    pub account: CreditAccount,
    pub utilization: Rate,
}

impl From<CreditAccount> for CreditRowDto {
    fn from(account: CreditAccount) -> Self {
        CreditRowDto {
            utilization: account.utilization(),
            account,
        }
    }
}

pub async fn list_credit_accounts(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<ScreenDto<CreditRowDto>, ApiError> {
    debug!(?query, "list_credit_accounts command");
    let accounts = store.credit.all().await?;
    screen(accounts, query, config)
}

/// Charges a purchase against a customer's credit line.
pub async fn charge_credit(store: &StoreState, id: &str, amount: Money) -> Result<CreditAccount, ApiError> {
    debug!(id = %id, amount = %amount, "charge_credit command");

    let account = store
        .credit
        .update(id, CreditAction::Charge { amount })
        .await?;

    info!(
        id = %account.id,
        available = %account.available_credit,
        risk = account.risk_level.label(),
        "Credit charged"
    );
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_rows_carry_utilization() {
        let store = StoreState::in_memory();
        let dto = list_credit_accounts(&store, &DashboardConfig::default(), &ListQuery::default())
            .await
            .unwrap();
        let first = dto.rows.iter().find(|r| r.account.id == "CRED-001").unwrap();
        // 16,000 / 150,000
        assert_eq!(first.utilization, Rate::from_bps(1067));
        assert!(dto.tile("totalLimit").is_some());
    }

    #[tokio::test]
    async fn test_charge_over_limit_is_rejected() {
        let store = StoreState::in_memory();
        let err = charge_credit(&store, "CRED-003", Money::from_major(5_000))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CreditLimitExceeded);

        let account = charge_credit(&store, "CRED-003", Money::from_major(800))
            .await
            .unwrap();
        assert_eq!(account.available_credit, Money::from_major(1_000));
    }
}
