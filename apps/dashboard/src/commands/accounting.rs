//! # Accounting Commands
//!
//! Chart of accounts, trial balance and the general journal.

use std::time::Instant;

use oakline_core::accounting::{
    post_journal_entry, trial_balance, Account, AccountingSummary, JournalEntry, TrialBalance,
};
use oakline_core::{ListQuery, Money};
use serde::Serialize;
use tracing::{debug, info};

use super::{screen, ScreenDto};
use crate::error::ApiError;
use crate::state::{DashboardConfig, StoreState};

/// The accounts screen: table plus the accounting-equation header.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsScreenDto {
    #[serde(flatten)]
    pub screen: ScreenDto<Account>,
    pub summary: AccountingSummary,
    pub equation_balanced: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalRowDto {
    #[serde(flatten)]
    pub entry: JournalEntry,
    pub debits: Money,
    pub credits: Money,
    pub is_balanced: bool,
    pub status: &'static str,
}

impl From<JournalEntry> for JournalRowDto {
    fn from(entry: JournalEntry) -> Self {
        JournalRowDto {
            debits: entry.debits(),
            credits: entry.credits(),
            is_balanced: entry.is_balanced(),
            status: entry.status_label(),
            entry,
        }
    }
}

/// What posting a draft would do to the books.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingPreviewDto {
    pub entry_id: String,
    pub before: TrialBalance,
    pub after: TrialBalance,
}

pub async fn list_accounts(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<AccountsScreenDto, ApiError> {
    let start = Instant::now();
    debug!(?query, "list_accounts command");

    let accounts = store.accounts.all().await?;
    let summary = AccountingSummary::from_accounts(&accounts);
    let screen = screen(accounts, query, config)?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        matched = screen.matched,
        "list_accounts complete"
    );

    Ok(AccountsScreenDto {
        screen,
        equation_balanced: summary.is_balanced(),
        summary,
    })
}

pub async fn get_trial_balance(store: &StoreState) -> Result<TrialBalance, ApiError> {
    debug!("get_trial_balance command");
    let accounts = store.accounts.all().await?;
    let tb = trial_balance(&accounts);
    if !tb.is_balanced {
        tracing::warn!(difference = %tb.difference(), "Trial balance is out of balance");
    }
    Ok(tb)
}

pub async fn list_journal(
    store: &StoreState,
    config: &DashboardConfig,
    query: &ListQuery,
) -> Result<ScreenDto<JournalRowDto>, ApiError> {
    debug!(?query, "list_journal command");
    let entries = store.journal.all().await?;
    screen(entries, query, config)
}

/// Posts a journal entry against a copy of the chart and returns the
/// trial balance before and after. Nothing is persisted.
pub async fn preview_posting(store: &StoreState, entry_id: &str) -> Result<PostingPreviewDto, ApiError> {
    debug!(entry_id = %entry_id, "preview_posting command");

    let entry = store.journal.get(entry_id).await?;
    let mut accounts = store.accounts.all().await?;
    let before = trial_balance(&accounts);

    post_journal_entry(&mut accounts, &entry)?;

    Ok(PostingPreviewDto {
        entry_id: entry.id,
        before,
        after: trial_balance(&accounts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use oakline_core::list::CategorySelection;

    #[tokio::test]
    async fn test_accounts_screen_summary() {
        let store = StoreState::in_memory();
        let config = DashboardConfig::default();
        let query = ListQuery::default().with_category("type", CategorySelection::only("asset"));

        let dto = list_accounts(&store, &config, &query).await.unwrap();
        assert!(dto.equation_balanced);
        assert!(dto.screen.rows.iter().all(|a| a.account_type.label() == "asset"));
        // header tiles ignore the filter
        assert_eq!(
            dto.screen.tile("netIncome").and_then(|t| t.value.as_money()),
            Some(dto.summary.net_income)
        );
    }

    #[tokio::test]
    async fn test_preview_draft_keeps_books_balanced() {
        let store = StoreState::in_memory();
        let draft = store
            .journal
            .all()
            .await
            .unwrap()
            .into_iter()
            .find(|e| !e.posted)
            .unwrap();

        let preview = preview_posting(&store, &draft.id).await.unwrap();
        assert!(preview.before.is_balanced);
        assert!(preview.after.is_balanced);
        assert_ne!(preview.before, preview.after);

        // the stored chart is untouched
        let tb = get_trial_balance(&store).await.unwrap();
        assert_eq!(tb, preview.before);
    }

    #[tokio::test]
    async fn test_preview_rejects_posted_entry() {
        let store = StoreState::in_memory();
        let err = preview_posting(&store, "JE-001").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }
}
