//! Dashboard screens behave the same over fixture memory and SQLite.

use oakline_core::list::SortDirection;
use oakline_core::report::{FinancialReport, ReportKind};
use oakline_core::{CategorySelection, ListQuery, Money};
use oakline_dashboard::commands::{accounting, billing, credit, inventory, reports};
use oakline_dashboard::error::ErrorCode;
use oakline_dashboard::state::{DashboardConfig, SelectionState, StoreState};
use oakline_db::{Database, DbConfig};

async fn sqlite_store() -> StoreState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    StoreState::sqlite(db).await.unwrap()
}

fn invoice_ids(dto: &oakline_dashboard::commands::ScreenDto<oakline_core::billing::Invoice>) -> Vec<String> {
    dto.rows.iter().map(|i| i.id.clone()).collect()
}

#[tokio::test]
async fn both_stores_render_the_same_invoice_screen() {
    let config = DashboardConfig::default();
    let query = ListQuery::default().sorted_by("dueDate", SortDirection::Desc);

    let memory = billing::list_invoices(&StoreState::in_memory(), &config, &query)
        .await
        .unwrap();
    let sqlite_store = sqlite_store().await;
    let sqlite = billing::list_invoices(&sqlite_store, &config, &query)
        .await
        .unwrap();

    assert_eq!(invoice_ids(&memory), invoice_ids(&sqlite));
    assert_eq!(memory.total_items, sqlite.total_items);
    assert_eq!(
        memory.tile("outstanding").map(|t| t.display.clone()),
        sqlite.tile("outstanding").map(|t| t.display.clone())
    );
    sqlite_store.close().await;
}

#[tokio::test]
async fn payment_is_visible_on_the_next_read() {
    let store = sqlite_store().await;
    let config = DashboardConfig::default();

    billing::record_payment(&store, "INV-002", Money::from_major(3_840))
        .await
        .unwrap();

    let selections = SelectionState::new();
    let detail = billing::open_invoice(&store, &selections, &config, "INV-002")
        .await
        .unwrap();
    assert_eq!(detail.invoice.balance, Money::from_major(10_000));

    let err = billing::record_payment(&store, "INV-002", Money::from_major(10_001))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentError);
    store.close().await;
}

#[tokio::test]
async fn filters_offer_all_first() {
    let store = StoreState::in_memory();
    let dto = credit::list_credit_accounts(&store, &DashboardConfig::default(), &ListQuery::default())
        .await
        .unwrap();
    let risk = dto.filters.iter().find(|f| f.name == "risk").unwrap();
    assert_eq!(risk.options.first().map(String::as_str), Some("All"));

    let high = ListQuery::default().with_category("risk", CategorySelection::only("High"));
    let dto = credit::list_credit_accounts(&store, &DashboardConfig::default(), &high)
        .await
        .unwrap();
    let ids: Vec<&str> = dto.rows.iter().map(|r| r.account.id.as_str()).collect();
    assert_eq!(ids, vec!["CRED-003"]);
}

#[tokio::test]
async fn unknown_filter_is_a_validation_error() {
    let store = StoreState::in_memory();
    let query = ListQuery::default().with_category("colour", CategorySelection::only("Red"));
    let err = inventory::list_inventory(&store, &DashboardConfig::default(), &query)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn posting_preview_leaves_ledger_untouched() {
    let store = sqlite_store().await;
    let before = accounting::get_trial_balance(&store).await.unwrap();

    let drafts = accounting::list_journal(&store, &DashboardConfig::default(), &ListQuery::default())
        .await
        .unwrap();
    let draft = drafts.rows.iter().find(|r| !r.entry.posted).unwrap();
    let preview = accounting::preview_posting(&store, &draft.entry.id).await.unwrap();
    assert_ne!(preview.before, preview.after);

    let after = accounting::get_trial_balance(&store).await.unwrap();
    assert_eq!(before, after);
    store.close().await;
}

#[tokio::test]
async fn balance_sheet_balances_over_sqlite() {
    let store = sqlite_store().await;
    let config = DashboardConfig::default();
    let dto = reports::generate_report(&store, &config, ReportKind::BalanceSheet)
        .await
        .unwrap();
    let FinancialReport::BalanceSheet(sheet) = dto.report else {
        panic!("expected balance sheet");
    };
    assert!(sheet.balanced);
    assert_eq!(dto.business_name, config.business_name);
    store.close().await;
}
