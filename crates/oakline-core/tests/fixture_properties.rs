//! Properties the seeded dashboard data must satisfy.

use oakline_core::accounting::{
    post_journal_entry, trial_balance, AccountType, AccountingSummary, JournalEntry, JournalLine,
};
use oakline_core::billing::{Invoice, InvoiceAction};
use oakline_core::credit::CreditAccount;
use oakline_core::fixtures;
use oakline_core::inventory::{AlertKind, InventoryItem};
use oakline_core::list::{CategorySelection, ListQuery, SortDirection};
use oakline_core::{CoreError, Money, Record, Selection};

fn sum_of(types: &[AccountType]) -> Money {
    fixtures::accounts()
        .iter()
        .filter(|a| types.contains(&a.account_type))
        .map(|a| a.balance)
        .sum()
}

#[test]
fn accounting_fixture_balances() {
    let debit_side = sum_of(&[AccountType::Asset, AccountType::Expense]);
    let credit_side = sum_of(&[AccountType::Liability, AccountType::Equity, AccountType::Revenue]);
    assert_eq!(debit_side, credit_side);

    let summary = AccountingSummary::from_accounts(&fixtures::accounts());
    assert_eq!(
        summary.total_assets,
        summary.total_liabilities + summary.total_equity + summary.net_income
    );
}

#[test]
fn trial_balance_has_one_column_per_row() {
    let tb = trial_balance(&fixtures::accounts());
    assert_eq!(tb.rows.len(), fixtures::accounts().len());
    for row in &tb.rows {
        let debit_type = matches!(row.account_type, AccountType::Asset | AccountType::Expense);
        assert_eq!(row.debit.is_some(), debit_type, "{}", row.code);
        assert_eq!(row.credit.is_some(), !debit_type, "{}", row.code);
    }
    assert_eq!(tb.total_debits, tb.total_credits);
}

#[test]
fn elite_partial_filter_returns_only_inv_002() {
    let invoices = fixtures::invoices();
    let query = ListQuery::search("Elite").with_category("status", CategorySelection::only("Partial"));
    let hits = Invoice::list_spec().apply_filters(&invoices, &query);

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "INV-002");
    assert!(hits.iter().all(|i| i.id != "INV-001"));

    // every hit satisfies both predicates, and nothing matching both is missed
    let expected: Vec<&str> = invoices
        .iter()
        .filter(|i| {
            let needle = "elite";
            (i.customer_name.to_lowercase().contains(needle)
                || i.invoice_number.to_lowercase().contains(needle)
                || i.order_number.to_lowercase().contains(needle))
                && i.status.label() == "Partial"
        })
        .map(|i| i.id.as_str())
        .collect();
    let actual: Vec<&str> = hits.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(actual, expected);
}

#[test]
fn credit_available_plus_used_equals_limit() {
    for account in fixtures::credit_accounts() {
        assert_eq!(
            account.available_credit + account.used_credit,
            account.credit_limit,
            "{}",
            account.id
        );
        account.check_invariants().unwrap();
    }
    let first = fixtures::credit_accounts()
        .into_iter()
        .find(|c| c.id == "CRED-001")
        .unwrap();
    assert_eq!(first.available_credit, Money::from_major(134_000));
    assert_eq!(first.used_credit, Money::from_major(16_000));
}

#[test]
fn inventory_stock_arithmetic_and_out_of_stock_alert() {
    for item in fixtures::inventory_items() {
        assert_eq!(item.current_stock - item.reserved_stock, item.available_stock, "{}", item.id);
        assert_eq!(
            item.has_alert(AlertKind::OutOfStock),
            item.current_stock == 0,
            "{}",
            item.id
        );
        assert_eq!(item.stock_from_movements(), item.current_stock, "{}", item.id);
        item.check_invariants().unwrap();
    }
    let items = fixtures::inventory_items();
    let table = items.iter().find(|i| i.id == "INV-001").unwrap();
    assert_eq!((table.current_stock, table.reserved_stock, table.available_stock), (45, 8, 37));
    let bed = items.iter().find(|i| i.id == "INV-004").unwrap();
    assert!(bed.has_alert(AlertKind::OutOfStock));
}

#[test]
fn filtering_is_idempotent_and_pure() {
    let items = fixtures::inventory_items();
    let snapshot = items.clone();
    let query = ListQuery::search("o")
        .with_category("category", CategorySelection::only("Office"))
        .sorted_by("available", SortDirection::Desc);
    let spec = InventoryItem::list_spec();

    let first = spec.view(&items, &query);
    let second = spec.view(&items, &query);
    assert_eq!(first.items, second.items);
    assert_eq!(first.aggregates, second.aggregates);
    assert_eq!(items, snapshot);
}

#[test]
fn journal_fixtures_balance_and_posting_preserves_equality() {
    let mut accounts = fixtures::accounts();
    for entry in fixtures::journal_entries() {
        entry.validate().unwrap();
    }

    let draft = fixtures::journal_entries()
        .into_iter()
        .find(|e| !e.posted)
        .unwrap();
    post_journal_entry(&mut accounts, &draft).unwrap();
    assert!(trial_balance(&accounts).is_balanced);

    let unbalanced = JournalEntry {
        id: "JE-099".to_string(),
        lines: vec![
            JournalLine::debit("5300", Money::from_major(10)),
            JournalLine::credit("1000", Money::from_major(9)),
        ],
        total: Money::from_major(10),
        ..draft
    };
    let before = accounts.clone();
    assert!(matches!(
        post_journal_entry(&mut accounts, &unbalanced),
        Err(CoreError::UnbalancedEntry { .. })
    ));
    assert_eq!(accounts, before);
}

#[test]
fn invoice_payment_keeps_balance_and_rejects_overpayment() {
    let mut invoices = fixtures::invoices();
    let partial = invoices.iter_mut().find(|i| i.id == "INV-002").unwrap();

    partial
        .apply_patch(InvoiceAction::RecordPayment {
            amount: Money::from_major(3_840),
        })
        .unwrap();
    assert_eq!(partial.balance, partial.total - partial.paid);
    assert_eq!(partial.balance, Money::from_major(10_000));

    let err = partial
        .apply_patch(InvoiceAction::RecordPayment {
            amount: Money::from_major(10_001),
        })
        .unwrap_err();
    assert!(matches!(err, CoreError::Overpayment { .. }));
    assert_eq!(partial.balance, Money::from_major(10_000));
}

#[test]
fn selection_opens_one_record_at_a_time() {
    let accounts = fixtures::credit_accounts();
    let mut selection = Selection::new();
    assert!(selection.resolve(&accounts).unwrap().is_none());

    selection.select("CRED-002");
    selection.select("CRED-003");
    let open: &CreditAccount = selection.resolve(&accounts).unwrap().unwrap();
    assert_eq!(open.id, "CRED-003");

    selection.select("CRED-999");
    assert!(matches!(
        selection.resolve(&accounts),
        Err(CoreError::RecordNotFound { .. })
    ));

    selection.clear();
    assert!(!selection.is_open());
}
