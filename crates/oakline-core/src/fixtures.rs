//! # Fixtures
//!
//! The seeded records every screen starts from. The memory store loads
//! these directly and the `seed` binary writes them to SQLite.
//!
//! Derived fields (available credit, available stock, alerts, invoice
//! totals) are computed by the same code the patches use, never typed in.

use chrono::NaiveDate;

use crate::accounting::{Account, AccountType, JournalEntry, JournalLine};
use crate::billing::{
    Invoice, InvoiceLineItem, InvoiceStatus, PaymentTransaction, Statement, StatementLine,
    TransactionStatus,
};
use crate::credit::{CreditAccount, CreditStatus, RiskLevel};
use crate::inventory::{InventoryItem, MovementKind, StockMovement};
use crate::money::Money;
use crate::orders::{OrderLine, OrderStatus, PaymentState, SalesOrder};
use crate::pricing::{PriceListItem, PriceStatus};
use crate::tax::{FilingStatus, TaxFiling};
use crate::types::PaymentMethod;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn usd(major: i64) -> Money {
    Money::from_major(major)
}

/// The dashboard's reference date for aging and due-date checks.
pub fn as_of() -> NaiveDate {
    date(2024, 2, 1)
}

// =============================================================================
// Accounting
// =============================================================================

pub fn accounts() -> Vec<Account> {
    let rows: [(&str, &str, AccountType, i64, bool); 16] = [
        ("1000", "Cash", AccountType::Asset, 125_000, true),
        ("1100", "Accounts Receivable", AccountType::Asset, 84_500, true),
        ("1200", "Inventory", AccountType::Asset, 210_000, true),
        ("1500", "Equipment", AccountType::Asset, 95_000, true),
        ("2000", "Accounts Payable", AccountType::Liability, 62_000, true),
        ("2100", "Sales Tax Payable", AccountType::Liability, 8_500, true),
        ("2500", "Long-term Loan", AccountType::Liability, 120_000, true),
        ("3000", "Owner's Equity", AccountType::Equity, 200_000, true),
        ("3100", "Retained Earnings", AccountType::Equity, 99_000, true),
        ("4000", "Sales Revenue", AccountType::Revenue, 385_000, true),
        ("4100", "Delivery Revenue", AccountType::Revenue, 12_000, true),
        ("5000", "Cost of Goods Sold", AccountType::Expense, 231_000, true),
        ("5100", "Salaries Expense", AccountType::Expense, 96_000, true),
        ("5200", "Rent Expense", AccountType::Expense, 36_000, true),
        ("5300", "Utilities Expense", AccountType::Expense, 9_000, true),
        ("5400", "Marketing Expense", AccountType::Expense, 0, false),
    ];
    rows.into_iter()
        .map(|(code, name, account_type, balance, active)| Account {
            id: format!("ACC-{}", code),
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            balance: usd(balance),
            active,
        })
        .collect()
}

fn journal(
    id: &str,
    on: NaiveDate,
    reference: &str,
    description: &str,
    lines: Vec<JournalLine>,
    posted: bool,
) -> JournalEntry {
    let total = lines.iter().filter_map(|l| l.debit).sum();
    JournalEntry {
        id: id.to_string(),
        date: on,
        reference: reference.to_string(),
        description: description.to_string(),
        lines,
        total,
        posted,
    }
}

pub fn journal_entries() -> Vec<JournalEntry> {
    vec![
        journal(
            "JE-001",
            date(2024, 1, 5),
            "INV-2024-003",
            "Sale to Coastal Living Co",
            vec![
                JournalLine::debit("1100", usd(9_450)),
                JournalLine::credit("4000", usd(8_750)),
                JournalLine::credit("2100", usd(700)),
            ],
            true,
        ),
        journal(
            "JE-002",
            date(2024, 1, 22),
            "TXN-001",
            "Payment received from Coastal Living Co",
            vec![
                JournalLine::debit("1000", usd(9_450)),
                JournalLine::credit("1100", usd(9_450)),
            ],
            true,
        ),
        journal(
            "JE-003",
            date(2024, 1, 31),
            "PAYROLL-01",
            "January salaries",
            vec![
                JournalLine::debit("5100", usd(8_000)),
                JournalLine::credit("1000", usd(8_000)),
            ],
            true,
        ),
        journal(
            "JE-004",
            date(2024, 2, 1),
            "RENT-02",
            "February showroom rent",
            vec![
                JournalLine::debit("5200", usd(3_000)),
                JournalLine::credit("1000", usd(3_000)),
            ],
            false,
        ),
    ]
}

// =============================================================================
// Billing
// =============================================================================

struct InvoiceSeed<'a> {
    id: &'a str,
    number: &'a str,
    order: &'a str,
    customer: &'a str,
    issued: NaiveDate,
    due: NaiveDate,
    lines: Vec<InvoiceLineItem>,
    tax: i64,
    discount: i64,
    paid: i64,
    status: InvoiceStatus,
}

fn invoice(seed: InvoiceSeed<'_>) -> Invoice {
    let mut invoice = Invoice {
        id: seed.id.to_string(),
        invoice_number: seed.number.to_string(),
        order_number: seed.order.to_string(),
        customer_name: seed.customer.to_string(),
        issue_date: seed.issued,
        due_date: seed.due,
        line_items: seed.lines,
        subtotal: Money::zero(),
        tax: usd(seed.tax),
        discount: usd(seed.discount),
        total: Money::zero(),
        paid: usd(seed.paid),
        balance: Money::zero(),
        status: seed.status,
    };
    invoice.recalculate();
    invoice
}

pub fn invoices() -> Vec<Invoice> {
    vec![
        invoice(InvoiceSeed {
            id: "INV-001",
            number: "INV-2024-001",
            order: "ORD-2024-001",
            customer: "Modern Home Interiors",
            issued: date(2024, 1, 15),
            due: date(2024, 2, 14),
            lines: vec![InvoiceLineItem::new("Oak Dining Table", 5, usd(2_500))],
            tax: 1_000,
            discount: 0,
            paid: 0,
            status: InvoiceStatus::Sent,
        }),
        invoice(InvoiceSeed {
            id: "INV-002",
            number: "INV-2024-002",
            order: "ORD-2024-002",
            customer: "Elite Furnishings LLC",
            issued: date(2024, 1, 20),
            due: date(2024, 2, 19),
            lines: vec![
                InvoiceLineItem::new("Executive Desk", 10, usd(1_800)),
                InvoiceLineItem::new("Ergonomic Chair", 20, usd(500)),
            ],
            tax: 2_240,
            discount: 1_400,
            paid: 15_000,
            status: InvoiceStatus::Partial,
        }),
        invoice(InvoiceSeed {
            id: "INV-003",
            number: "INV-2024-003",
            order: "ORD-2024-003",
            customer: "Coastal Living Co",
            issued: date(2024, 1, 5),
            due: date(2024, 2, 4),
            lines: vec![InvoiceLineItem::new("Leather Sofa", 7, usd(1_250))],
            tax: 700,
            discount: 0,
            paid: 9_450,
            status: InvoiceStatus::Paid,
        }),
        invoice(InvoiceSeed {
            id: "INV-004",
            number: "INV-2023-045",
            order: "ORD-2023-118",
            customer: "Urban Loft Designs",
            issued: date(2023, 11, 20),
            due: date(2023, 12, 20),
            lines: vec![InvoiceLineItem::new("King Bed Frame", 8, usd(1_900))],
            tax: 1_216,
            discount: 760,
            paid: 0,
            status: InvoiceStatus::Overdue,
        }),
        invoice(InvoiceSeed {
            id: "INV-005",
            number: "INV-2024-005",
            order: "ORD-2024-005",
            customer: "Elite Office Solutions",
            issued: date(2024, 1, 28),
            due: date(2024, 2, 27),
            lines: vec![InvoiceLineItem::new("Bookshelf", 16, usd(400))],
            tax: 512,
            discount: 0,
            paid: 0,
            status: InvoiceStatus::Draft,
        }),
    ]
}

fn statement_line(on: NaiveDate, reference: &str, description: &str, charge: i64, payment: i64) -> StatementLine {
    StatementLine {
        date: on,
        reference: reference.to_string(),
        description: description.to_string(),
        charge: usd(charge),
        payment: usd(payment),
    }
}

fn statement(id: &str, customer: &str, opening: i64, lines: Vec<StatementLine>) -> Statement {
    let mut statement = Statement {
        id: id.to_string(),
        customer_name: customer.to_string(),
        period_start: date(2024, 1, 1),
        period_end: date(2024, 1, 31),
        opening_balance: usd(opening),
        total_charges: lines.iter().map(|l| l.charge).sum(),
        total_payments: lines.iter().map(|l| l.payment).sum(),
        lines,
        closing_balance: Money::zero(),
    };
    statement.closing_balance = statement.computed_closing_balance();
    statement
}

pub fn statements() -> Vec<Statement> {
    vec![
        statement(
            "STMT-001",
            "Elite Furnishings LLC",
            0,
            vec![
                statement_line(date(2024, 1, 20), "INV-2024-002", "Invoice", 28_840, 0),
                statement_line(date(2024, 1, 28), "TXN-002", "Card payment", 0, 15_000),
            ],
        ),
        statement(
            "STMT-002",
            "Modern Home Interiors",
            0,
            vec![statement_line(date(2024, 1, 15), "INV-2024-001", "Invoice", 13_500, 0)],
        ),
        statement(
            "STMT-003",
            "Coastal Living Co",
            0,
            vec![
                statement_line(date(2024, 1, 5), "INV-2024-003", "Invoice", 9_450, 0),
                statement_line(date(2024, 1, 22), "TXN-001", "Bank transfer", 0, 9_450),
            ],
        ),
        statement("STMT-004", "Urban Loft Designs", 15_656, Vec::new()),
    ]
}

pub fn payment_transactions() -> Vec<PaymentTransaction> {
    let rows = [
        ("TXN-001", "INV-003", "Coastal Living Co", date(2024, 1, 22), 9_450_00, 0, PaymentMethod::BankTransfer, TransactionStatus::Completed, "ACH-88213"),
        ("TXN-002", "INV-002", "Elite Furnishings LLC", date(2024, 1, 28), 15_000_00, 435_00, PaymentMethod::CreditCard, TransactionStatus::Completed, "CH-3Q9XK2"),
        ("TXN-003", "INV-001", "Modern Home Interiors", date(2024, 1, 31), 5_000_00, 145_00, PaymentMethod::CreditCard, TransactionStatus::Pending, "CH-3R1ML7"),
        ("TXN-004", "INV-004", "Urban Loft Designs", date(2024, 1, 10), 15_656_00, 0, PaymentMethod::Check, TransactionStatus::Failed, "CHK-10442"),
    ];
    rows.into_iter()
        .map(
            |(id, invoice_id, customer, on, amount, fee, method, status, reference)| PaymentTransaction {
                id: id.to_string(),
                invoice_id: invoice_id.to_string(),
                customer_name: customer.to_string(),
                date: on,
                amount: Money::from_cents(amount),
                fee: Money::from_cents(fee),
                method,
                status,
                reference: reference.to_string(),
            },
        )
        .collect()
}

// =============================================================================
// Credit
// =============================================================================

pub fn credit_accounts() -> Vec<CreditAccount> {
    let rows = [
        ("CRED-001", "Elite Furnishings LLC", 150_000, 16_000, 30),
        ("CRED-002", "Modern Home Interiors", 75_000, 42_500, 30),
        ("CRED-003", "Urban Loft Designs", 50_000, 48_200, 15),
        ("CRED-004", "Coastal Living Co", 100_000, 0, 45),
    ];
    rows.into_iter()
        .map(|(id, customer, limit, used, terms)| {
            let mut account = CreditAccount {
                id: id.to_string(),
                customer_name: customer.to_string(),
                credit_limit: usd(limit),
                used_credit: usd(used),
                available_credit: Money::zero(),
                risk_level: RiskLevel::Low,
                status: CreditStatus::Active,
                payment_terms_days: terms,
            };
            account.refresh();
            account
        })
        .collect()
}

// =============================================================================
// Inventory
// =============================================================================

struct StockSeed<'a> {
    id: &'a str,
    sku: &'a str,
    name: &'a str,
    category: &'a str,
    location: &'a str,
    reserved: i64,
    reorder_point: i64,
    reorder_quantity: i64,
    max_stock: i64,
    unit_cost: i64,
    usage: f64,
    movements: Vec<(NaiveDate, MovementKind, i64, &'a str)>,
}

fn stock_item(seed: StockSeed<'_>) -> InventoryItem {
    let movements: Vec<StockMovement> = seed
        .movements
        .into_iter()
        .enumerate()
        .map(|(n, (on, kind, quantity, reference))| StockMovement {
            id: format!("{}-M{:03}", seed.id, n + 1),
            date: on,
            kind,
            quantity,
            reference: reference.to_string(),
        })
        .collect();
    let mut item = InventoryItem {
        id: seed.id.to_string(),
        sku: seed.sku.to_string(),
        name: seed.name.to_string(),
        category: seed.category.to_string(),
        location: seed.location.to_string(),
        current_stock: movements.iter().map(|m| m.quantity).sum(),
        reserved_stock: seed.reserved,
        available_stock: 0,
        reorder_point: seed.reorder_point,
        reorder_quantity: seed.reorder_quantity,
        max_stock: seed.max_stock,
        unit_cost: usd(seed.unit_cost),
        average_daily_usage: seed.usage,
        movements,
        alerts: Vec::new(),
    };
    item.refresh();
    item
}

pub fn inventory_items() -> Vec<InventoryItem> {
    vec![
        stock_item(StockSeed {
            id: "INV-001",
            sku: "OAK-DT-001",
            name: "Oak Dining Table",
            category: "Dining",
            location: "Warehouse A",
            reserved: 8,
            reorder_point: 15,
            reorder_quantity: 30,
            max_stock: 80,
            unit_cost: 1_200,
            usage: 1.5,
            movements: vec![
                (date(2023, 12, 1), MovementKind::Receipt, 60, "PO-2023-210"),
                (date(2024, 1, 12), MovementKind::Sale, -15, "ORD-2024-001"),
            ],
        }),
        stock_item(StockSeed {
            id: "INV-002",
            sku: "LS-BRN-3S",
            name: "Leather Sofa",
            category: "Living Room",
            location: "Warehouse A",
            reserved: 4,
            reorder_point: 10,
            reorder_quantity: 20,
            max_stock: 40,
            unit_cost: 700,
            usage: 0.8,
            movements: vec![
                (date(2023, 12, 4), MovementKind::Receipt, 20, "PO-2023-214"),
                (date(2024, 1, 3), MovementKind::Sale, -8, "ORD-2024-003"),
            ],
        }),
        stock_item(StockSeed {
            id: "INV-003",
            sku: "EC-BLK-01",
            name: "Ergonomic Chair",
            category: "Office",
            location: "Warehouse B",
            reserved: 20,
            reorder_point: 40,
            reorder_quantity: 60,
            max_stock: 120,
            unit_cost: 180,
            usage: 6.0,
            movements: vec![
                (date(2023, 11, 15), MovementKind::Receipt, 100, "PO-2023-198"),
                (date(2024, 1, 8), MovementKind::Receipt, 80, "PO-2024-004"),
                (date(2024, 1, 18), MovementKind::Sale, -30, "ORD-2024-002"),
            ],
        }),
        stock_item(StockSeed {
            id: "INV-004",
            sku: "KB-WAL-01",
            name: "King Bed Frame",
            category: "Bedroom",
            location: "Warehouse B",
            reserved: 0,
            reorder_point: 5,
            reorder_quantity: 12,
            max_stock: 30,
            unit_cost: 850,
            usage: 0.5,
            movements: vec![
                (date(2023, 11, 10), MovementKind::Receipt, 10, "PO-2023-190"),
                (date(2023, 11, 18), MovementKind::Sale, -10, "ORD-2023-118"),
            ],
        }),
        stock_item(StockSeed {
            id: "INV-005",
            sku: "BS-OAK-05",
            name: "Bookshelf",
            category: "Office",
            location: "Showroom",
            reserved: 5,
            reorder_point: 15,
            reorder_quantity: 40,
            max_stock: 100,
            unit_cost: 150,
            usage: 2.0,
            movements: vec![(date(2024, 1, 2), MovementKind::Receipt, 60, "PO-2024-001")],
        }),
    ]
}

// =============================================================================
// Orders
// =============================================================================

fn order(
    number: &str,
    customer: &str,
    on: NaiveDate,
    status: OrderStatus,
    payment_state: PaymentState,
    lines: Vec<OrderLine>,
) -> SalesOrder {
    let total = lines.iter().map(|l| l.amount).sum();
    SalesOrder {
        id: number.to_string(),
        order_number: number.to_string(),
        customer_name: customer.to_string(),
        order_date: on,
        status,
        payment_state,
        lines,
        total,
    }
}

pub fn sales_orders() -> Vec<SalesOrder> {
    let table = |qty| OrderLine::new("OAK-DT-001", "Oak Dining Table", "Dining", qty, usd(2_500));
    let sofa = |qty| OrderLine::new("LS-BRN-3S", "Leather Sofa", "Living Room", qty, usd(1_250));
    let chair = |qty| OrderLine::new("EC-BLK-01", "Ergonomic Chair", "Office", qty, usd(500));
    let bed = |qty| OrderLine::new("KB-WAL-01", "King Bed Frame", "Bedroom", qty, usd(1_900));
    let shelf = |qty| OrderLine::new("BS-OAK-05", "Bookshelf", "Office", qty, usd(400));
    let desk = |qty| OrderLine::new("ED-MAH-02", "Executive Desk", "Office", qty, usd(1_800));

    vec![
        order("ORD-2023-118", "Urban Loft Designs", date(2023, 11, 18), OrderStatus::Delivered, PaymentState::Unpaid, vec![bed(8)]),
        order("ORD-2023-124", "Coastal Living Co", date(2023, 12, 5), OrderStatus::Delivered, PaymentState::Paid, vec![sofa(4), shelf(6)]),
        order("ORD-2023-131", "Modern Home Interiors", date(2023, 12, 18), OrderStatus::Cancelled, PaymentState::Refunded, vec![table(2)]),
        order("ORD-2024-001", "Modern Home Interiors", date(2024, 1, 12), OrderStatus::Delivered, PaymentState::Unpaid, vec![table(5)]),
        order("ORD-2024-002", "Elite Furnishings LLC", date(2024, 1, 18), OrderStatus::Shipped, PaymentState::Partial, vec![desk(10), chair(20)]),
        order("ORD-2024-003", "Coastal Living Co", date(2024, 1, 3), OrderStatus::Delivered, PaymentState::Paid, vec![sofa(7)]),
        order("ORD-2024-005", "Elite Office Solutions", date(2024, 1, 27), OrderStatus::Processing, PaymentState::Unpaid, vec![shelf(16)]),
        order("ORD-2024-006", "Urban Loft Designs", date(2024, 1, 30), OrderStatus::Pending, PaymentState::Unpaid, vec![bed(2)]),
    ]
}

// =============================================================================
// Pricing
// =============================================================================

pub fn price_list() -> Vec<PriceListItem> {
    let rows = [
        ("PRC-001", "OAK-DT-001", "Oak Dining Table", "Dining", 1_200, 2_500, PriceStatus::Active),
        ("PRC-002", "LS-BRN-3S", "Leather Sofa", "Living Room", 700, 1_250, PriceStatus::Active),
        ("PRC-003", "EC-BLK-01", "Ergonomic Chair", "Office", 180, 500, PriceStatus::Active),
        ("PRC-004", "KB-WAL-01", "King Bed Frame", "Bedroom", 850, 1_900, PriceStatus::Active),
        ("PRC-005", "BS-OAK-05", "Bookshelf", "Office", 150, 400, PriceStatus::Active),
        ("PRC-006", "ED-MAH-02", "Executive Desk", "Office", 1_350, 1_800, PriceStatus::Active),
        ("PRC-007", "AS-PIN-09", "Accent Stool (promo)", "Accessories", 40, 0, PriceStatus::Discontinued),
    ];
    rows.into_iter()
        .map(|(id, sku, name, category, cost, price, status)| PriceListItem {
            id: id.to_string(),
            sku: sku.to_string(),
            product_name: name.to_string(),
            category: category.to_string(),
            unit_cost: usd(cost),
            list_price: usd(price),
            effective_date: date(2024, 1, 1),
            status,
        })
        .collect()
}

// =============================================================================
// Tax
// =============================================================================

pub fn tax_filings() -> Vec<TaxFiling> {
    let filing = |id: &str,
                  period: &str,
                  jurisdiction: &str,
                  (start, end, due): (NaiveDate, NaiveDate, NaiveDate),
                  collected: i64,
                  input: i64,
                  status: FilingStatus,
                  filed: Option<NaiveDate>,
                  paid: Option<NaiveDate>| TaxFiling {
        id: id.to_string(),
        period: period.to_string(),
        jurisdiction: jurisdiction.to_string(),
        period_start: start,
        period_end: end,
        due_date: due,
        tax_collected: usd(collected),
        input_tax: usd(input),
        net_payable: usd(collected - input),
        status,
        filed_date: filed,
        paid_date: paid,
    };

    let q3_2023 = (date(2023, 7, 1), date(2023, 9, 30), date(2023, 10, 31));
    let q4_2023 = (date(2023, 10, 1), date(2023, 12, 31), date(2024, 1, 31));
    let q1_2024 = (date(2024, 1, 1), date(2024, 3, 31), date(2024, 4, 30));

    vec![
        filing("TAX-2023-Q3", "Q3 2023", "State", q3_2023, 6_200, 1_400, FilingStatus::Paid, Some(date(2023, 10, 20)), Some(date(2023, 10, 25))),
        filing("TAX-2023-Q4", "Q4 2023", "State", q4_2023, 8_500, 2_100, FilingStatus::Filed, Some(date(2024, 1, 25)), None),
        filing("TAX-2023-Q4-CITY", "Q4 2023", "City", q4_2023, 1_100, 0, FilingStatus::Overdue, None, None),
        filing("TAX-2024-Q1", "Q1 2024", "State", q1_2024, 3_400, 900, FilingStatus::Draft, None, None),
    ]
}
