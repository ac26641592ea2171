//! # Dashboard Commands
//!
//! One module per dashboard screen. Every command returns a serialisable
//! DTO or an [`ApiError`](crate::error::ApiError).
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (ScreenDto, shared list plumbing)
//! ├── accounting.rs  ◄─── Chart of accounts, trial balance, journal
//! ├── billing.rs     ◄─── Invoices, payments, aging, statements
//! ├── credit.rs      ◄─── Credit accounts and charges
//! ├── inventory.rs   ◄─── Stock levels, alerts, movements
//! ├── orders.rs      ◄─── Sales orders
//! ├── pricing.rs     ◄─── Price list and margins
//! ├── tax.rs         ◄─── Tax filings
//! ├── analytics.rs   ◄─── Sales analytics
//! └── reports.rs     ◄─── Financial reports
//! ```
//!
//! ## How a List Screen Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_invoices(store, config, query)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.invoices.all()          ← every record, insertion order         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  screen::<Invoice, _>(items, query, config)                            │
//! │  ├── validate_query            ← unknown filter/sort → 400             │
//! │  ├── ListSpec::view            ← filter, sort, aggregate, paginate     │
//! │  ├── tiles                     ← aggregates + display text             │
//! │  └── filters                   ← "All" + distinct labels per dropdown  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ScreenDto<Row>  ──► JSON                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod accounting;
pub mod analytics;
pub mod billing;
pub mod credit;
pub mod inventory;
pub mod orders;
pub mod pricing;
pub mod reports;
pub mod tax;

use oakline_core::list::PageRequest;
use oakline_core::{AggregateValue, ListQuery, Record, ALL_SENTINEL};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::DashboardConfig;

/// One summary tile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileDto {
    pub name: String,
    pub value: AggregateValue,
    /// Pre-formatted for display, e.g. "$42,996.00" or "12.50%".
    pub display: String,
}

/// One dropdown and its options, `"All"` first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDto {
    pub name: String,
    pub options: Vec<String>,
}

/// A rendered list screen: one page of rows plus tiles and dropdowns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenDto<R> {
    pub rows: Vec<R>,
    pub total_items: usize,
    pub matched: usize,
    pub page: usize,
    pub per_page: usize,
    pub page_count: usize,
    pub tiles: Vec<TileDto>,
    pub filters: Vec<FilterDto>,
}

/// Runs `query` over `items` with the record's list spec and shapes the
/// result for the screen. Rows are converted with `R::from`.
pub(crate) fn screen<T, R>(
    items: Vec<T>,
    query: &ListQuery,
    config: &DashboardConfig,
) -> Result<ScreenDto<R>, ApiError>
where
    T: Record,
    R: From<T>,
{
    let spec = T::list_spec();
    spec.validate_query(query)?;

    let mut query = query.clone();
    query.page.get_or_insert(PageRequest {
        page: 1,
        per_page: config.page_size,
    });

    let page = spec.view(&items, &query);

    let filters = spec
        .category_names()
        .into_iter()
        .map(|name| FilterDto {
            name: name.to_string(),
            options: std::iter::once(ALL_SENTINEL.to_string())
                .chain(spec.category_options(name, &items))
                .collect(),
        })
        .collect();

    let tiles = page
        .aggregates
        .iter()
        .map(|(name, value)| TileDto {
            name: name.clone(),
            value: *value,
            display: config.format_aggregate(value),
        })
        .collect();

    Ok(ScreenDto {
        rows: page.items.into_iter().map(R::from).collect(),
        total_items: page.total_items,
        matched: page.matched,
        page: page.page,
        per_page: page.per_page,
        page_count: page.page_count,
        tiles,
        filters,
    })
}

impl<R> ScreenDto<R> {
    /// Looks up a tile by aggregate name.
    pub fn tile(&self, name: &str) -> Option<&TileDto> {
        self.tiles.iter().find(|t| t.name == name)
    }
}
