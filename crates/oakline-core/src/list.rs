//! # Filterable Aggregated List
//!
//! The one pattern every dashboard screen shares: a collection of records,
//! a search box, a few dropdown filters, a sortable table, summary tiles and
//! a detail modal for one selected row.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Dashboard Screen                                │
//! │                                                                         │
//! │  items: &[T] (fixture or repository)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply_filters(query)                                                  │
//! │  ├── search: case-insensitive substring over every text field (OR)     │
//! │  └── categories: label == selection, or "All"          (AND)          │
//! │       │                                                                 │
//! │       ├──────────────────────────┐                                     │
//! │       ▼                          ▼                                      │
//! │  sort(key, direction)      compute_aggregates(all, filtered)           │
//! │       │                          │  scope Filtered → filtered rows     │
//! │       ▼                          │  scope All      → every row         │
//! │  paginate(page, per_page)        │                                     │
//! │       │                          │                                      │
//! │       └──────────┬───────────────┘                                     │
//! │                  ▼                                                      │
//! │             ListPage<T>  ──► table rows + summary tiles                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Filtering, sorting and aggregation are total: they never fail and never
//! mutate the source slice. Running the same query twice yields the same
//! page. Empty result sets produce zero-valued aggregates.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Rate};
use crate::record::Record;
use crate::{ALL_SENTINEL, DEFAULT_PAGE_SIZE, MAX_SEARCH_LENGTH};

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 500;

// =============================================================================
// Query
// =============================================================================

/// A categorical dropdown value: either the `"All"` sentinel or one label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategorySelection {
    #[default]
    All,
    Only(String),
}

impl CategorySelection {
    /// Selects a single label.
    pub fn only(label: impl Into<String>) -> Self {
        CategorySelection::from(label.into())
    }

    /// Returns true when this selection filters nothing.
    pub fn is_all(&self) -> bool {
        matches!(self, CategorySelection::All)
    }
}

impl From<String> for CategorySelection {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
            CategorySelection::All
        } else {
            CategorySelection::Only(trimmed.to_string())
        }
    }
}

impl From<CategorySelection> for String {
    fn from(value: CategorySelection) -> Self {
        match value {
            CategorySelection::All => ALL_SENTINEL.to_string(),
            CategorySelection::Only(label) => label,
        }
    }
}

/// Sort direction for a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Requested sort: a named key and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Everything a screen's inputs can express: search text, dropdowns, the
/// sorted column and the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub categories: BTreeMap<String, CategorySelection>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub page: Option<PageRequest>,
}

impl ListQuery {
    /// A query with only a search term.
    pub fn search(term: impl Into<String>) -> Self {
        ListQuery {
            search: term.into(),
            ..ListQuery::default()
        }
    }

    /// Adds or replaces a categorical filter.
    pub fn with_category(mut self, name: impl Into<String>, selection: CategorySelection) -> Self {
        self.categories.insert(name.into(), selection);
        self
    }

    /// Sets the sort column.
    pub fn sorted_by(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec {
            key: key.into(),
            direction,
        });
        self
    }

    /// Sets the requested page.
    pub fn paged(mut self, page: usize, per_page: usize) -> Self {
        self.page = Some(PageRequest { page, per_page });
        self
    }
}

// =============================================================================
// Aggregate Values
// =============================================================================

/// A summary tile value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AggregateValue {
    Money(Money),
    Count(u64),
    Rate(Rate),
    Quantity(i64),
    Number(f64),
}

impl AggregateValue {
    /// Returns the money value, if this is a money aggregate.
    pub fn as_money(&self) -> Option<Money> {
        match self {
            AggregateValue::Money(m) => Some(*m),
            _ => None,
        }
    }

    /// Returns the count, if this is a count aggregate.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            AggregateValue::Count(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the rate, if this is a rate aggregate.
    pub fn as_rate(&self) -> Option<Rate> {
        match self {
            AggregateValue::Rate(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the quantity, if this is a quantity aggregate.
    pub fn as_quantity(&self) -> Option<i64> {
        match self {
            AggregateValue::Quantity(q) => Some(*q),
            _ => None,
        }
    }
}

/// Which rows an aggregation reduces over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateScope {
    /// Rows that survive the current filters.
    Filtered,
    /// Every row, regardless of filters (e.g. header KPI tiles).
    All,
}

// =============================================================================
// Aggregation Helpers
// =============================================================================

/// Sums a money field.
pub fn sum_money<T>(items: &[&T], field: impl Fn(&T) -> Money) -> Money {
    items.iter().map(|item| field(item)).sum()
}

/// Sums an integer quantity field.
pub fn sum_quantity<T>(items: &[&T], field: impl Fn(&T) -> i64) -> i64 {
    items.iter().map(|item| field(item)).sum()
}

/// Counts rows matching a predicate.
pub fn count_where<T>(items: &[&T], predicate: impl Fn(&T) -> bool) -> u64 {
    items.iter().filter(|item| predicate(item)).count() as u64
}

/// Averages a money field; zero for an empty set.
pub fn average_money<T>(items: &[&T], field: impl Fn(&T) -> Money) -> Money {
    sum_money(items, field).average_over(items.len())
}

/// Averages the defined values of a rate field; zero when none are defined.
pub fn average_rate<T>(items: &[&T], field: impl Fn(&T) -> Option<Rate>) -> Rate {
    let rates: Vec<i64> = items.iter().filter_map(|item| field(item)).map(|r| r.bps()).collect();
    if rates.is_empty() {
        return Rate::zero();
    }
    Rate::ratio_of(rates.iter().sum::<i64>(), rates.len() as i64 * 10000).unwrap_or_default()
}

/// `part / whole` as a rate; zero when `whole` is zero.
pub fn rate_or_zero(part: Money, whole: Money) -> Rate {
    Rate::ratio(part, whole).unwrap_or_default()
}

// =============================================================================
// List Spec
// =============================================================================

type TextAccessor<T> = fn(&T) -> &str;
type CategoryAccessor<T> = fn(&T) -> &str;
type Comparator<T> = fn(&T, &T) -> Ordering;
type Reducer<T> = fn(&[&T]) -> AggregateValue;

struct CategoryFilter<T> {
    name: &'static str,
    accessor: CategoryAccessor<T>,
}

struct SortKey<T> {
    name: &'static str,
    compare: Comparator<T>,
}

struct Aggregation<T> {
    name: &'static str,
    scope: AggregateScope,
    reduce: Reducer<T>,
}

/// Describes how one record type is searched, filtered, sorted and
/// summarised.
///
/// ## Example
/// ```rust
/// use oakline_core::list::{AggregateScope, AggregateValue, ListQuery, ListSpec, sum_money};
/// use oakline_core::money::Money;
///
/// struct Row { name: String, region: &'static str, amount: Money }
///
/// let spec = ListSpec::<Row>::new()
///     .search_field("name", |r| r.name.as_str())
///     .category("region", |r| r.region)
///     .aggregate("total", AggregateScope::Filtered, |rows| {
///         AggregateValue::Money(sum_money(rows, |r| r.amount))
///     });
///
/// let rows = vec![
///     Row { name: "Oak Table".into(), region: "North", amount: Money::from_major(10) },
///     Row { name: "Pine Chair".into(), region: "South", amount: Money::from_major(5) },
/// ];
/// let hits = spec.apply_filters(&rows, &ListQuery::search("oak"));
/// assert_eq!(hits.len(), 1);
/// ```
pub struct ListSpec<T> {
    text_fields: Vec<(&'static str, TextAccessor<T>)>,
    categories: Vec<CategoryFilter<T>>,
    sort_keys: Vec<SortKey<T>>,
    aggregations: Vec<Aggregation<T>>,
}

impl<T> Default for ListSpec<T> {
    fn default() -> Self {
        ListSpec {
            text_fields: Vec::new(),
            categories: Vec::new(),
            sort_keys: Vec::new(),
            aggregations: Vec::new(),
        }
    }
}

impl<T> ListSpec<T> {
    /// Creates an empty spec that matches everything and aggregates nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text field covered by the search box.
    pub fn search_field(mut self, name: &'static str, accessor: TextAccessor<T>) -> Self {
        self.text_fields.push((name, accessor));
        self
    }

    /// Adds a categorical dropdown filter.
    pub fn category(mut self, name: &'static str, accessor: CategoryAccessor<T>) -> Self {
        self.categories.push(CategoryFilter { name, accessor });
        self
    }

    /// Adds a sortable column.
    pub fn sort_key(mut self, name: &'static str, compare: Comparator<T>) -> Self {
        self.sort_keys.push(SortKey { name, compare });
        self
    }

    /// Adds a summary aggregation.
    pub fn aggregate(mut self, name: &'static str, scope: AggregateScope, reduce: Reducer<T>) -> Self {
        self.aggregations.push(Aggregation { name, scope, reduce });
        self
    }

    /// Names of the searchable text fields.
    pub fn search_field_names(&self) -> Vec<&'static str> {
        self.text_fields.iter().map(|(name, _)| *name).collect()
    }

    /// Names of the categorical filters.
    pub fn category_names(&self) -> Vec<&'static str> {
        self.categories.iter().map(|c| c.name).collect()
    }

    /// Names of the sort keys.
    pub fn sort_key_names(&self) -> Vec<&'static str> {
        self.sort_keys.iter().map(|s| s.name).collect()
    }

    /// Distinct labels a category takes across `items`, in first-seen order.
    ///
    /// This is what populates a dropdown, after the leading `"All"`.
    pub fn category_options(&self, name: &str, items: &[T]) -> Vec<String> {
        let Some(filter) = self.categories.iter().find(|c| c.name == name) else {
            return Vec::new();
        };
        let mut options: Vec<String> = Vec::new();
        for item in items {
            let label = (filter.accessor)(item);
            if !options.iter().any(|o| o == label) {
                options.push(label.to_string());
            }
        }
        options
    }

    /// Checks a query against this spec's filter and sort names.
    ///
    /// `apply_filters` silently ignores unknown names; callers that accept
    /// queries from outside validate first.
    pub fn validate_query(&self, query: &ListQuery) -> CoreResult<()> {
        if query.search.chars().count() > MAX_SEARCH_LENGTH {
            return Err(ValidationError::TooLong {
                field: "search".to_string(),
                max: MAX_SEARCH_LENGTH,
            }
            .into());
        }

        for name in query.categories.keys() {
            if !self.categories.iter().any(|c| c.name == name) {
                return Err(ValidationError::NotAllowed {
                    field: "filter".to_string(),
                    allowed: self.category_names().iter().map(|n| n.to_string()).collect(),
                }
                .into());
            }
        }

        if let Some(sort) = &query.sort {
            if !self.sort_keys.iter().any(|s| s.name == sort.key) {
                return Err(ValidationError::NotAllowed {
                    field: "sort".to_string(),
                    allowed: self.sort_key_names().iter().map(|n| n.to_string()).collect(),
                }
                .into());
            }
        }

        if let Some(page) = query.page {
            if page.page == 0 {
                return Err(ValidationError::MustBePositive {
                    field: "page".to_string(),
                }
                .into());
            }
            if page.per_page == 0 || page.per_page > MAX_PAGE_SIZE {
                return Err(ValidationError::OutOfRange {
                    field: "perPage".to_string(),
                    min: 1,
                    max: MAX_PAGE_SIZE as i64,
                }
                .into());
            }
        }

        Ok(())
    }

    /// Returns the items matching every active predicate, in source order.
    pub fn apply_filters<'a>(&self, items: &'a [T], query: &ListQuery) -> Vec<&'a T> {
        let needle = query.search.trim().to_lowercase();

        let active: Vec<(&CategoryFilter<T>, &str)> = query
            .categories
            .iter()
            .filter_map(|(name, selection)| match selection {
                CategorySelection::All => None,
                CategorySelection::Only(label) => self
                    .categories
                    .iter()
                    .find(|c| c.name == name)
                    .map(|filter| (filter, label.as_str())),
            })
            .collect();

        items
            .iter()
            .filter(|item| self.matches_search(item, &needle))
            .filter(|item| {
                active
                    .iter()
                    .all(|(filter, label)| (filter.accessor)(item) == *label)
            })
            .collect()
    }

    fn matches_search(&self, item: &T, needle: &str) -> bool {
        if needle.is_empty() || self.text_fields.is_empty() {
            return true;
        }
        self.text_fields
            .iter()
            .any(|(_, accessor)| accessor(item).to_lowercase().contains(needle))
    }

    /// Sorts rows in place by the requested key. Stable, so ties keep
    /// source order. Unknown keys leave the order unchanged.
    pub fn sort(&self, rows: &mut [&T], sort: Option<&SortSpec>) {
        let Some(sort) = sort else {
            return;
        };
        let Some(key) = self.sort_keys.iter().find(|k| k.name == sort.key) else {
            return;
        };
        match sort.direction {
            SortDirection::Asc => rows.sort_by(|a, b| (key.compare)(a, b)),
            SortDirection::Desc => rows.sort_by(|a, b| (key.compare)(a, b).reverse()),
        }
    }

    /// Runs every aggregation over its scope.
    pub fn compute_aggregates(&self, all: &[T], filtered: &[&T]) -> BTreeMap<String, AggregateValue> {
        let everything: Vec<&T> = all.iter().collect();
        self.aggregations
            .iter()
            .map(|agg| {
                let rows = match agg.scope {
                    AggregateScope::Filtered => filtered,
                    AggregateScope::All => everything.as_slice(),
                };
                (agg.name.to_string(), (agg.reduce)(rows))
            })
            .collect()
    }

    /// Filter, sort, aggregate and paginate in one pass.
    pub fn view(&self, items: &[T], query: &ListQuery) -> ListPage<T>
    where
        T: Clone,
    {
        let mut rows = self.apply_filters(items, query);
        self.sort(&mut rows, query.sort.as_ref());
        let aggregates = self.compute_aggregates(items, &rows);

        let request = query.page.unwrap_or_default();
        let per_page = request.per_page.clamp(1, MAX_PAGE_SIZE);
        let page = request.page.max(1);
        let matched = rows.len();
        let page_count = matched.div_ceil(per_page).max(1);

        let page_items = rows
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();

        ListPage {
            items: page_items,
            total_items: items.len(),
            matched,
            page,
            per_page,
            page_count,
            aggregates,
        }
    }

    /// Filter and sort, returning owned rows without pagination.
    pub fn filter_owned(&self, items: Vec<T>, query: &ListQuery) -> Vec<T>
    where
        T: Clone,
    {
        let mut rows = self.apply_filters(&items, query);
        self.sort(&mut rows, query.sort.as_ref());
        rows.into_iter().cloned().collect()
    }
}

// =============================================================================
// List Page
// =============================================================================

/// One rendered page of a dashboard table plus its summary tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    pub items: Vec<T>,
    /// Rows in the unfiltered collection.
    pub total_items: usize,
    /// Rows that matched the filters, across all pages.
    pub matched: usize,
    pub page: usize,
    pub per_page: usize,
    pub page_count: usize,
    pub aggregates: BTreeMap<String, AggregateValue>,
}

impl<T> ListPage<T> {
    /// Looks up an aggregate by name.
    pub fn aggregate(&self, name: &str) -> Option<AggregateValue> {
        self.aggregates.get(name).copied()
    }
}

// =============================================================================
// Selection
// =============================================================================

/// The detail-overlay state of one list: at most one selected record.
///
/// ```text
///   closed ──select(id)──► open(id) ──select(other)──► open(other)
///     ▲                       │
///     └────────clear()────────┘
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    selected: Option<String>,
}

impl Selection {
    /// A closed overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the overlay on `id`, replacing any previous selection.
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    /// Closes the overlay.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Resolves the selected id against the current records.
    ///
    /// Returns `Ok(None)` while closed and `RecordNotFound` if the selected
    /// record has disappeared from the collection.
    pub fn resolve<'a, T: Record>(&self, items: &'a [T]) -> CoreResult<Option<&'a T>> {
        let Some(id) = self.selected.as_deref() else {
            return Ok(None);
        };
        items
            .iter()
            .find(|item| item.id() == id)
            .map(Some)
            .ok_or_else(|| CoreError::not_found(T::KIND, id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
