/// StockView list views
///
/// A view is a read-only derivation of a record snapshot: the records that
/// pass the search and field filters, in the requested order, cut into one
/// page. Nothing is cached between calls; every call recomputes from the
/// snapshot it is given, so a view can never go stale against a newer
/// collection.
///
/// # Examples
///
/// ```
/// use stockview::{compute_view, Record, SortKey, ViewConfig, ViewSchema};
///
/// let sales: Vec<Record> = (1..=25)
///     .map(|i| Record::builder().id(i).field("producto", format!("P{}", i)).build())
///     .collect();
///
/// let config = ViewConfig::new().sort(SortKey::Unsorted).page(10, 3);
/// let view = compute_view(&sales, &config, &ViewSchema::sales());
///
/// assert_eq!(view.items.len(), 5);
/// assert_eq!(view.total_pages, 3);
/// assert_eq!(view.total_items, 25);
/// ```

use crate::error::Error;
use crate::record::{Record, ID_FIELD};
use crate::stats::UNCATEGORIZED;
use crate::value::{compare_names, FieldValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

/// Page size used when a configuration does not name one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    Ascending,
    /// Descending order (largest first)
    Descending,
}

/// The closed set of orderings offered by the list screens.
///
/// Serialized with the values the list screens put in their "order by"
/// selector (`fecha`, `producto`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Keep the order of the snapshot
    #[default]
    #[serde(rename = "none", alias = "")]
    Unsorted,
    /// Most recent first
    #[serde(rename = "fecha")]
    DateDesc,
    /// Product (or category) name, A to Z
    #[serde(rename = "producto", alias = "nombre")]
    NameAsc,
    /// Category name, A to Z
    #[serde(rename = "categoria")]
    CategoryAsc,
    /// Largest quantity first
    #[serde(rename = "cantidad")]
    QuantityDesc,
    /// Largest total value first
    #[serde(rename = "total")]
    TotalDesc,
    /// Newest identifier first
    #[serde(rename = "id")]
    IdDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Unsorted,
        SortKey::DateDesc,
        SortKey::NameAsc,
        SortKey::CategoryAsc,
        SortKey::QuantityDesc,
        SortKey::TotalDesc,
        SortKey::IdDesc,
    ];

    pub fn order(&self) -> SortOrder {
        match self {
            SortKey::Unsorted | SortKey::NameAsc | SortKey::CategoryAsc => SortOrder::Ascending,
            SortKey::DateDesc | SortKey::QuantityDesc | SortKey::TotalDesc | SortKey::IdDesc => {
                SortOrder::Descending
            }
        }
    }
}

impl FromStr for SortKey {
    type Err = Error;

    /// Parse the selector values used by the list screens.
    ///
    /// Accepts: "", "none", "fecha", "producto", "nombre", "categoria",
    /// "cantidad", "total", "id"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(SortKey::Unsorted),
            "fecha" => Ok(SortKey::DateDesc),
            "producto" | "nombre" => Ok(SortKey::NameAsc),
            "categoria" => Ok(SortKey::CategoryAsc),
            "cantidad" => Ok(SortKey::QuantityDesc),
            "total" => Ok(SortKey::TotalDesc),
            "id" => Ok(SortKey::IdDesc),
            _ => Err(Error::UnknownSortKey(s.to_string())),
        }
    }
}

/// How a sort field's values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKind {
    Text,
    Number,
    Date,
}

/// Which record fields back search, date filtering and each sort key.
///
/// This is the per-entity "field accessor" table; every list screen uses
/// the same engine with its own schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSchema {
    /// Fields matched by the free-text search
    pub search_fields: Vec<String>,
    /// Field holding the record date
    pub date_field: Option<String>,
    /// Field ordered by `SortKey::NameAsc`
    pub name_field: Option<String>,
    /// Field ordered by `SortKey::CategoryAsc`
    pub category_field: Option<String>,
    /// Field ordered by `SortKey::QuantityDesc`
    pub quantity_field: Option<String>,
    /// Field ordered by `SortKey::TotalDesc`
    pub total_field: Option<String>,
}

impl ViewSchema {
    pub fn new(search_fields: &[&str]) -> Self {
        ViewSchema {
            search_fields: search_fields.iter().map(|f| f.to_string()).collect(),
            date_field: None,
            name_field: None,
            category_field: None,
            quantity_field: None,
            total_field: None,
        }
    }

    pub fn with_date(mut self, field: &str) -> Self {
        self.date_field = Some(field.to_string());
        self
    }

    pub fn with_name(mut self, field: &str) -> Self {
        self.name_field = Some(field.to_string());
        self
    }

    pub fn with_category(mut self, field: &str) -> Self {
        self.category_field = Some(field.to_string());
        self
    }

    pub fn with_quantity(mut self, field: &str) -> Self {
        self.quantity_field = Some(field.to_string());
        self
    }

    pub fn with_total(mut self, field: &str) -> Self {
        self.total_field = Some(field.to_string());
        self
    }

    /// Sales list: search by product and category name
    pub fn sales() -> Self {
        ViewSchema::new(&["producto", "categoria"])
            .with_date("fecha")
            .with_name("producto")
            .with_category("categoria")
            .with_quantity("cantidad_vendida_producto")
            .with_total("cantidad_vendida_precio")
    }

    /// Inventory list: search by product name
    pub fn products() -> Self {
        ViewSchema::new(&["nombre"])
            .with_date("fecha_de_ingreso")
            .with_name("nombre")
            .with_category("categoria")
            .with_quantity("cantidad")
            .with_total("precio")
    }

    /// Category list: search by category name
    pub fn categories() -> Self {
        ViewSchema::new(&["nombre"])
            .with_name("nombre")
            .with_quantity("cantidad_categoria_vendida")
            .with_total("cantidad_categoria_vendida")
    }

    fn sort_field(&self, key: SortKey) -> Option<(&str, SortKind)> {
        let (field, kind) = match key {
            SortKey::Unsorted => return None,
            SortKey::DateDesc => (self.date_field.as_deref()?, SortKind::Date),
            SortKey::NameAsc => (self.name_field.as_deref()?, SortKind::Text),
            SortKey::CategoryAsc => (self.category_field.as_deref()?, SortKind::Text),
            SortKey::QuantityDesc => (self.quantity_field.as_deref()?, SortKind::Number),
            SortKey::TotalDesc => (self.total_field.as_deref()?, SortKind::Number),
            SortKey::IdDesc => (ID_FIELD, SortKind::Number),
        };
        Some((field, kind))
    }
}

/// Parameters of one derived view. Built by the presentation layer on
/// every interaction; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub search_text: String,
    /// Exact-match constraints; blank values impose no constraint
    pub field_filters: BTreeMap<String, FieldValue>,
    /// Inclusive lower date bound on the schema's date field
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound (the whole day is included)
    pub date_to: Option<NaiveDate>,
    pub sort_key: SortKey,
    pub page_size: usize,
    /// 1-based page number
    pub page_number: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            search_text: String::new(),
            field_filters: BTreeMap::new(),
            date_from: None,
            date_to: None,
            sort_key: SortKey::Unsorted,
            page_size: DEFAULT_PAGE_SIZE,
            page_number: 1,
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        ViewConfig::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.field_filters.insert(field.into(), value.into());
        self
    }

    pub fn date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort_key = key;
        self
    }

    pub fn page(mut self, page_size: usize, page_number: usize) -> Self {
        self.page_size = page_size;
        self.page_number = page_number;
        self
    }

    /// Page size with the zero case clamped to 1
    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }

    /// Page number with the zero case clamped to 1
    pub fn effective_page_number(&self) -> usize {
        self.page_number.max(1)
    }

    fn search_term(&self) -> Option<String> {
        let term = self.search_text.trim();
        if term.is_empty() {
            None
        } else {
            Some(term.to_lowercase())
        }
    }
}

/// One page of a filtered, sorted collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResult<'a> {
    /// Records on the requested page
    pub items: Vec<&'a Record>,
    /// Every record that passed the filters, in sorted order
    #[serde(skip)]
    pub filtered: Vec<&'a Record>,
    pub total_items: usize,
    /// `ceil(total_items / page_size)`; 0 for an empty result
    pub total_pages: usize,
    /// The page that was sliced (at least 1)
    pub page_number: usize,
    pub page_size: usize,
}

impl<'a> ViewResult<'a> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    /// Highest page a pager can show: `max(1, total_pages)`
    pub fn last_valid_page(&self) -> usize {
        self.total_pages.max(1)
    }

    /// Identifiers of the records on this page
    pub fn item_ids(&self) -> Vec<Option<i64>> {
        self.items.iter().map(|r| r.id()).collect()
    }
}

/// Derive a page of `collection` according to `config`.
///
/// Filter, then stable sort, then slice. Never fails: an empty collection,
/// no matches or a page past the end all produce an empty `items`.
pub fn compute_view<'a>(
    collection: &'a [Record],
    config: &ViewConfig,
    schema: &ViewSchema,
) -> ViewResult<'a> {
    let mut filtered = filter_records(collection, config, schema);
    sort_records(&mut filtered, config.sort_key, schema);

    let page_size = config.effective_page_size();
    let page_number = config.effective_page_number();
    let total_items = filtered.len();
    let total_pages = total_pages(total_items, page_size);
    let items = page_slice(&filtered, page_size, page_number).to_vec();

    log::trace!(
        "view: {} of {} records match, page {}/{} holds {}",
        total_items,
        collection.len(),
        page_number,
        total_pages,
        items.len()
    );

    ViewResult {
        items,
        filtered,
        total_items,
        total_pages,
        page_number,
        page_size,
    }
}

/// Records passing the search, field filters and date bounds, in input order
pub fn filter_records<'a>(
    collection: &'a [Record],
    config: &ViewConfig,
    schema: &ViewSchema,
) -> Vec<&'a Record> {
    let term = config.search_term();
    let filters: Vec<(&String, &FieldValue)> = config
        .field_filters
        .iter()
        .filter(|(_, value)| !value.is_blank())
        .collect();

    collection
        .iter()
        .filter(|record| {
            filters
                .iter()
                .all(|(field, expected)| field_matches(record, field, expected, schema))
        })
        .filter(|record| match &term {
            Some(term) => matches_search(record, term, schema),
            None => true,
        })
        .filter(|record| within_dates(record, config, schema))
        .collect()
}

/// Field filter test. A blank or missing category compares as
/// `UNCATEGORIZED`, the bucket statistics count it under.
fn field_matches(record: &Record, field: &str, expected: &FieldValue, schema: &ViewSchema) -> bool {
    match record.get(field).filter(|actual| !actual.is_blank()) {
        Some(actual) => actual.filter_eq(expected),
        None if schema.category_field.as_deref() == Some(field) => {
            expected.display_text() == UNCATEGORIZED
        }
        None => false,
    }
}

/// Distinct categories of `collection` in first-seen order, for filter
/// choices. Blank categories are listed as `UNCATEGORIZED`; empty when the
/// schema has no category field.
pub fn distinct_categories(collection: &[Record], schema: &ViewSchema) -> Vec<String> {
    let Some(field) = schema.category_field.as_deref() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    collection
        .iter()
        .map(|record| {
            let category = record.display_text(field);
            if category.is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                category
            }
        })
        .filter(|category| seen.insert(category.clone()))
        .collect()
}

/// `term` must already be lowercased
fn matches_search(record: &Record, term: &str, schema: &ViewSchema) -> bool {
    schema.search_fields.iter().any(|field| match record.get(field) {
        Some(value) if !value.is_null() => value.display_text().to_lowercase().contains(term),
        _ => false,
    })
}

fn within_dates(record: &Record, config: &ViewConfig, schema: &ViewSchema) -> bool {
    if config.date_from.is_none() && config.date_to.is_none() {
        return true;
    }
    let Some(date_field) = schema.date_field.as_deref() else {
        return true;
    };
    let Some(date) = record.get(date_field).and_then(parse_timestamp).map(|t| t.date()) else {
        return false;
    };
    config.date_from.map_or(true, |from| date >= from) && config.date_to.map_or(true, |to| date <= to)
}

/// Stable sort of `records` by `key`. Records missing the sort field go last.
pub fn sort_records(records: &mut [&Record], key: SortKey, schema: &ViewSchema) {
    if key == SortKey::Unsorted {
        return;
    }
    records.sort_by(|a, b| compare_records(a, b, key, schema));
}

/// Comparator behind `sort_records`
pub fn compare_records(a: &Record, b: &Record, key: SortKey, schema: &ViewSchema) -> Ordering {
    let Some((field, kind)) = schema.sort_field(key) else {
        return Ordering::Equal;
    };
    compare_values(a.get(field), b.get(field), kind, key.order())
}

fn compare_values(
    val_a: Option<&FieldValue>,
    val_b: Option<&FieldValue>,
    kind: SortKind,
    order: SortOrder,
) -> Ordering {
    let base_cmp = match kind {
        SortKind::Text => {
            let a = val_a.filter(|v| !v.is_blank()).map(FieldValue::display_text);
            let b = val_b.filter(|v| !v.is_blank()).map(FieldValue::display_text);
            match (a, b) {
                (Some(a), Some(b)) => compare_names(&a, &b),
                (a, b) => return nulls_last(a.is_none(), b.is_none()),
            }
        }
        SortKind::Number => match (val_a.and_then(FieldValue::as_f64), val_b.and_then(FieldValue::as_f64)) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (a, b) => return nulls_last(a.is_none(), b.is_none()),
        },
        SortKind::Date => match (val_a.and_then(parse_timestamp), val_b.and_then(parse_timestamp)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (a, b) => return nulls_last(a.is_none(), b.is_none()),
        },
    };

    match order {
        SortOrder::Ascending => base_cmp,
        SortOrder::Descending => base_cmp.reverse(),
    }
}

/// Ordering when at least one side is missing
fn nulls_last(a_missing: bool, b_missing: bool) -> Ordering {
    match (a_missing, b_missing) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// `ceil(total_items / page_size)`, with `page_size` 0 treated as 1
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// The `[start, start + page_size)` window of a 1-based page; empty when the
/// page lies past the end
pub fn page_slice<'s, T>(items: &'s [T], page_size: usize, page_number: usize) -> &'s [T] {
    let page_size = page_size.max(1);
    let start = (page_number.max(1) - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Parse the date and timestamp shapes the service emits:
/// RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS` and
/// plain `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(value: &FieldValue) -> Option<NaiveDateTime> {
    let text = value.as_text()?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
