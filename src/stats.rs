/// Aggregate statistics over record collections
///
/// Sums, counts, top-N rankings and stock classification. All functions
/// take the filtered (not paginated) records they should summarize and
/// recompute on every call.

use crate::record::Record;
use crate::view::{sort_records, SortKey, ViewSchema};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Stock at or above this level is considered healthy
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Bucket for records whose grouping key is blank
pub const UNCATEGORIZED: &str = "General";

/// Which fields `compute_statistics` reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSpec {
    /// Field summed into `Statistics::sum`
    pub sum_field: String,
    /// Field summed into `Statistics::quantity`
    pub quantity_field: Option<String>,
    /// Field counted into `Statistics::counts_by_key`
    pub key_field: Option<String>,
}

impl StatsSpec {
    pub fn new(sum_field: &str) -> Self {
        StatsSpec {
            sum_field: sum_field.to_string(),
            quantity_field: None,
            key_field: None,
        }
    }

    pub fn with_quantity(mut self, field: &str) -> Self {
        self.quantity_field = Some(field.to_string());
        self
    }

    pub fn with_key(mut self, field: &str) -> Self {
        self.key_field = Some(field.to_string());
        self
    }

    /// Revenue, units sold and sales per category
    pub fn sales() -> Self {
        StatsSpec::new("cantidad_vendida_precio")
            .with_quantity("cantidad_vendida_producto")
            .with_key("categoria")
    }

    /// Price sum, units in stock and products per category
    pub fn products() -> Self {
        StatsSpec::new("precio")
            .with_quantity("cantidad")
            .with_key("categoria")
    }
}

/// Summary of a filtered collection
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub sum: f64,
    pub quantity: f64,
    pub counts_by_key: BTreeMap<String, usize>,
}

impl Statistics {
    /// Average of the summed field, `None` for an empty collection
    pub fn mean(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.sum / self.count as f64)
        } else {
            None
        }
    }
}

/// Summarize `records`. Missing or non-numeric values count as zero.
pub fn compute_statistics(records: &[&Record], spec: &StatsSpec) -> Statistics {
    let mut stats = Statistics {
        count: records.len(),
        ..Statistics::default()
    };

    for record in records {
        stats.sum += record.number(&spec.sum_field);
        if let Some(field) = &spec.quantity_field {
            stats.quantity += record.number(field);
        }
        if let Some(field) = &spec.key_field {
            *stats.counts_by_key.entry(group_key(record, field)).or_insert(0) += 1;
        }
    }

    stats
}

/// Grouping key of a record; blank keys fall into `UNCATEGORIZED`
fn group_key(record: &Record, field: &str) -> String {
    let key = record.display_text(field);
    if key.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        key
    }
}

/// One group of a top-N ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<K> {
    pub key: K,
    pub total: f64,
}

/// Group `items` by `key_fn`, sum `value_fn` per group and return the `n`
/// largest groups, largest first.
///
/// Groups with equal totals keep the order in which their key was first
/// seen. Asking for more groups than exist returns all of them. NaN and
/// infinite values add nothing to their group.
///
/// # Examples
///
/// ```
/// use stockview::top_n;
///
/// let sales = [(1, 2.0), (2, 5.0), (1, 1.0)];
/// let top = top_n(sales.iter(), |s| s.0, |s| s.1, 1);
///
/// assert_eq!(top.len(), 1);
/// assert_eq!(top[0].key, 2);
/// assert_eq!(top[0].total, 5.0);
/// ```
pub fn top_n<T, K, I, KF, VF>(items: I, key_fn: KF, value_fn: VF, n: usize) -> Vec<Ranked<K>>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
    KF: Fn(&T) -> K,
    VF: Fn(&T) -> f64,
{
    let mut groups: Vec<Ranked<K>> = Vec::new();
    let mut positions: HashMap<K, usize> = HashMap::new();

    for item in items {
        let key = key_fn(&item);
        // NaN and infinities count as nothing
        let value = Some(value_fn(&item)).filter(|v| v.is_finite()).unwrap_or(0.0);
        match positions.get(&key) {
            Some(&pos) => groups[pos].total += value,
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(Ranked { key, total: value });
            }
        }
    }

    // sort_by is stable: equal totals stay in first-seen order
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    groups.truncate(n);
    groups
}

/// Top-N over two record fields. Records with a blank key are skipped.
pub fn top_by_field(records: &[&Record], key_field: &str, value_field: &str, n: usize) -> Vec<Ranked<String>> {
    top_n(
        records
            .iter()
            .copied()
            .filter(|r| r.get(key_field).is_some_and(|v| !v.is_blank())),
        |r| r.display_text(key_field),
        |r| r.number(value_field),
        n,
    )
}

/// Best-selling products by units sold, keyed by `producto_id`
pub fn top_products_by_quantity(sales: &[&Record], n: usize) -> Vec<Ranked<String>> {
    top_by_field(sales, "producto_id", "cantidad_vendida_producto", n)
}

/// Best-selling categories by units sold.
///
/// A sale's category is its own `categoria` when present, otherwise the
/// `categoria` of the product it references; unknown ones count as
/// `UNCATEGORIZED`.
pub fn top_categories_by_quantity(sales: &[&Record], products: &[Record], n: usize) -> Vec<Ranked<String>> {
    let product_categories: HashMap<i64, String> = products
        .iter()
        .filter_map(|p| {
            let category = p.display_text("categoria");
            match (p.id(), category.is_empty()) {
                (Some(id), false) => Some((id, category)),
                _ => None,
            }
        })
        .collect();

    top_n(
        sales.iter().copied(),
        |sale| {
            let own = sale.display_text("categoria");
            if !own.is_empty() {
                return own;
            }
            sale.get("producto_id")
                .and_then(|v| v.as_i64())
                .and_then(|id| product_categories.get(&id).cloned())
                .unwrap_or_else(|| UNCATEGORIZED.to_string())
        },
        |sale| sale.number("cantidad_vendida_producto"),
        n,
    )
}

/// Stock health of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// Nothing left ("sin stock")
    Critical,
    /// Below the threshold ("bajo stock")
    Low,
    Ok,
}

/// Classify a stock quantity. Zero and negative quantities are critical.
pub fn classify_stock(quantity: i64, threshold: i64) -> StockLevel {
    if quantity <= 0 {
        StockLevel::Critical
    } else if quantity < threshold {
        StockLevel::Low
    } else {
        StockLevel::Ok
    }
}

/// Stock quantity of a product record, rounded up so a fraction of a unit
/// is not "out of stock"; missing counts as zero
pub fn stock_quantity(product: &Record, quantity_field: &str) -> i64 {
    product.number(quantity_field).ceil() as i64
}

/// Products partitioned by stock level, each list in input order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StockReport<'a> {
    pub out_of_stock: Vec<&'a Record>,
    pub low_stock: Vec<&'a Record>,
    pub ok: Vec<&'a Record>,
}

pub fn stock_report<'a>(products: &'a [Record], quantity_field: &str, threshold: i64) -> StockReport<'a> {
    let mut report = StockReport::default();
    for product in products {
        match classify_stock(stock_quantity(product, quantity_field), threshold) {
            StockLevel::Critical => report.out_of_stock.push(product),
            StockLevel::Low => report.low_stock.push(product),
            StockLevel::Ok => report.ok.push(product),
        }
    }
    report
}

/// The `n` most recently added products with no stock (highest id first)
pub fn latest_out_of_stock<'a>(products: &'a [Record], quantity_field: &str, n: usize) -> Vec<&'a Record> {
    let mut empty: Vec<&Record> = products
        .iter()
        .filter(|p| stock_quantity(p, quantity_field) <= 0)
        .collect();
    sort_records(&mut empty, SortKey::IdDesc, &ViewSchema::new(&[]));
    empty.truncate(n);
    empty
}

/// The `n` most recent records by `date_field`
pub fn latest<'a>(records: &'a [Record], date_field: &str, n: usize) -> Vec<&'a Record> {
    let mut all: Vec<&Record> = records.iter().collect();
    sort_records(&mut all, SortKey::DateDesc, &ViewSchema::new(&[]).with_date(date_field));
    all.truncate(n);
    all
}

/// Number of records dated on `day`
pub fn count_on_day(records: &[Record], date_field: &str, day: NaiveDate) -> usize {
    records
        .iter()
        .filter_map(|r| r.get(date_field).and_then(crate::view::parse_timestamp))
        .filter(|ts| ts.date() == day)
        .count()
}
