/// Dashboards
///
/// The summary cards shown on the sales and inventory landing pages. Each
/// dashboard is computed from full snapshots in one pass per aggregate and
/// borrows the records it lists.

use crate::config::EngineConfig;
use crate::record::Record;
use crate::stats::{
    compute_statistics, latest, latest_out_of_stock, stock_report, top_by_field,
    top_categories_by_quantity, top_products_by_quantity, count_on_day, Ranked, StatsSpec,
};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesDashboard<'a> {
    pub total_sales: usize,
    pub revenue: f64,
    pub units_sold: f64,
    /// Sales dated on the day the dashboard was built for
    pub sales_today: usize,
    pub latest_sales: Vec<&'a Record>,
    /// Keyed by `producto_id`
    pub top_products: Vec<Ranked<String>>,
    /// Keyed by category name
    pub top_categories: Vec<Ranked<String>>,
}

/// Build the sales dashboard. `today` is passed in rather than read from
/// the clock so the result only depends on its inputs.
pub fn sales_dashboard<'a>(
    sales: &'a [Record],
    products: &[Record],
    today: NaiveDate,
    config: &EngineConfig,
) -> SalesDashboard<'a> {
    let all: Vec<&Record> = sales.iter().collect();
    let stats = compute_statistics(&all, &StatsSpec::sales());

    SalesDashboard {
        total_sales: stats.count,
        revenue: stats.sum,
        units_sold: stats.quantity,
        sales_today: count_on_day(sales, "fecha", today),
        latest_sales: latest(sales, "fecha", config.top_n),
        top_products: top_products_by_quantity(&all, config.top_n),
        top_categories: top_categories_by_quantity(&all, products, config.top_n),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryDashboard<'a> {
    pub total_products: usize,
    pub units_in_stock: f64,
    /// Most recently added products
    pub latest_products: Vec<&'a Record>,
    /// Best sellers by units sold, keyed by `producto_id`
    pub top_products: Vec<Ranked<String>>,
    pub out_of_stock_count: usize,
    pub low_stock_count: usize,
    /// Latest products with no stock left
    pub out_of_stock: Vec<&'a Record>,
    /// Products under the low-stock threshold, in input order
    pub low_stock: Vec<&'a Record>,
}

pub fn inventory_dashboard<'a>(
    products: &'a [Record],
    sales: &[Record],
    config: &EngineConfig,
) -> InventoryDashboard<'a> {
    let all: Vec<&Record> = products.iter().collect();
    let stats = compute_statistics(&all, &StatsSpec::products());
    let report = stock_report(products, "cantidad", config.low_stock_threshold);
    let sold: Vec<&Record> = sales.iter().collect();

    InventoryDashboard {
        total_products: stats.count,
        units_in_stock: stats.quantity,
        latest_products: latest(products, "fecha_de_ingreso", config.top_n),
        top_products: top_products_by_quantity(&sold, config.top_n),
        out_of_stock_count: report.out_of_stock.len(),
        low_stock_count: report.low_stock.len(),
        out_of_stock: latest_out_of_stock(products, "cantidad", config.top_n),
        low_stock: report.low_stock,
    }
}

/// Categories ranked by their `cantidad_categoria_vendida` counter
pub fn top_categories(categories: &[Record], config: &EngineConfig) -> Vec<Ranked<String>> {
    let all: Vec<&Record> = categories.iter().collect();
    top_by_field(&all, "nombre", "cantidad_categoria_vendida", config.top_n)
}
