/// StockView - List Views and Aggregates for Inventory and Sales Records
///
/// Derives what the inventory back office shows from plain record snapshots:
/// searchable, sortable, paginated list views, summary statistics and
/// dashboards, stock classification, and the category resolution used when
/// a sale is entered. Everything is recomputed from the snapshot on each
/// call; the crate holds no state of its own.

pub mod error;
pub mod value;
pub mod record;
pub mod view;
pub mod stats;
pub mod category;
pub mod validation;
pub mod sale;
pub mod changeset;
pub mod config;
pub mod dashboard;

pub use error::{Error, Result};
pub use value::FieldValue;
pub use record::{records_from_json, records_from_value, Record, RecordBuilder, RecordId};
pub use view::{compute_view, distinct_categories, SortKey, SortOrder, ViewConfig, ViewResult, ViewSchema};
pub use stats::{
    classify_stock, compute_statistics, stock_quantity, stock_report, top_n, Ranked, Statistics,
    StatsSpec, StockLevel, StockReport,
};
pub use category::{resolve_category_id, CategoryIndex, Resolution};
pub use validation::{FormValidator, FormValues, Rule, ValidationErrors};
pub use sale::{line_total, SaleDraft, SalePayload};
pub use changeset::{apply_changes, Changeset, RecordChange};
pub use config::EngineConfig;
pub use dashboard::{inventory_dashboard, sales_dashboard, InventoryDashboard, SalesDashboard};
