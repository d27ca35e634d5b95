/// StockView CLI
///
/// Computes list views, statistics, dashboards and category resolutions
/// over JSON snapshots exported from the inventory service, and prints the
/// result as JSON.
///
/// ```bash
/// stockview view --records ventas.json --schema sales --search martillo --sort fecha --page 2
/// stockview dashboard inventory --products productos.json --sales ventas.json
/// ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use stockview::dashboard::top_categories;
use stockview::{
    compute_statistics, compute_view, inventory_dashboard, records_from_json, sales_dashboard,
    CategoryIndex, EngineConfig, Record, Resolution, SortKey, StatsSpec, ViewConfig, ViewSchema,
};

#[derive(Parser)]
#[command(
    name = "stockview",
    about = "List views and aggregates over inventory and sales snapshots",
    version
)]
struct Cli {
    /// JSON config file (defaults apply to missing keys)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, sort and paginate a record collection
    View {
        #[arg(long)]
        records: PathBuf,

        #[arg(long, value_enum)]
        schema: Collection,

        /// Free-text search over the collection's search fields
        #[arg(long, default_value = "")]
        search: String,

        /// Exact field filter, repeatable
        #[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// First day included (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day included (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// fecha, producto, nombre, categoria, cantidad, total, id or none
        #[arg(long, default_value = "fecha")]
        sort: String,

        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Overrides the configured page size
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Summary statistics of a whole collection
    Stats {
        #[arg(long)]
        records: PathBuf,

        #[arg(long, value_enum)]
        schema: Collection,
    },

    /// Dashboard aggregates
    Dashboard {
        #[command(subcommand)]
        kind: DashboardKind,
    },

    /// Resolve the category of every product
    Resolve {
        #[arg(long)]
        products: PathBuf,

        #[arg(long)]
        categories: PathBuf,
    },
}

#[derive(Subcommand)]
enum DashboardKind {
    Sales {
        #[arg(long)]
        sales: PathBuf,

        #[arg(long)]
        products: Option<PathBuf>,

        /// Day counted as "today" (defaults to the local date)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    Inventory {
        #[arg(long)]
        products: PathBuf,

        #[arg(long)]
        sales: Option<PathBuf>,
    },
    Categories {
        #[arg(long)]
        categories: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Collection {
    Sales,
    Products,
    Categories,
}

impl Collection {
    fn schema(self) -> ViewSchema {
        match self {
            Collection::Sales => ViewSchema::sales(),
            Collection::Products => ViewSchema::products(),
            Collection::Categories => ViewSchema::categories(),
        }
    }

    fn stats_spec(self) -> StatsSpec {
        match self {
            Collection::Sales => StatsSpec::sales(),
            Collection::Products => StatsSpec::products(),
            Collection::Categories => StatsSpec::new("cantidad_categoria_vendida"),
        }
    }
}

#[derive(Serialize)]
struct ProductResolution {
    producto_id: Option<i64>,
    nombre: String,
    resolution: Resolution,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(field, value)| (field.trim().to_string(), value.to_string()))
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))
}

fn read_records(path: &Path) -> stockview::Result<Vec<Record>> {
    let json = std::fs::read_to_string(path)?;
    let records = records_from_json(&json)?;
    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn read_optional(path: Option<&PathBuf>) -> stockview::Result<Vec<Record>> {
    match path {
        Some(path) => read_records(path),
        None => Ok(Vec::new()),
    }
}

fn print_json<T: Serialize>(value: &T) -> stockview::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> stockview::Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.apply_env()?;
    log::debug!("using {:?}", config);
    Ok(config)
}

fn run(cli: Cli) -> stockview::Result<()> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::View { records, schema, search, filters, from, to, sort, page, page_size } => {
            let records = read_records(&records)?;
            let sort: SortKey = sort.parse()?;
            let mut view_config = ViewConfig::new()
                .search(search)
                .date_range(from, to)
                .sort(sort)
                .page(page_size.unwrap_or(config.page_size), page);
            for (field, value) in filters {
                view_config = view_config.filter(field, value);
            }
            let view = compute_view(&records, &view_config, &schema.schema());
            if view.is_empty() && view.total_items > 0 {
                log::warn!(
                    "page {} is past the end, last page is {}",
                    view.page_number,
                    view.last_valid_page()
                );
            }
            print_json(&view)
        }
        Commands::Stats { records, schema } => {
            let records = read_records(&records)?;
            let all: Vec<&Record> = records.iter().collect();
            print_json(&compute_statistics(&all, &schema.stats_spec()))
        }
        Commands::Dashboard { kind } => match kind {
            DashboardKind::Sales { sales, products, today } => {
                let sales = read_records(&sales)?;
                let products = read_optional(products.as_ref())?;
                let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
                print_json(&sales_dashboard(&sales, &products, today, &config))
            }
            DashboardKind::Inventory { products, sales } => {
                let products = read_records(&products)?;
                let sales = read_optional(sales.as_ref())?;
                print_json(&inventory_dashboard(&products, &sales, &config))
            }
            DashboardKind::Categories { categories } => {
                let categories = read_records(&categories)?;
                print_json(&top_categories(&categories, &config))
            }
        },
        Commands::Resolve { products, categories } => {
            let products = read_records(&products)?;
            let index = CategoryIndex::from_records(&read_records(&categories)?);
            let resolved: Vec<ProductResolution> = products
                .iter()
                .map(|product| ProductResolution {
                    producto_id: product.id(),
                    nombre: product.display_text("nombre"),
                    resolution: index.resolve(product),
                })
                .collect();
            print_json(&resolved)
        }
    }
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
