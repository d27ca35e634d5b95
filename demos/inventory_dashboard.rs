/// Inventory Dashboard Example
///
/// This example demonstrates:
/// - Stock classification with a configurable threshold
/// - The inventory and sales dashboards
/// - Overriding configuration from the environment

use chrono::NaiveDate;
use stockview::{
    classify_stock, inventory_dashboard, records_from_json, sales_dashboard, stock_quantity,
    EngineConfig,
};

const PRODUCTS: &str = r#"[
    {"id": 1, "nombre": "Martillo", "categoria": "Herramientas", "cantidad": 12, "precio": 12.5, "fecha_de_ingreso": "2026-01-03"},
    {"id": 2, "nombre": "Lámpara", "categoria": "Hogar", "cantidad": 3, "precio": 19.99, "fecha_de_ingreso": "2026-01-20"},
    {"id": 3, "nombre": "Manguera", "categoria": "Jardín", "cantidad": 0, "precio": 30, "fecha_de_ingreso": "2026-02-11"},
    {"id": 4, "nombre": "Taladro", "categoria": "Herramientas", "cantidad": 1, "precio": 35.5, "fecha_de_ingreso": "2026-02-14"},
    {"id": 5, "nombre": "Escoba", "categoria": "Hogar", "cantidad": 0, "precio": 5.5, "fecha_de_ingreso": "2026-02-28"}
]"#;

const SALES: &str = r#"[
    {"id": 1, "producto_id": 1, "cantidad_vendida_producto": 2, "cantidad_vendida_precio": 25.0, "fecha": "2026-03-01T10:15:00Z"},
    {"id": 2, "producto_id": 3, "cantidad_vendida_producto": 5, "cantidad_vendida_precio": 150.0, "fecha": "2026-03-02T11:00:00Z"},
    {"id": 3, "producto_id": 1, "cantidad_vendida_producto": 4, "cantidad_vendida_precio": 50.0, "fecha": "2026-03-02T16:20:00Z"}
]"#;

fn main() -> stockview::Result<()> {
    println!("=== StockView Inventory Dashboard Example ===\n");

    let products = records_from_json(PRODUCTS)?;
    let sales = records_from_json(SALES)?;

    // Try STOCKVIEW_LOW_STOCK_THRESHOLD=2 to change the classification
    let mut config = EngineConfig::default();
    config.apply_env()?;
    println!("Config: threshold {}, top {}\n", config.low_stock_threshold, config.top_n);

    // 1. Stock level per product
    println!("1. Stock levels:");
    for product in &products {
        let quantity = stock_quantity(product, "cantidad");
        println!(
            "   {:<10} {:>3}  {:?}",
            product.display_text("nombre"),
            quantity,
            classify_stock(quantity, config.low_stock_threshold)
        );
    }

    // 2. Inventory dashboard
    let inventory = inventory_dashboard(&products, &sales, &config);
    println!("\n2. Inventory:");
    println!("   products: {}", inventory.total_products);
    println!("   units in stock: {}", inventory.units_in_stock);
    println!("   out of stock: {}", inventory.out_of_stock_count);
    println!("   low stock: {}", inventory.low_stock_count);
    for product in &inventory.out_of_stock {
        println!("   sin stock: {}", product.display_text("nombre"));
    }

    // 3. Sales dashboard for a fixed day
    let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let dashboard = sales_dashboard(&sales, &products, today, &config);
    println!("\n3. Sales:");
    println!("   total sales: {}", dashboard.total_sales);
    println!("   revenue: {:.2}", dashboard.revenue);
    println!("   sales on {}: {}", today, dashboard.sales_today);
    for ranked in &dashboard.top_categories {
        println!("   {}: {} units", ranked.key, ranked.total);
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
