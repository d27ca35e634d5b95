/// Sales List Example
///
/// This example demonstrates:
/// - Loading a sales snapshot from JSON
/// - Searching, filtering by date and sorting
/// - Paging through the result
/// - Summary statistics over the filtered sales

use chrono::NaiveDate;
use stockview::{compute_statistics, compute_view, records_from_json, SortKey, StatsSpec, ViewConfig, ViewSchema};

const SALES: &str = r#"{"data": [
    {"id": 1, "producto": "Martillo", "categoria": "Herramientas", "cantidad_vendida_producto": 2, "cantidad_vendida_precio": 25.0, "fecha": "2026-03-01T10:15:00Z"},
    {"id": 2, "producto": "Lámpara", "categoria": "Hogar", "cantidad_vendida_producto": 1, "cantidad_vendida_precio": 19.99, "fecha": "2026-03-02T11:00:00Z"},
    {"id": 3, "producto": "Taladro", "categoria": "Herramientas", "cantidad_vendida_producto": 1, "cantidad_vendida_precio": 35.5, "fecha": "2026-03-03T09:40:00Z"},
    {"id": 4, "producto": "Manguera", "categoria": "Jardín", "cantidad_vendida_producto": 3, "cantidad_vendida_precio": 90.0, "fecha": "2026-03-03T16:20:00Z"},
    {"id": 5, "producto": "Martillo", "categoria": "Herramientas", "cantidad_vendida_producto": 4, "cantidad_vendida_precio": 50.0, "fecha": "2026-03-05T08:05:00Z"},
    {"id": 6, "producto": "Escoba", "categoria": "Hogar", "cantidad_vendida_producto": 2, "cantidad_vendida_precio": 11.0, "fecha": "2026-03-06T13:30:00Z"},
    {"id": 7, "producto": "Sierra", "categoria": "Herramientas", "cantidad_vendida_producto": 1, "cantidad_vendida_precio": 22.75, "fecha": "2026-03-07T17:45:00Z"}
]}"#;

fn main() -> stockview::Result<()> {
    println!("=== StockView Sales List Example ===\n");

    // 1. Load the snapshot
    let sales = records_from_json(SALES)?;
    let schema = ViewSchema::sales();
    println!("1. Loaded {} sales\n", sales.len());

    // 2. Newest first, three per page
    println!("2. Newest sales, page 1:");
    let config = ViewConfig::new().sort(SortKey::DateDesc).page(3, 1);
    let view = compute_view(&sales, &config, &schema);
    for sale in &view.items {
        println!("   #{} {} - {}", sale.display_text("id"), sale.display_text("producto"), sale.display_text("fecha"));
    }
    println!("   page {}/{} ({} sales)\n", view.page_number, view.total_pages, view.total_items);

    // 3. Search and date range
    println!("3. Tools sold between March 2 and March 6, biggest totals first:");
    let config = ViewConfig::new()
        .search("herramientas")
        .date_range(NaiveDate::from_ymd_opt(2026, 3, 2), NaiveDate::from_ymd_opt(2026, 3, 6))
        .sort(SortKey::TotalDesc);
    let view = compute_view(&sales, &config, &schema);
    for sale in &view.items {
        println!("   {} x{} = {}", sale.display_text("producto"), sale.display_text("cantidad_vendida_producto"), sale.display_text("cantidad_vendida_precio"));
    }

    // 4. Statistics over the filtered set, not just the page
    let stats = compute_statistics(&view.filtered, &StatsSpec::sales());
    println!("\n4. Statistics:");
    println!("   sales: {}", stats.count);
    println!("   revenue: {:.2}", stats.sum);
    println!("   units: {}", stats.quantity);
    if let Some(mean) = stats.mean() {
        println!("   average sale: {:.2}", mean);
    }

    // 5. A page past the end is empty
    let config = ViewConfig::new().page(3, 9);
    let view = compute_view(&sales, &config, &schema);
    println!("\n5. Page 9 holds {} sales; last page is {}", view.items.len(), view.last_valid_page());

    println!("\n=== Example Complete ===");
    Ok(())
}
