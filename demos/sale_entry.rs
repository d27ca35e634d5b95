/// Sale Entry Example
///
/// This example demonstrates:
/// - Resolving a product's category in its different shapes
/// - Validating a sale draft against stock
/// - Building the request payload
/// - Patching the local snapshot after the service confirms

use std::collections::BTreeMap;
use stockview::{
    records_from_json, CategoryIndex, Changeset, FieldValue, RecordChange, SaleDraft,
};

const CATEGORIES: &str = r#"[
    {"id": 1, "nombre": "Herramientas"},
    {"id": 2, "nombre": "Hogar"},
    {"id": 3, "nombre": "Jardín"}
]"#;

const PRODUCTS: &str = r#"[
    {"id": 10, "nombre": "Martillo", "categoria": "herramientas", "precio": 12.5, "cantidad": 8},
    {"id": 11, "nombre": "Lámpara", "categoria_id": "Hogar", "precio": 19.99, "cantidad": 2},
    {"id": 12, "nombre": "Manguera", "categoria_id": 3, "precio": 30, "cantidad": 5},
    {"id": 13, "nombre": "Maceta", "categoria": "Jardín exterior", "precio": 4.25, "cantidad": 20},
    {"id": 14, "nombre": "Misterio", "precio": 1, "cantidad": 1}
]"#;

fn main() -> stockview::Result<()> {
    println!("=== StockView Sale Entry Example ===\n");

    let categories = records_from_json(CATEGORIES)?;
    let mut products = records_from_json(PRODUCTS)?;
    let index = CategoryIndex::from_records(&categories);

    // 1. Category resolution
    println!("1. Category of each product:");
    for product in &products {
        println!("   {:<10} -> {:?}", product.display_text("nombre"), index.resolve(product));
    }

    // 2. Validation
    println!("\n2. Trying to sell 3 lamps (2 in stock):");
    let draft = SaleDraft::for_product(&products[1], &index).with_quantity(3);
    for (field, message) in draft.validate().iter() {
        println!("   {}: {}", field, message);
    }

    println!("\n   Selling a product with no category:");
    let draft = SaleDraft::for_product(&products[4], &index).with_quantity(1);
    if let Err(e) = draft.into_payload() {
        println!("   {}", e);
    }

    // 3. A valid sale
    println!("\n3. Selling 3 hammers:");
    let payload = SaleDraft::for_product(&products[0], &index)
        .with_quantity(3)
        .into_payload()?;
    println!("   {}", serde_json::to_string(&payload)?);

    // 4. Patch the stock once the service confirms
    let stock = products[0].number("cantidad") as i64 - payload.cantidad_vendida_producto;
    let mut fields = BTreeMap::new();
    fields.insert("cantidad".to_string(), FieldValue::Int(stock));

    let mut changeset = Changeset::new();
    changeset.push(RecordChange::Updated { id: payload.producto_id, fields });
    products = changeset.apply_to(&products)?;
    println!("\n4. Hammers left: {}", products[0].display_text("cantidad"));

    println!("\n=== Example Complete ===");
    Ok(())
}
