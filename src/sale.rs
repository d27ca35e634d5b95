/// Sale entry
///
/// When the user picks a product in the sale form, a `SaleDraft` is built
/// from the product record: its category is resolved through the
/// `CategoryIndex`, its price and stock are copied, and the line total is
/// recomputed whenever the quantity changes. A draft only turns into a
/// `SalePayload` for the service once it validates.
///
/// # Examples
///
/// ```
/// use stockview::{CategoryIndex, Record, SaleDraft};
///
/// let categories = vec![Record::builder().id(2).field("nombre", "Hogar").build()];
/// let index = CategoryIndex::from_records(&categories);
///
/// let lamp = Record::builder()
///     .id(11)
///     .field("categoria", "Hogar")
///     .field("precio", 19.99)
///     .field("cantidad", 4)
///     .build();
///
/// let payload = SaleDraft::for_product(&lamp, &index)
///     .with_quantity(3)
///     .into_payload()
///     .unwrap();
///
/// assert_eq!(payload.categoria_id, 2);
/// assert_eq!(payload.cantidad_vendida_precio, 59.97);
/// ```

use crate::category::{CategoryIndex, Resolution};
use crate::error::{Error, Result};
use crate::record::{Record, RecordId};
use crate::validation::ValidationErrors;
use serde::{Deserialize, Serialize};

/// `quantity * unit_price` rounded to cents; 0 unless both are positive
pub fn line_total(quantity: i64, unit_price: f64) -> f64 {
    if quantity <= 0 || !(unit_price > 0.0) {
        return 0.0;
    }
    round_cents(quantity as f64 * unit_price)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Sale form state for one product line
#[derive(Debug, Clone, PartialEq)]
pub struct SaleDraft {
    pub product_id: Option<RecordId>,
    pub category: Resolution,
    pub quantity: i64,
    pub unit_price: f64,
    /// Units in stock when the product was picked, if known
    pub available_stock: Option<i64>,
}

impl Default for SaleDraft {
    fn default() -> Self {
        SaleDraft {
            product_id: None,
            category: Resolution::Unresolved,
            quantity: 0,
            unit_price: 0.0,
            available_stock: None,
        }
    }
}

impl SaleDraft {
    /// Draft with no product selected yet
    pub fn empty() -> Self {
        SaleDraft::default()
    }

    /// Start a draft for the selected `product`
    pub fn for_product(product: &Record, index: &CategoryIndex) -> Self {
        SaleDraft {
            product_id: product.id(),
            category: index.resolve(product),
            quantity: 0,
            unit_price: product.opt_number("precio").unwrap_or(0.0),
            available_stock: product.opt_number("cantidad").map(|q| q.floor() as i64),
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_unit_price(mut self, unit_price: f64) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn total(&self) -> f64 {
        line_total(self.quantity, self.unit_price)
    }

    /// Field errors keyed by the payload field they concern
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.product_id.is_none() {
            errors.insert("producto_id", "Select a product");
        }

        if self.quantity <= 0 {
            errors.insert("cantidad_vendida_producto", "Quantity must be greater than 0");
        } else if let Some(stock) = self.available_stock.filter(|stock| self.quantity > *stock) {
            errors.insert(
                "cantidad_vendida_producto",
                format!("Insufficient stock. Available: {}", stock),
            );
        }

        if self.product_id.is_some() && !self.category.is_resolved() {
            errors.insert(
                "categoria_id",
                "Could not determine the category of the selected product",
            );
        }

        errors
    }

    /// The request body for the service; fails if the draft does not validate
    pub fn into_payload(self) -> Result<SalePayload> {
        let errors = self.validate();
        if !errors.is_empty() {
            log::debug!("rejecting sale draft: {}", errors.summary());
            return Err(Error::InvalidDraft(errors.summary()));
        }

        let (Some(producto_id), Some(categoria_id)) = (self.product_id, self.category.id()) else {
            return Err(Error::InvalidDraft("missing product or category".to_string()));
        };

        Ok(SalePayload {
            producto_id,
            categoria_id,
            cantidad_vendida_producto: self.quantity,
            producto_precio: self.unit_price,
            cantidad_vendida_precio: self.total(),
        })
    }
}

/// Body of a create or update sale request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalePayload {
    pub producto_id: RecordId,
    pub categoria_id: RecordId,
    pub cantidad_vendida_producto: i64,
    pub producto_precio: f64,
    pub cantidad_vendida_precio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    fn index() -> CategoryIndex {
        CategoryIndex::from_records(&[
            Record::builder().id(1).field("nombre", "Herramientas").build(),
            Record::builder().id(2).field("nombre", "Hogar").build(),
        ])
    }

    fn drill(stock: i64) -> Record {
        Record::builder()
            .id(40)
            .field("nombre", "Taladro")
            .field("categoria", "herramientas")
            .field("precio", "35.50")
            .field("cantidad", stock)
            .build()
    }

    #[test]
    fn test_line_total_rounds_to_cents() {
        assert_eq!(line_total(3, 0.1), 0.3);
        assert_eq!(line_total(3, 19.99), 59.97);
        assert_eq!(line_total(0, 10.0), 0.0);
        assert_eq!(line_total(2, 0.0), 0.0);
        assert_eq!(line_total(2, f64::NAN), 0.0);
    }

    #[test]
    fn test_draft_from_product() {
        let draft = SaleDraft::for_product(&drill(5), &index()).with_quantity(2);
        assert_eq!(draft.product_id, Some(40));
        assert_eq!(draft.category, Resolution::ExactName(1));
        assert_eq!(draft.unit_price, 35.5);
        assert_eq!(draft.available_stock, Some(5));
        assert_eq!(draft.total(), 71.0);
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn test_quantity_rules() {
        let draft = SaleDraft::for_product(&drill(5), &index());
        assert_eq!(
            draft.validate().get("cantidad_vendida_producto"),
            Some("Quantity must be greater than 0")
        );

        let draft = draft.with_quantity(6);
        assert_eq!(
            draft.validate().get("cantidad_vendida_producto"),
            Some("Insufficient stock. Available: 5")
        );
    }

    #[test]
    fn test_unresolved_category_blocks_submission() {
        let product = Record::builder()
            .id(9)
            .field("categoria", FieldValue::Null)
            .field("categoria_id", 0)
            .field("precio", 10)
            .build();
        let draft = SaleDraft::for_product(&product, &index()).with_quantity(1);

        let errors = draft.validate();
        assert_eq!(
            errors.get("categoria_id"),
            Some("Could not determine the category of the selected product")
        );
        assert!(matches!(draft.into_payload(), Err(Error::InvalidDraft(_))));
    }

    #[test]
    fn test_empty_draft_only_asks_for_product() {
        let errors = SaleDraft::empty().with_quantity(1).validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("producto_id"), Some("Select a product"));
    }

    #[test]
    fn test_payload_shape() {
        let payload = SaleDraft::for_product(&drill(5), &index())
            .with_quantity(2)
            .with_unit_price(30.0)
            .into_payload()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "producto_id": 40,
                "categoria_id": 1,
                "cantidad_vendida_producto": 2,
                "producto_precio": 30.0,
                "cantidad_vendida_precio": 60.0
            })
        );
    }
}
