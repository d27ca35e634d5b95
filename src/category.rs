/// Category resolution for sale entry
///
/// Products reference their category in whatever shape the service gave
/// them: a name in `categoria`, a name stored in `categoria_id`, a numeric
/// id or a numeric string. `CategoryIndex` turns any of these into the
/// canonical category id, or reports that it could not.
///
/// # Examples
///
/// ```
/// use stockview::{CategoryIndex, Record, Resolution};
///
/// let categories = vec![
///     Record::builder().id(3).field("nombre", "Electrónica").build(),
///     Record::builder().id(7).field("nombre", "Hogar").build(),
/// ];
/// let index = CategoryIndex::from_records(&categories);
///
/// let product = Record::builder()
///     .field("categoria", " electrónica ")
///     .field("categoria_id", 7)
///     .build();
///
/// assert_eq!(index.resolve(&product), Resolution::ExactName(3));
/// assert_eq!(index.resolve(&product).id(), Some(3));
/// ```

use crate::record::{Record, RecordId};
use crate::value::{normalize_name, FieldValue};
use serde::Serialize;
use std::collections::HashMap;

/// Field holding the category name on a product
pub const CATEGORY_NAME_FIELD: &str = "categoria";
/// Field holding the category id on a product
pub const CATEGORY_ID_FIELD: &str = "categoria_id";

/// Outcome of resolving a product's category, tagged with the rule that
/// produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "id", rename_all = "snake_case")]
pub enum Resolution {
    /// The product's category name matched a category exactly
    ExactName(RecordId),
    /// The name only matched partially (substring in either direction)
    PartialName(RecordId),
    /// `categoria_id` was a positive number
    NumericId(RecordId),
    /// `categoria_id` was a string holding a positive number
    NumericString(RecordId),
    /// No rule produced a positive id
    Unresolved,
}

impl Resolution {
    pub fn id(&self) -> Option<RecordId> {
        match *self {
            Resolution::ExactName(id)
            | Resolution::PartialName(id)
            | Resolution::NumericId(id)
            | Resolution::NumericString(id) => Some(id),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryEntry {
    id: RecordId,
    normalized: String,
}

/// Name-to-id lookup built from one category list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    by_name: HashMap<String, RecordId>,
    /// In list order, for the partial-match fallback
    entries: Vec<CategoryEntry>,
}

impl CategoryIndex {
    /// Build the index from category records (`id` + `nombre`).
    ///
    /// Categories without a positive id are skipped. When two categories
    /// normalize to the same name the first one wins.
    pub fn from_records(categories: &[Record]) -> Self {
        let mut index = CategoryIndex::default();
        for category in categories {
            let Some(id) = category.id().filter(|id| *id > 0) else {
                log::debug!("skipping category without a usable id: {:?}", category.get("nombre"));
                continue;
            };
            let normalized = category
                .text("nombre")
                .map(normalize_name)
                .unwrap_or_default();
            index.by_name.entry(normalized.clone()).or_insert(id);
            index.entries.push(CategoryEntry { id, normalized });
        }
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup of a category name (trimmed, case-insensitive)
    pub fn find_exact(&self, name: &str) -> Option<RecordId> {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return None;
        }
        self.by_name.get(&normalized).copied()
    }

    /// First category (in list order) whose name contains `name` or is
    /// contained in it. Categories with blank names never match.
    pub fn find_partial(&self, name: &str) -> Option<RecordId> {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .filter(|entry| !entry.normalized.is_empty())
            .find(|entry| {
                entry.normalized.contains(&normalized) || normalized.contains(&entry.normalized)
            })
            .map(|entry| entry.id)
    }

    /// Look up a name: exact match first, then the partial fallback
    pub fn find_by_name(&self, name: &str) -> Resolution {
        if let Some(id) = self.find_exact(name) {
            Resolution::ExactName(id)
        } else if let Some(id) = self.find_partial(name) {
            Resolution::PartialName(id)
        } else {
            Resolution::Unresolved
        }
    }

    /// Determine the canonical category id of `product`.
    ///
    /// A category name, when the product carries one, takes priority over
    /// any numeric id. Once a name is present its lookup decides the
    /// outcome; the numeric fields are only used for products without a
    /// name.
    pub fn resolve(&self, product: &Record) -> Resolution {
        let resolution = match category_name(product) {
            Some(name) => {
                let found = self.find_by_name(name);
                if let Resolution::PartialName(id) = found {
                    log::debug!("category '{}' matched only partially, using id {}", name, id);
                }
                found
            }
            None => numeric_category(product.get(CATEGORY_ID_FIELD)),
        };

        match resolution {
            Resolution::Unresolved => log::warn!(
                "could not determine category for product {:?} (categoria: {:?}, categoria_id: {:?})",
                product.id(),
                product.get(CATEGORY_NAME_FIELD),
                product.get(CATEGORY_ID_FIELD)
            ),
            resolved => log::debug!("product {:?} resolved to {:?}", product.id(), resolved),
        }
        resolution
    }
}

/// A usable category name on the product: non-blank, non-numeric text in
/// `categoria`, or else in `categoria_id`
fn category_name(product: &Record) -> Option<&str> {
    [CATEGORY_NAME_FIELD, CATEGORY_ID_FIELD]
        .into_iter()
        .filter_map(|field| product.get(field))
        .filter(|value| value.is_non_numeric_text() && !value.is_blank())
        .find_map(FieldValue::as_text)
}

fn numeric_category(value: Option<&FieldValue>) -> Resolution {
    match value {
        Some(FieldValue::Int(_)) | Some(FieldValue::Float(_)) => value
            .and_then(FieldValue::as_i64)
            .filter(|id| *id > 0)
            .map_or(Resolution::Unresolved, Resolution::NumericId),
        Some(text @ FieldValue::Text(_)) => text
            .as_i64()
            .filter(|id| *id > 0)
            .map_or(Resolution::Unresolved, Resolution::NumericString),
        _ => Resolution::Unresolved,
    }
}

/// Resolve `product` against `index`, `None` when no category could be
/// determined
pub fn resolve_category_id(product: &Record, index: &CategoryIndex) -> Option<RecordId> {
    index.resolve(product).id()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Record> {
        vec![
            Record::builder().id(3).field("nombre", "Electrónica").build(),
            Record::builder().id(4).field("nombre", "Herramientas eléctricas").build(),
            Record::builder().id(10).field("nombre", "Herramientas").build(),
            Record::builder().id(12).field("nombre", "  Hogar ").build(),
        ]
    }

    fn product(categoria: impl Into<FieldValue>, categoria_id: impl Into<FieldValue>) -> Record {
        Record::builder()
            .id(1)
            .field("categoria", categoria)
            .field("categoria_id", categoria_id)
            .build()
    }

    #[test]
    fn test_name_takes_priority_over_id() {
        let index = CategoryIndex::from_records(&categories());
        let p = product("Electrónica", 7);
        assert_eq!(index.resolve(&p), Resolution::ExactName(3));
        assert_eq!(resolve_category_id(&p, &index), Some(3));
    }

    #[test]
    fn test_unresolvable_product() {
        let index = CategoryIndex::from_records(&categories());
        let p = product(FieldValue::Null, 0);
        assert_eq!(index.resolve(&p), Resolution::Unresolved);
        assert_eq!(resolve_category_id(&p, &index), None);
    }

    #[test]
    fn test_exact_match_is_normalized() {
        let index = CategoryIndex::from_records(&categories());
        assert_eq!(index.find_exact("HOGAR"), Some(12));
        assert_eq!(index.find_exact("  herramientas "), Some(10));
        assert_eq!(index.find_exact(""), None);
    }

    #[test]
    fn test_name_in_id_field() {
        let index = CategoryIndex::from_records(&categories());
        let p = product(FieldValue::Null, "hogar");
        assert_eq!(index.resolve(&p), Resolution::ExactName(12));
    }

    #[test]
    fn test_numeric_fallbacks() {
        let index = CategoryIndex::from_records(&categories());
        assert_eq!(index.resolve(&product(FieldValue::Null, 9)), Resolution::NumericId(9));
        assert_eq!(index.resolve(&product("", " 9 ")), Resolution::NumericString(9));
        assert_eq!(index.resolve(&product("5", FieldValue::Null)), Resolution::Unresolved);
        assert_eq!(index.resolve(&product(FieldValue::Null, -4)), Resolution::Unresolved);
        assert_eq!(index.resolve(&product(FieldValue::Null, "0")), Resolution::Unresolved);
    }

    #[test]
    fn test_partial_match_fallback() {
        let index = CategoryIndex::from_records(&categories());

        // Accents are significant
        assert_eq!(index.resolve(&product("Electro", 0)), Resolution::Unresolved);
        // Contained in a category name
        assert_eq!(index.resolve(&product("electró", 0)), Resolution::PartialName(3));

        // Contains a category name
        assert_eq!(
            index.resolve(&product("Hogar y jardín", 0)),
            Resolution::PartialName(12)
        );

        // Overlapping names: the first listed category wins
        assert_eq!(index.resolve(&product("herramienta", 0)), Resolution::PartialName(4));
    }

    #[test]
    fn test_unmatched_name_does_not_fall_back_to_id() {
        let index = CategoryIndex::from_records(&categories());
        assert_eq!(index.resolve(&product("Juguetes", 10)), Resolution::Unresolved);
    }

    #[test]
    fn test_empty_index() {
        let index = CategoryIndex::from_records(&[]);
        assert!(index.is_empty());
        assert_eq!(index.resolve(&product("Hogar", FieldValue::Null)), Resolution::Unresolved);
        assert_eq!(index.resolve(&product(FieldValue::Null, 2)), Resolution::NumericId(2));
    }

    #[test]
    fn test_index_skips_invalid_and_duplicate_categories() {
        let index = CategoryIndex::from_records(&[
            Record::builder().field("nombre", "Sin id").build(),
            Record::builder().id(0).field("nombre", "Cero").build(),
            Record::builder().id(5).field("nombre", "Libros").build(),
            Record::builder().id(6).field("nombre", "libros").build(),
            Record::builder().id(8).build(),
        ]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.find_exact("Libros"), Some(5));
        assert_eq!(index.find_exact("sin id"), None);
        // The unnamed category never matches partially
        assert_eq!(index.find_partial("x"), None);
    }

    #[test]
    fn test_embedded_category_object() {
        let index = CategoryIndex::from_records(&categories());
        let records = crate::record::records_from_json(
            r#"[{"id": 1, "categoria": {"id": 12, "nombre": "Hogar"}}]"#,
        )
        .unwrap();
        assert_eq!(index.resolve(&records[0]), Resolution::ExactName(12));
    }

    #[test]
    fn test_resolution_serializes_with_rule() {
        let json = serde_json::to_value(Resolution::PartialName(4)).unwrap();
        assert_eq!(json, serde_json::json!({"rule": "partial_name", "id": 4}));
    }
}
