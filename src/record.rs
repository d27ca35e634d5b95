/// StockView records
///
/// A `Record` is one sale, product or category exactly as the service
/// returned it: a field map with an `id`. Records are owned by the caller's
/// snapshot; nothing in this crate mutates them in place.
///
/// # Examples
///
/// ```
/// use stockview::{records_from_json, FieldValue};
///
/// let json = r#"[{"id": 1, "nombre": "Martillo", "cantidad": "4"}]"#;
/// let records = records_from_json(json).unwrap();
///
/// assert_eq!(records[0].id(), Some(1));
/// assert_eq!(records[0].number("cantidad"), 4.0);
/// assert_eq!(records[0].text("nombre"), Some("Martillo"));
/// assert_eq!(records[0].get("precio"), None::<&FieldValue>);
/// ```

use crate::error::{Error, Result};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a record within its collection
pub type RecordId = i64;

/// Name of the identifier field
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    from = "serde_json::Map<String, serde_json::Value>",
    into = "BTreeMap<String, FieldValue>"
)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Start building a record field by field
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    pub fn from_fields(fields: BTreeMap<String, FieldValue>) -> Self {
        Record { fields }
    }

    /// Convert one JSON object into a record
    pub fn from_json_object(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = obj
            .into_iter()
            .map(|(name, value)| (name, FieldValue::from(value)))
            .collect();
        Record { fields }
    }

    /// The record identifier. Accepts numeric ids and numeric strings.
    pub fn id(&self) -> Option<RecordId> {
        self.fields.get(ID_FIELD).and_then(FieldValue::as_i64)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Text content of a field, if the field holds text
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    /// Textual rendering of a field; missing fields render as `""`
    pub fn display_text(&self, field: &str) -> String {
        self.get(field).map(FieldValue::display_text).unwrap_or_default()
    }

    /// Numeric content of a field. Missing or non-numeric fields count as 0.
    pub fn number(&self, field: &str) -> f64 {
        self.get(field).and_then(FieldValue::as_f64).unwrap_or(0.0)
    }

    /// Numeric content of a field, distinguishing absence from zero
    pub fn opt_number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// A copy of this record with `changes` laid over its fields
    pub fn merged(&self, changes: &BTreeMap<String, FieldValue>) -> Record {
        let mut fields = self.fields.clone();
        for (name, value) in changes {
            fields.insert(name.clone(), value.clone());
        }
        Record { fields }
    }

    /// True when both records carry the same identifier
    pub fn same_record(&self, other: &Record) -> bool {
        matches!((self.id(), other.id()), (Some(a), Some(b)) if a == b)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        Record::from_json_object(obj)
    }
}

impl From<Record> for BTreeMap<String, FieldValue> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

/// Fluent construction of records for tests, demos and benches
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: BTreeMap<String, FieldValue>,
}

impl RecordBuilder {
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn id(self, id: RecordId) -> Self {
        self.field(ID_FIELD, id)
    }

    pub fn build(self) -> Record {
        Record { fields: self.fields }
    }
}

/// Parse a JSON array of objects into records.
///
/// Unlike a table import, an empty array is a valid (empty) snapshot.
pub fn records_from_json(json: &str) -> Result<Vec<Record>> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    records_from_value(parsed)
}

/// Convert an already-parsed JSON value into records.
///
/// Accepts either a bare array or an object wrapping the array under
/// `data`, which is how some list endpoints answer.
pub fn records_from_value(value: serde_json::Value) -> Result<Vec<Record>> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => match obj.remove("data") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(Error::InvalidRecord(
                    "expected an array of objects or an object with a `data` array".to_string(),
                ))
            }
        },
        _ => return Err(Error::InvalidRecord("expected an array of objects".to_string())),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| match item {
            serde_json::Value::Object(obj) => Ok(Record::from_json_object(obj)),
            other => Err(Error::InvalidRecord(format!(
                "element {} is not an object: {}",
                position, other
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_and_accessors() {
        let record = Record::builder()
            .id(7)
            .field("producto", "Taladro")
            .field("cantidad_vendida_producto", 2)
            .build();

        assert_eq!(record.id(), Some(7));
        assert_eq!(record.text("producto"), Some("Taladro"));
        assert_eq!(record.number("cantidad_vendida_producto"), 2.0);
        assert_eq!(record.number("missing"), 0.0);
        assert_eq!(record.opt_number("missing"), None);
        assert_eq!(record.display_text("missing"), "");
    }

    #[test]
    fn test_string_id() {
        let record = Record::builder().field("id", "42").build();
        assert_eq!(record.id(), Some(42));
    }

    #[test]
    fn test_records_from_json() {
        let records = records_from_json(r#"[{"id": 1}, {"id": 2, "nombre": null}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("nombre"), Some(&FieldValue::Null));

        let empty = records_from_json("[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_records_from_wrapped_value() {
        let records = records_from_value(json!({"data": [{"id": 3}]})).unwrap();
        assert_eq!(records[0].id(), Some(3));
    }

    #[test]
    fn test_records_from_json_rejects_scalars() {
        assert!(matches!(
            records_from_json(r#"[1, 2]"#),
            Err(Error::InvalidRecord(_))
        ));
        assert!(matches!(records_from_json("42"), Err(Error::InvalidRecord(_))));
        assert!(matches!(records_from_json("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_merged_keeps_original() {
        let original = Record::builder().id(1).field("cantidad", 3).build();
        let mut changes = BTreeMap::new();
        changes.insert("cantidad".to_string(), FieldValue::Int(0));

        let updated = original.merged(&changes);
        assert_eq!(updated.number("cantidad"), 0.0);
        assert_eq!(original.number("cantidad"), 3.0);
        assert!(updated.same_record(&original));
    }

    #[test]
    fn test_serde_round_trip_shape() {
        let record: Record = serde_json::from_value(json!({"id": 1, "nombre": "Hogar"})).unwrap();
        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back, json!({"id": 1, "nombre": "Hogar"}));
    }
}
