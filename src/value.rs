/// StockView field values
///
/// Records come from a JSON API whose field types are not reliable: the
/// same field may arrive as a number on one record and as a numeric string
/// on the next. `FieldValue` keeps what was received and offers lenient
/// accessors so the view engine can degrade gracefully instead of failing.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A single field value of a record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// True for null and for text that is empty after trimming.
    /// Blank filter values mean "no constraint".
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of the value. Numeric-looking text is parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(n) => Some(*n as f64),
            FieldValue::Float(f) if f.is_finite() => Some(*f),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Integer view of the value. Floats must be integral; text is parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                trimmed.parse::<i64>().ok().or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
            _ => None,
        }
    }

    /// True when the value is text that does not parse as a number.
    pub fn is_non_numeric_text(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().parse::<f64>().is_err(),
            _ => false,
        }
    }

    /// Textual rendering used for search and exact-match filters.
    /// Integral floats render without a fractional part so that `3`, `3.0`
    /// and `"3"` compare equal.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Float(f) if f.is_finite() && f.fract() == 0.0 => (*f as i64).to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
        }
    }

    /// Equality used by field filters: textual, case-sensitive, trimmed.
    pub fn filter_eq(&self, other: &FieldValue) -> bool {
        self.display_text() == other.display_text()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    FieldValue::Float(f)
                } else {
                    FieldValue::Null
                }
            }
            serde_json::Value::String(s) => FieldValue::Text(s),
            // Embedded relations such as `"categoria": {"id": 3, "nombre": "Hogar"}`
            serde_json::Value::Object(mut obj) => match obj.remove("nombre") {
                Some(serde_json::Value::String(name)) => FieldValue::Text(name),
                _ => FieldValue::Null,
            },
            serde_json::Value::Array(_) => FieldValue::Null,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(n as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Case- and accent-insensitive key for ordering names.
///
/// Folds the diacritics found in Spanish product and category names so that
/// "Árboles" sorts next to "arena" rather than after "zapatos".
pub fn collation_key(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Name ordering: collation key first, raw text as tiebreaker so that the
/// order is total and deterministic.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Normalization used for category names: trimmed and lowercased.
pub fn normalize_name(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_text_is_parsed() {
        assert_eq!(FieldValue::from("12").as_i64(), Some(12));
        assert_eq!(FieldValue::from(" 4.5 ").as_f64(), Some(4.5));
        assert_eq!(FieldValue::from("abc").as_f64(), None);
        assert_eq!(FieldValue::Float(7.0).as_i64(), Some(7));
        assert_eq!(FieldValue::Float(7.5).as_i64(), None);
    }

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::from("   ").is_blank());
        assert!(!FieldValue::Int(0).is_blank());
    }

    #[test]
    fn test_filter_eq_across_types() {
        assert!(FieldValue::Int(3).filter_eq(&FieldValue::from("3")));
        assert!(FieldValue::Float(3.0).filter_eq(&FieldValue::Int(3)));
        assert!(!FieldValue::from("Hogar").filter_eq(&FieldValue::from("hogar")));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(FieldValue::from(json!(5)), FieldValue::Int(5));
        assert_eq!(FieldValue::from(json!(2.5)), FieldValue::Float(2.5));
        assert_eq!(FieldValue::from(json!(null)), FieldValue::Null);
        assert_eq!(
            FieldValue::from(json!({"id": 3, "nombre": "Hogar"})),
            FieldValue::from("Hogar")
        );
        assert_eq!(FieldValue::from(json!([1, 2])), FieldValue::Null);
    }

    #[test]
    fn test_non_numeric_text() {
        assert!(FieldValue::from("Electrónica").is_non_numeric_text());
        assert!(!FieldValue::from("7").is_non_numeric_text());
        assert!(!FieldValue::Int(7).is_non_numeric_text());
    }

    #[test]
    fn test_collation_folds_accents() {
        assert_eq!(collation_key("Árbol Ñandú"), "arbol nandu");
        assert_eq!(compare_names("árbol", "Arena"), Ordering::Less);
        assert_eq!(compare_names("Zapato", "árbol"), Ordering::Greater);
        assert_ne!(compare_names("a", "A"), Ordering::Equal);
    }
}
