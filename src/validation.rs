/// Field-level form validation.
///
/// A `FormValidator` maps field names to ordered rule lists. Validation is
/// stateless: each run looks at the submitted values only and reports at
/// most one message per field, the one from the first rule that fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Submitted form values, as typed by the user
pub type FormValues = BTreeMap<String, String>;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern compiles")
});

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-+()]+$").expect("phone pattern compiles"));

/// One validation rule and the message reported when it fails
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be present and not blank
    Required(String),
    /// Trimmed value must have at least this many characters
    MinLength(usize, String),
    /// Trimmed value must have at most this many characters
    MaxLength(usize, String),
    /// Value must be a number `>= min`
    Min { min: f64, message: String },
    /// Value must be a number `> min`
    Above { min: f64, message: String },
    /// Value must be a number `<= max`
    Max { max: f64, message: String },
    /// Value must match the regular expression
    Pattern(Regex, String),
    /// Value must equal the value of another field
    EqualsField(String, String),
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required(message.into())
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Rule::MinLength(min, message.into())
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Rule::MaxLength(max, message.into())
    }

    pub fn min(min: f64, message: impl Into<String>) -> Self {
        Rule::Min { min, message: message.into() }
    }

    pub fn above(min: f64, message: impl Into<String>) -> Self {
        Rule::Above { min, message: message.into() }
    }

    pub fn max(max: f64, message: impl Into<String>) -> Self {
        Rule::Max { max, message: message.into() }
    }

    /// Compile `pattern` into a rule
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::InvalidConfig(format!("bad pattern '{}': {}", pattern, e)))?;
        Ok(Rule::Pattern(regex, message.into()))
    }

    pub fn equals_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Rule::EqualsField(field.into(), message.into())
    }

    /// The failure message, if `value` violates this rule.
    ///
    /// Only `Required` looks at blank values; every other rule accepts a
    /// blank value so optional fields can stay empty.
    fn check(&self, value: &str, values: &FormValues) -> Option<&str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return match self {
                Rule::Required(message) => Some(message.as_str()),
                _ => None,
            };
        }

        let number = || trimmed.parse::<f64>().ok().filter(|n| n.is_finite());
        let failed = match self {
            Rule::Required(_) => false,
            Rule::MinLength(min, _) => trimmed.chars().count() < *min,
            Rule::MaxLength(max, _) => trimmed.chars().count() > *max,
            Rule::Min { min, .. } => number().map_or(true, |n| n < *min),
            Rule::Above { min, .. } => number().map_or(true, |n| n <= *min),
            Rule::Max { max, .. } => number().map_or(true, |n| n > *max),
            Rule::Pattern(regex, _) => !regex.is_match(trimmed),
            Rule::EqualsField(other, _) => values.get(other).map(String::as_str) != Some(value),
        };

        if failed {
            Some(self.message())
        } else {
            None
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Rule::Required(message)
            | Rule::MinLength(_, message)
            | Rule::MaxLength(_, message)
            | Rule::Min { message, .. }
            | Rule::Above { message, .. }
            | Rule::Max { message, .. }
            | Rule::Pattern(_, message)
            | Rule::EqualsField(_, message) => message.as_str(),
        }
    }
}

/// Field name to error message, for the fields that failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Record a failure; the first message for a field is kept
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All messages joined, for logs and error values
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Ordered rule lists per field
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    fields: Vec<(String, Vec<Rule>)>,
}

impl FormValidator {
    pub fn new() -> Self {
        FormValidator::default()
    }

    pub fn field(mut self, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.fields.push((name.into(), rules));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Validate every field, stopping at the first failing rule per field
    pub fn validate(&self, values: &FormValues) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for (name, rules) in &self.fields {
            let value = values.get(name).map(String::as_str).unwrap_or("");
            if let Some(message) = rules.iter().find_map(|rule| rule.check(value, values)) {
                errors.insert(name.clone(), message);
            }
        }
        errors
    }
}

/// Rule sets shared by the account and catalog forms
pub mod rules {
    use super::{Rule, EMAIL_PATTERN, PHONE_PATTERN};

    pub fn email() -> Vec<Rule> {
        vec![
            Rule::required("Email is required"),
            Rule::Pattern(EMAIL_PATTERN.clone(), "Invalid email format".to_string()),
        ]
    }

    pub fn password() -> Vec<Rule> {
        password_with_min(6)
    }

    pub fn password_with_min(min: usize) -> Vec<Rule> {
        vec![
            Rule::required("Password is required"),
            Rule::min_length(min, format!("Password must be at least {} characters", min)),
        ]
    }

    pub fn name() -> Vec<Rule> {
        vec![
            Rule::required("Name is required"),
            Rule::min_length(2, "Name must be at least 2 characters"),
        ]
    }

    pub fn phone() -> Vec<Rule> {
        vec![
            Rule::required("Phone is required"),
            Rule::Pattern(PHONE_PATTERN.clone(), "Invalid phone format".to_string()),
        ]
    }

    pub fn confirm_password(password_field: &str) -> Vec<Rule> {
        vec![
            Rule::required("Confirm your password"),
            Rule::equals_field(password_field, "Passwords do not match"),
        ]
    }
}

pub fn login_form() -> FormValidator {
    FormValidator::new()
        .field("email", rules::email())
        .field("password", vec![Rule::required("Password is required")])
}

pub fn registration_form() -> FormValidator {
    FormValidator::new()
        .field("name", rules::name())
        .field("phone", rules::phone())
        .field("email", rules::email())
        .field("password", rules::password_with_min(8))
        .field("confirm_password", rules::confirm_password("password"))
}

pub fn recovery_form() -> FormValidator {
    FormValidator::new().field("email", rules::email())
}

pub fn category_form() -> FormValidator {
    FormValidator::new()
        .field(
            "nombre",
            vec![
                Rule::required("Category name is required"),
                Rule::min_length(2, "Category name must be at least 2 characters"),
                Rule::max_length(50, "Category name cannot exceed 50 characters"),
            ],
        )
        .field(
            "descripcion",
            vec![Rule::max_length(200, "Description cannot exceed 200 characters")],
        )
}

pub fn product_form() -> FormValidator {
    FormValidator::new()
        .field("nombre", vec![Rule::required("Product name is required")])
        .field(
            "cantidad",
            vec![
                Rule::required("Quantity is required"),
                Rule::min(0.0, "Quantity cannot be negative"),
            ],
        )
        .field(
            "precio",
            vec![
                Rule::required("Price is required"),
                Rule::above(0.0, "Price must be greater than 0"),
            ],
        )
        .field("categoria_id", vec![Rule::required("Select a category")])
}
