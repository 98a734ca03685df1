//! Document abstraction
//!
//! The engine never talks to storage: it receives documents that have
//! already been matched by the query layer. A document is opaque beyond two
//! capabilities, "yield a numeric value for a named field" and "match or
//! not match a predicate". Duplicate indexed copies of logically identical
//! content are distinct documents here and are counted as such.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single field value inside a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric field (all numerics are widened to f64)
    Numeric(f64),
    /// Keyword field (exact-match string)
    Keyword(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Numeric(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Numeric(v as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Keyword(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Keyword(v)
    }
}

/// A matched document handed to the engine by the query layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Named fields
    fields: HashMap<String, FieldValue>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style)
    ///
    /// # Example
    ///
    /// ```rust
    /// use aggtree::document::Document;
    ///
    /// let doc = Document::new().with_field("tag", "tag1").with_field("value", 3.0);
    /// assert_eq!(doc.numeric("value"), Some(3.0));
    /// ```
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a raw field value
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Get a field as a numeric value, if present and numeric
    pub fn numeric(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Numeric(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get a field as a keyword, if present and a keyword
    pub fn keyword(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Keyword(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether the document carries the named field at all
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}
