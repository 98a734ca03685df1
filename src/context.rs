//! Value context
//!
//! A value context names the numeric field that is "in scope" for a
//! sub-tree of the aggregation request. Bucket aggregators that operate on
//! a field (histogram) place their own field in scope for descendants, so a
//! metric aggregator below them may omit its `field` parameter and inherit
//! the binding instead.
//!
//! The context is plain data passed explicitly from parent to child during
//! construction and collection; there is no ambient or thread-local lookup.
//! That makes "metric with no resolvable field" a pure function of the spec
//! and its inherited context, raised before any document is visited.

use serde::{Deserialize, Serialize};

/// Scoped binding naming the numeric field descendants operate on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueContext {
    /// The in-scope numeric field
    field: String,
}

impl ValueContext {
    /// Create a context binding the given field
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// The field this context puts in scope
    pub fn field(&self) -> &str {
        &self.field
    }
}

/// Resolve the effective field for a metric aggregator: an explicit field
/// wins, otherwise the inherited context supplies one.
pub(crate) fn resolve_field<'a>(
    explicit: Option<&'a str>,
    inherited: Option<&'a ValueContext>,
) -> Option<&'a str> {
    explicit.or_else(|| inherited.map(ValueContext::field))
}
