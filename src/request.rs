//! Declarative aggregation request
//!
//! An [`AggregationSpec`] describes one aggregator: a name, a kind with its
//! parameters, and an ordered list of child specs. Specs are built once per
//! request with the fluent constructors below, validated before any
//! document is visited, and never mutated during execution.
//!
//! # Example
//!
//! ```rust
//! use aggtree::request::AggregationSpec;
//! use aggtree::predicate::Predicate;
//!
//! let spec = AggregationSpec::filter("tag1")
//!     .predicate(Predicate::term("tag", "tag1"))
//!     .sub_aggregation(AggregationSpec::average("avg_value").field("value"));
//! assert!(spec.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AggregationError, Result};
use crate::predicate::Predicate;

/// Kind-specific parameters of one aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationKind {
    /// Single-bucket filter; a missing predicate means match-all
    Filter {
        /// Bucket membership test (None = every document)
        predicate: Option<Predicate>,
    },

    /// Multi-bucket interval histogram over a numeric field
    Histogram {
        /// Numeric field supplying the bucket key
        field: String,
        /// Bucket width; keys are `floor(value / interval) * interval`
        interval: f64,
        /// Buckets with fewer documents are suppressed; `0` forces emission
        /// of empty buckets across the observed key span
        min_doc_count: u64,
    },

    /// Average metric over a numeric field
    Average {
        /// Target field; None inherits the active value context
        field: Option<String>,
    },
}

/// Declarative, immutable description of one aggregator and its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    /// Aggregation name; result nodes are addressed by it
    name: String,

    /// Kind and kind-specific parameters
    #[serde(flatten)]
    kind: AggregationKind,

    /// Ordered child aggregations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_aggregations: Vec<AggregationSpec>,
}

impl AggregationSpec {
    /// Create a filter aggregation with no predicate (match-all)
    pub fn filter(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AggregationKind::Filter { predicate: None },
            sub_aggregations: Vec::new(),
        }
    }

    /// Create a histogram aggregation over `field` with the given interval
    pub fn histogram(name: impl Into<String>, field: impl Into<String>, interval: f64) -> Self {
        Self {
            name: name.into(),
            kind: AggregationKind::Histogram {
                field: field.into(),
                interval,
                min_doc_count: 1,
            },
            sub_aggregations: Vec::new(),
        }
    }

    /// Create an average aggregation with no explicit field; the field is
    /// inherited from the enclosing value context unless [`Self::field`] is
    /// called
    pub fn average(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AggregationKind::Average { field: None },
            sub_aggregations: Vec::new(),
        }
    }

    /// Set the filter predicate (filter kind only; no effect on others)
    pub fn predicate(mut self, predicate: Predicate) -> Self {
        if let AggregationKind::Filter { predicate: p } = &mut self.kind {
            *p = Some(predicate);
        }
        self
    }

    /// Set the explicit target field (average kind only; no effect on
    /// others - histogram takes its field at construction)
    pub fn field(mut self, field: impl Into<String>) -> Self {
        if let AggregationKind::Average { field: f } = &mut self.kind {
            *f = Some(field.into());
        }
        self
    }

    /// Set the minimum document count per bucket (histogram kind only)
    pub fn min_doc_count(mut self, min: u64) -> Self {
        if let AggregationKind::Histogram { min_doc_count, .. } = &mut self.kind {
            *min_doc_count = min;
        }
        self
    }

    /// Append a child aggregation
    pub fn sub_aggregation(mut self, child: AggregationSpec) -> Self {
        self.sub_aggregations.push(child);
        self
    }

    /// Aggregation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind and parameters
    pub fn kind(&self) -> &AggregationKind {
        &self.kind
    }

    /// Ordered child specs
    pub fn sub_aggregations(&self) -> &[AggregationSpec] {
        &self.sub_aggregations
    }

    /// Validate this spec and all children
    ///
    /// Parameter defects (non-positive or non-finite interval, empty names,
    /// empty field references) reject the request here, before any document
    /// is visited. Context resolution is checked separately when the
    /// aggregator tree is instantiated, because it depends on inheritance.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(AggregationError::InvalidParameter {
                name: "<unnamed>".to_string(),
                reason: "aggregation name must not be empty".to_string(),
            });
        }
        match &self.kind {
            AggregationKind::Filter { .. } => {}
            AggregationKind::Histogram {
                field, interval, ..
            } => {
                if field.is_empty() {
                    return Err(AggregationError::InvalidParameter {
                        name: self.name.clone(),
                        reason: "histogram field must not be empty".to_string(),
                    });
                }
                if !interval.is_finite() || *interval <= 0.0 {
                    return Err(AggregationError::InvalidParameter {
                        name: self.name.clone(),
                        reason: format!("interval must be a finite positive number, got {interval}"),
                    });
                }
            }
            AggregationKind::Average { field } => {
                if let Some(f) = field {
                    if f.is_empty() {
                        return Err(AggregationError::InvalidParameter {
                            name: self.name.clone(),
                            reason: "field must not be empty".to_string(),
                        });
                    }
                }
            }
        }
        for child in &self.sub_aggregations {
            child.validate()?;
        }
        Ok(())
    }
}
