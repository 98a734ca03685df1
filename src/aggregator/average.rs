//! Average metric aggregator
//!
//! Leaf computation: accumulates a running sum and count of the numeric
//! values observed during collection, finalizing to `sum / count`. An
//! average that saw no documents finalizes to NaN rather than raising, so
//! empty buckets above it (a histogram with `min_doc_count == 0`) remain
//! valid.

use crate::context::{resolve_field, ValueContext};
use crate::document::Document;
use crate::error::{AggregationError, Result};

/// Sum/count accumulator for the average of a numeric field
#[derive(Debug, Clone)]
pub(crate) struct AverageAggregator {
    name: String,

    /// Explicit target field; None defers to the value context active at
    /// each collect call
    field: Option<String>,

    sum: f64,
    count: u64,
}

impl AverageAggregator {
    /// Create the aggregator, failing if neither an explicit field nor the
    /// inherited context can supply one
    pub fn new(
        name: &str,
        field: Option<String>,
        inherited: Option<&ValueContext>,
    ) -> Result<Self> {
        if resolve_field(field.as_deref(), inherited).is_none() {
            return Err(AggregationError::MissingContext {
                name: name.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            field,
            sum: 0.0,
            count: 0,
        })
    }

    /// Aggregation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observe one document; documents lacking the resolved field are
    /// skipped without affecting sum or count
    pub fn collect(&mut self, doc: &Document, ctx: Option<&ValueContext>) -> Result<()> {
        let field = resolve_field(self.field.as_deref(), ctx).ok_or_else(|| {
            AggregationError::MissingContext {
                name: self.name.clone(),
            }
        })?;
        if let Some(value) = doc.numeric(field) {
            self.sum += value;
            self.count += 1;
        }
        Ok(())
    }

    /// Fold a partial accumulator from another partition into this one
    pub fn merge(&mut self, other: &AverageAggregator) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Finalize: `sum / count`, NaN when nothing was observed
    pub fn into_result(self) -> crate::result::ResultNode {
        let value = if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        };
        crate::result::ResultNode::metric(self.name, self.count, value)
    }
}
