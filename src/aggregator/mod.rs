//! Runtime aggregators
//!
//! An [`Aggregator`] is the stateful counterpart of an `AggregationSpec`:
//! it accumulates per-bucket state as documents are collected and is
//! consumed into an immutable `ResultNode` once collection completes. The
//! kinds form a closed set behind a common capability surface (`collect`,
//! `merge`, `into_result`); each kind owns its own accumulator shape rather
//! than sharing mutable base state.
//!
//! Lifecycle: built from specs at execution start (context errors surface
//! here, before any document is visited), mutated once per matching
//! document, optionally merged with same-shape partial trees from other
//! partitions, then consumed into the result tree.

mod average;
mod filter;
mod histogram;

pub(crate) use average::AverageAggregator;
pub(crate) use filter::FilterAggregator;
pub(crate) use histogram::HistogramAggregator;

use crate::config::EngineConfig;
use crate::context::ValueContext;
use crate::document::Document;
use crate::error::{AggregationError, Result};
use crate::request::{AggregationKind, AggregationSpec};
use crate::result::ResultNode;

/// Runtime aggregator, one variant per aggregation kind
#[derive(Debug, Clone)]
pub(crate) enum Aggregator {
    /// Single-bucket predicate filter
    Filter(FilterAggregator),
    /// Multi-bucket interval histogram
    Histogram(HistogramAggregator),
    /// Average metric
    Average(AverageAggregator),
}

impl Aggregator {
    /// Instantiate the aggregator (and its child sub-tree) for a spec
    ///
    /// `inherited` is the value context established by the enclosing
    /// bucket aggregator, if any. A metric spec that can resolve no field
    /// from either its parameters or `inherited` fails here.
    pub fn from_spec(
        spec: &AggregationSpec,
        inherited: Option<&ValueContext>,
        config: &EngineConfig,
    ) -> Result<Self> {
        match spec.kind() {
            AggregationKind::Filter { predicate } => Ok(Aggregator::Filter(
                FilterAggregator::new(spec, predicate.clone(), inherited, config)?,
            )),
            AggregationKind::Histogram {
                field,
                interval,
                min_doc_count,
            } => Ok(Aggregator::Histogram(HistogramAggregator::new(
                spec,
                field.clone(),
                *interval,
                *min_doc_count,
                config,
            )?)),
            AggregationKind::Average { field } => Ok(Aggregator::Average(
                AverageAggregator::new(spec.name(), field.clone(), inherited)?,
            )),
        }
    }

    /// Aggregation name, copied from the spec
    pub fn name(&self) -> &str {
        match self {
            Aggregator::Filter(a) => a.name(),
            Aggregator::Histogram(a) => a.name(),
            Aggregator::Average(a) => a.name(),
        }
    }

    /// Feed one document, routing it into whichever buckets it falls into
    pub fn collect(&mut self, doc: &Document, ctx: Option<&ValueContext>) -> Result<()> {
        match self {
            Aggregator::Filter(a) => a.collect(doc, ctx),
            Aggregator::Histogram(a) => a.collect(doc),
            Aggregator::Average(a) => a.collect(doc, ctx),
        }
    }

    /// Merge a same-shape partial aggregator collected over another
    /// document partition into this one
    pub fn merge(&mut self, other: Aggregator) -> Result<()> {
        if self.name() != other.name() {
            return Err(AggregationError::KindMismatch {
                name: other.name().to_string(),
            });
        }
        match (self, other) {
            (Aggregator::Filter(a), Aggregator::Filter(b)) => a.merge(b),
            (Aggregator::Histogram(a), Aggregator::Histogram(b)) => a.merge(b),
            (Aggregator::Average(a), Aggregator::Average(b)) => {
                a.merge(&b);
                Ok(())
            }
            (this, _) => Err(AggregationError::KindMismatch {
                name: this.name().to_string(),
            }),
        }
    }

    /// Finalize accumulated state and produce the immutable result node
    ///
    /// Children finalize before parents; a bucket that never saw a document
    /// still finalizes every metric below it to its neutral value.
    pub fn into_result(self) -> Result<ResultNode> {
        match self {
            Aggregator::Filter(a) => a.into_result(),
            Aggregator::Histogram(a) => a.into_result(),
            Aggregator::Average(a) => Ok(a.into_result()),
        }
    }
}

/// Instantiate one aggregator per spec, preserving request order
pub(crate) fn build_tree(
    specs: &[AggregationSpec],
    inherited: Option<&ValueContext>,
    config: &EngineConfig,
) -> Result<Vec<Aggregator>> {
    specs
        .iter()
        .map(|spec| Aggregator::from_spec(spec, inherited, config))
        .collect()
}

/// Merge two parallel child sub-trees, position by position
///
/// Both sides were instantiated from the same ordered spec list, so a name
/// or length mismatch means the partial trees do not belong to the same
/// request.
pub(crate) fn merge_children(own: &mut Vec<Aggregator>, other: Vec<Aggregator>) -> Result<()> {
    if own.len() != other.len() {
        return Err(AggregationError::KindMismatch {
            name: own
                .first()
                .map(|a| a.name().to_string())
                .unwrap_or_default(),
        });
    }
    for (a, b) in own.iter_mut().zip(other) {
        a.merge(b)?;
    }
    Ok(())
}
