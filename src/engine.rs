//! Aggregation execution engine
//!
//! Drives a request end to end: validate the specs, instantiate the
//! aggregator tree, visit every matching document once, finalize post-order
//! and assemble the immutable result tree. Any build-time or context error
//! fails the whole request before or during the pass - partial results are
//! never returned alongside an error.
//!
//! # Example
//!
//! ```rust
//! use aggtree::{AggregationEngine, AggregationSpec, Document, Predicate};
//!
//! let docs = vec![
//!     Document::new().with_field("tag", "tag1").with_field("value", 1.0),
//!     Document::new().with_field("tag", "tag2").with_field("value", 9.0),
//! ];
//! let spec = AggregationSpec::filter("tag1").predicate(Predicate::term("tag", "tag1"));
//!
//! let engine = AggregationEngine::new();
//! let results = engine.execute(&docs, &[spec]).unwrap();
//! assert_eq!(results.get("tag1").unwrap().doc_count, 1);
//! ```

use tracing::debug;

use crate::aggregator::{self, Aggregator};
use crate::config::EngineConfig;
use crate::document::Document;
use crate::error::Result;
use crate::request::AggregationSpec;
use crate::result::{AggregationResults, ResultNode};

/// Executes aggregation requests over already-matched documents
#[derive(Debug, Clone, Default)]
pub struct AggregationEngine {
    config: EngineConfig,
}

impl AggregationEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Execute the request over one document partition
    ///
    /// Documents are visited in slice order, but results are independent of
    /// that order: every accumulator is a commutative, associative
    /// reduction, which is what permits the partitioned variant below.
    pub fn execute(
        &self,
        documents: &[Document],
        root_specs: &[AggregationSpec],
    ) -> Result<AggregationResults> {
        let mut roots = self.build_roots(root_specs)?;
        debug!(
            documents = documents.len(),
            roots = roots.len(),
            "starting aggregation pass"
        );

        for doc in documents {
            for root in &mut roots {
                root.collect(doc, None)?;
            }
        }

        let results = finalize(roots)?;
        debug!(aggregations = results.aggregations.len(), "aggregation pass complete");
        Ok(results)
    }

    /// Execute the request over independent document partitions and reduce
    ///
    /// Each partition gets its own replica of the aggregator tree (no state
    /// is shared, so partitions may be collected on separate threads by the
    /// caller); the partial trees are then merged by structural same-name
    /// match: bucket counts sum, metric sums and counts sum before the
    /// final division.
    pub fn execute_partitioned(
        &self,
        partitions: &[&[Document]],
        root_specs: &[AggregationSpec],
    ) -> Result<AggregationResults> {
        let mut merged = self.build_roots(root_specs)?;
        debug!(
            partitions = partitions.len(),
            roots = merged.len(),
            "starting partitioned aggregation pass"
        );

        for partition in partitions {
            let mut roots = self.build_roots(root_specs)?;
            for doc in *partition {
                for root in &mut roots {
                    root.collect(doc, None)?;
                }
            }
            for (target, partial) in merged.iter_mut().zip(roots) {
                target.merge(partial)?;
            }
        }

        finalize(merged)
    }

    /// Validate the request and instantiate one root aggregator per spec,
    /// with no inherited value context
    fn build_roots(&self, root_specs: &[AggregationSpec]) -> Result<Vec<Aggregator>> {
        self.config.validate()?;
        for spec in root_specs {
            spec.validate()?;
        }
        aggregator::build_tree(root_specs, None, &self.config)
    }
}

/// Consume the collected aggregators into the immutable result tree
fn finalize(roots: Vec<Aggregator>) -> Result<AggregationResults> {
    let aggregations = roots
        .into_iter()
        .map(Aggregator::into_result)
        .collect::<Result<Vec<ResultNode>>>()?;
    Ok(AggregationResults { aggregations })
}
