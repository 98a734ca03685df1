//! aggtree - Hierarchical aggregation engine for document search
//!
//! Given a set of already-matched documents, this library computes nested
//! statistics - counts and averages partitioned into buckets defined by
//! filters or interval histograms - and exposes the results as an
//! addressable tree:
//!
//! - **Bucket aggregators** (filter, histogram) partition documents into
//!   named buckets, each owning an independent sub-tree of child
//!   aggregators
//! - **Metric aggregators** (average) consume numeric values and finalize
//!   to a scalar
//! - A **value context** propagates the in-scope numeric field down the
//!   tree, so metrics below a histogram may omit their field parameter
//! - The **result tree** supports structural traversal by name and
//!   flattened dotted-path access (`"tag1.avg_value.value"`)
//!
//! Storage, indexing and the query evaluation that decides which documents
//! match are external collaborators: the engine is handed exactly the
//! documents it must count.
//!
//! # Example
//!
//! ```rust
//! use aggtree::{AggregationEngine, AggregationSpec, Document, Predicate};
//!
//! let docs = vec![
//!     Document::new().with_field("tag", "tag1").with_field("value", 1.0),
//!     Document::new().with_field("tag", "tag1").with_field("value", 3.0),
//!     Document::new().with_field("tag", "tag2").with_field("value", 9.0),
//! ];
//!
//! let spec = AggregationSpec::filter("tag1")
//!     .predicate(Predicate::term("tag", "tag1"))
//!     .sub_aggregation(AggregationSpec::average("avg_value").field("value"));
//!
//! let results = AggregationEngine::new().execute(&docs, &[spec]).unwrap();
//! assert_eq!(results.get("tag1").unwrap().doc_count, 2);
//! assert_eq!(results.get_property("tag1.avg_value.value").unwrap().as_f64(), 2.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod aggregator;

pub mod config;
pub mod context;
pub mod document;
pub mod engine;
pub mod error;
pub mod predicate;
pub mod request;
pub mod result;

// Re-export main types
pub use config::EngineConfig;
pub use context::ValueContext;
pub use document::{Document, FieldValue};
pub use engine::AggregationEngine;
pub use error::{AggregationError, Result};
pub use predicate::Predicate;
pub use request::{AggregationKind, AggregationSpec};
pub use result::{AggregationResults, PropertyValue, ResultNode};
