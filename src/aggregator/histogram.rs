//! Histogram bucket aggregator
//!
//! Multi-bucket kind: documents are routed by
//! `floor(value / interval) * interval` into interval-aligned buckets,
//! created lazily on first hit. Every bucket owns an independent deep copy
//! of the child sub-tree, instantiated from a prototype that is built once
//! (so context errors in children surface at construction) and never fed a
//! document itself.
//!
//! With `min_doc_count == 0` a post-collection pass synthesizes empty
//! buckets for every aligned key between the observed minimum and maximum;
//! their child sub-trees finalize to neutral values. Buckets below a
//! nonzero `min_doc_count` are suppressed from the result.

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::context::ValueContext;
use crate::document::Document;
use crate::error::{AggregationError, Result};
use crate::request::AggregationSpec;
use crate::result::ResultNode;

use super::{build_tree, merge_children, Aggregator};

/// Accumulated state of one histogram bucket
#[derive(Debug, Clone)]
struct BucketState {
    doc_count: u64,
    children: Vec<Aggregator>,
}

/// Multi-bucket interval histogram over a numeric field
#[derive(Debug, Clone)]
pub(crate) struct HistogramAggregator {
    name: String,
    field: String,
    interval: f64,
    min_doc_count: u64,
    max_buckets: usize,

    /// Value context this histogram establishes for its descendants
    context: ValueContext,

    /// Never-collected child sub-tree cloned into each new bucket
    prototype: Vec<Aggregator>,

    /// Live buckets keyed by `floor(value / interval)`
    buckets: BTreeMap<i64, BucketState>,

    /// Total documents routed into any bucket
    total_docs: u64,
}

impl HistogramAggregator {
    /// Build the histogram; children are instantiated once as a prototype
    /// under this histogram's own value context
    pub fn new(
        spec: &AggregationSpec,
        field: String,
        interval: f64,
        min_doc_count: u64,
        config: &EngineConfig,
    ) -> Result<Self> {
        let context = ValueContext::new(field.clone());
        let prototype = build_tree(spec.sub_aggregations(), Some(&context), config)?;
        Ok(Self {
            name: spec.name().to_string(),
            field,
            interval,
            min_doc_count,
            max_buckets: config.max_buckets,
            context,
            prototype,
            buckets: BTreeMap::new(),
            total_docs: 0,
        })
    }

    /// Aggregation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Route one document into its bucket; documents lacking the field are
    /// skipped
    pub fn collect(&mut self, doc: &Document) -> Result<()> {
        let Some(value) = doc.numeric(&self.field) else {
            return Ok(());
        };
        let idx = (value / self.interval).floor() as i64;

        if !self.buckets.contains_key(&idx) && self.buckets.len() >= self.max_buckets {
            return Err(AggregationError::TooManyBuckets {
                name: self.name.clone(),
                limit: self.max_buckets,
            });
        }
        let prototype = &self.prototype;
        let bucket = self.buckets.entry(idx).or_insert_with(|| BucketState {
            doc_count: 0,
            children: prototype.clone(),
        });

        bucket.doc_count += 1;
        self.total_docs += 1;
        for child in &mut bucket.children {
            child.collect(doc, Some(&self.context))?;
        }
        Ok(())
    }

    /// Fold a partial histogram from another partition into this one,
    /// merging buckets by key
    pub fn merge(&mut self, other: HistogramAggregator) -> Result<()> {
        self.total_docs += other.total_docs;
        for (idx, incoming) in other.buckets {
            match self.buckets.get_mut(&idx) {
                Some(bucket) => {
                    bucket.doc_count += incoming.doc_count;
                    merge_children(&mut bucket.children, incoming.children)?;
                }
                None => {
                    if self.buckets.len() >= self.max_buckets {
                        return Err(AggregationError::TooManyBuckets {
                            name: self.name.clone(),
                            limit: self.max_buckets,
                        });
                    }
                    self.buckets.insert(idx, incoming);
                }
            }
        }
        Ok(())
    }

    /// Synthesize empty buckets over the observed key span when
    /// `min_doc_count == 0`
    fn fill_empty_buckets(&mut self) -> Result<()> {
        let (Some(&min), Some(&max)) = (
            self.buckets.keys().next(),
            self.buckets.keys().next_back(),
        ) else {
            return Ok(());
        };

        // Keys come from a saturating f64-to-i64 cast, so extreme values can
        // sit near the i64 bounds; the span is computed in i128 to keep the
        // subtraction from overflowing before the limit check fires.
        let span = (max as i128 - min as i128) + 1;
        if span > self.max_buckets as i128 {
            return Err(AggregationError::TooManyBuckets {
                name: self.name.clone(),
                limit: self.max_buckets,
            });
        }
        for idx in min..=max {
            let prototype = &self.prototype;
            self.buckets.entry(idx).or_insert_with(|| BucketState {
                doc_count: 0,
                children: prototype.clone(),
            });
        }
        Ok(())
    }

    /// Finalize: fill or suppress buckets per `min_doc_count`, then emit
    /// one child node per bucket in ascending key order
    pub fn into_result(mut self) -> Result<ResultNode> {
        if self.min_doc_count == 0 {
            self.fill_empty_buckets()?;
        } else {
            let min = self.min_doc_count;
            self.buckets.retain(|_, b| b.doc_count >= min);
        }

        let interval = self.interval;
        let mut bucket_nodes = Vec::with_capacity(self.buckets.len());
        for (idx, bucket) in self.buckets {
            let key = idx as f64 * interval;
            let children = bucket
                .children
                .into_iter()
                .map(Aggregator::into_result)
                .collect::<Result<Vec<_>>>()?;
            let mut node = ResultNode::bucket(format_key(key), bucket.doc_count, children);
            node.key = Some(key);
            bucket_nodes.push(node);
        }

        Ok(ResultNode::bucket(self.name, self.total_docs, bucket_nodes))
    }
}

/// Bucket node name: integral keys print without a trailing `.0` so path
/// lookups read naturally (`histo.1.filter._count`). Non-integral keys
/// (interval 0.5 → bucket `"0.5"`) contain a `.` and are reachable only
/// through structural traversal (`get`), not through a dotted path.
fn format_key(key: f64) -> String {
    if key.fract() == 0.0 && key.abs() < 1e15 {
        format!("{}", key as i64)
    } else {
        format!("{}", key)
    }
}
