//! Filter bucket aggregator
//!
//! Single-bucket kind: documents passing the predicate land in the one
//! bucket, which owns exactly one child sub-tree instance. A filter with no
//! predicate counts every document - "no predicate" is resolved to an
//! explicit match-all at construction, never left as an absent value to
//! trip over during collection.

use crate::config::EngineConfig;
use crate::context::ValueContext;
use crate::document::Document;
use crate::error::Result;
use crate::predicate::Predicate;
use crate::request::AggregationSpec;
use crate::result::ResultNode;

use super::{build_tree, merge_children, Aggregator};

/// Single-bucket predicate filter
#[derive(Debug, Clone)]
pub(crate) struct FilterAggregator {
    name: String,
    predicate: Predicate,
    doc_count: u64,
    children: Vec<Aggregator>,
}

impl FilterAggregator {
    /// Build the filter and its child sub-tree; the parent's value context
    /// passes through to children unchanged
    pub fn new(
        spec: &AggregationSpec,
        predicate: Option<Predicate>,
        inherited: Option<&ValueContext>,
        config: &EngineConfig,
    ) -> Result<Self> {
        Ok(Self {
            name: spec.name().to_string(),
            predicate: predicate.unwrap_or(Predicate::MatchAll),
            doc_count: 0,
            children: build_tree(spec.sub_aggregations(), inherited, config)?,
        })
    }

    /// Aggregation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Count the document and forward it to every child if it matches
    pub fn collect(&mut self, doc: &Document, ctx: Option<&ValueContext>) -> Result<()> {
        if !self.predicate.matches(doc) {
            return Ok(());
        }
        self.doc_count += 1;
        for child in &mut self.children {
            child.collect(doc, ctx)?;
        }
        Ok(())
    }

    /// Fold a partial filter from another partition into this one
    pub fn merge(&mut self, other: FilterAggregator) -> Result<()> {
        self.doc_count += other.doc_count;
        merge_children(&mut self.children, other.children)
    }

    /// Finalize into the single named bucket
    pub fn into_result(self) -> Result<ResultNode> {
        let children = self
            .children
            .into_iter()
            .map(Aggregator::into_result)
            .collect::<Result<Vec<_>>>()?;
        Ok(ResultNode::bucket(self.name, self.doc_count, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(spec: &AggregationSpec) -> FilterAggregator {
        match Aggregator::from_spec(spec, None, &EngineConfig::default()).unwrap() {
            Aggregator::Filter(f) => f,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_counts_only_matches() {
        let spec = AggregationSpec::filter("tag1").predicate(Predicate::term("tag", "tag1"));
        let mut agg = build(&spec);

        for tag in ["tag1", "tag2", "tag1"] {
            agg.collect(&Document::new().with_field("tag", tag), None)
                .unwrap();
        }

        let node = agg.into_result().unwrap();
        assert_eq!(node.doc_count, 2);
    }

    #[test]
    fn test_missing_predicate_counts_everything() {
        let mut agg = build(&AggregationSpec::filter("all"));
        for _ in 0..4 {
            agg.collect(&Document::new(), None).unwrap();
        }
        assert_eq!(agg.into_result().unwrap().doc_count, 4);
    }

    #[test]
    fn test_duplicate_documents_count_twice() {
        // Physical matches, not de-duplicated logical documents
        let spec = AggregationSpec::filter("tag1").predicate(Predicate::term("tag", "tag1"));
        let mut agg = build(&spec);

        let doc = Document::new().with_field("tag", "tag1");
        agg.collect(&doc, None).unwrap();
        agg.collect(&doc.clone(), None).unwrap();

        assert_eq!(agg.into_result().unwrap().doc_count, 2);
    }

    #[test]
    fn test_forwards_to_children() {
        let spec = AggregationSpec::filter("tag1")
            .predicate(Predicate::term("tag", "tag1"))
            .sub_aggregation(AggregationSpec::average("avg_value").field("value"));
        let mut agg = build(&spec);

        for (tag, value) in [("tag1", 1.0), ("tag1", 3.0), ("tag2", 100.0)] {
            let doc = Document::new().with_field("tag", tag).with_field("value", value);
            agg.collect(&doc, None).unwrap();
        }

        let node = agg.into_result().unwrap();
        assert_eq!(node.doc_count, 2);
        let avg = node.get("avg_value").unwrap();
        assert_eq!(avg.value, Some(2.0));
    }
}
