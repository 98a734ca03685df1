//! Aggregation result tree
//!
//! The output of a finished aggregation pass: an immutable tree of named
//! nodes, each carrying a document count, kind-specific scalar outputs and
//! an insertion-ordered collection of child nodes. Nodes are addressed
//! structurally (`get("avg_value")`) or through a flattened dotted path
//! (`get_property("tag1.avg_value.value")`); `_count` resolves to the
//! document count of any node regardless of kind.
//!
//! Nothing here is mutable after construction; the tree is assembled only
//! once collection has completed, so a partially aggregated tree is never
//! observable.

use serde::Serialize;

use crate::error::{AggregationError, Result};

/// Scalar outcome of a dotted-path property lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    /// A document count (`_count`)
    Count(u64),
    /// A metric scalar (`value`)
    Value(f64),
}

impl PropertyValue {
    /// The value as f64, widening counts
    pub fn as_f64(&self) -> f64 {
        match self {
            PropertyValue::Count(c) => *c as f64,
            PropertyValue::Value(v) => *v,
        }
    }
}

/// One node of the result tree
#[derive(Debug, Clone, Serialize)]
pub struct ResultNode {
    /// Node name (aggregation name, or bucket key for histogram buckets)
    pub name: String,

    /// Number of documents that fell into this node
    pub doc_count: u64,

    /// Bucket key, present only on histogram buckets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<f64>,

    /// Metric scalar (`value`), present only on metric nodes. NaN (an
    /// average over zero documents) serializes as null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Child nodes in insertion order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResultNode>,
}

impl ResultNode {
    /// Create a bucket node with no scalar output
    pub(crate) fn bucket(name: impl Into<String>, doc_count: u64, children: Vec<ResultNode>) -> Self {
        Self {
            name: name.into(),
            doc_count,
            key: None,
            value: None,
            children,
        }
    }

    /// Create a metric node carrying a single scalar
    pub(crate) fn metric(name: impl Into<String>, doc_count: u64, value: f64) -> Self {
        Self {
            name: name.into(),
            doc_count,
            key: None,
            value: Some(value),
            children: Vec::new(),
        }
    }

    /// Look up a direct child by exact name
    pub fn get(&self, name: &str) -> Result<&ResultNode> {
        find(&self.children, name)
    }

    /// Resolve a dotted property path relative to this node
    ///
    /// Every segment but the last names a child; the final segment names a
    /// scalar output (`value`) or the universal `_count`. Node names that
    /// themselves contain a `.` (histogram buckets with non-integral keys)
    /// cannot be spelled in a path; traverse them with [`Self::get`].
    pub fn get_property(&self, path: &str) -> Result<PropertyValue> {
        resolve_property(&self.children, self, path)
    }

    /// The scalar output with the given name, if this kind exposes it
    fn scalar(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "_count" => Some(PropertyValue::Count(self.doc_count)),
            "value" => self.value.map(PropertyValue::Value),
            _ => None,
        }
    }
}

/// Root of the result tree: the named top-level aggregations of a request
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregationResults {
    /// Top-level result nodes in request order
    pub aggregations: Vec<ResultNode>,
}

impl AggregationResults {
    /// Look up a top-level aggregation by name
    pub fn get(&self, name: &str) -> Result<&ResultNode> {
        find(&self.aggregations, name)
    }

    /// Resolve a dotted property path from the root, e.g.
    /// `"tag1.avg_value.value"`
    pub fn get_property(&self, path: &str) -> Result<PropertyValue> {
        resolve_property(&self.aggregations, &EMPTY_ROOT, path)
    }

    /// Serialize the whole tree to a JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Sentinel node standing in for "the root" during path resolution; the
/// root itself has no scalars, so a single-segment path must name a child.
static EMPTY_ROOT: ResultNode = ResultNode {
    name: String::new(),
    doc_count: 0,
    key: None,
    value: None,
    children: Vec::new(),
};

fn find<'a>(nodes: &'a [ResultNode], name: &str) -> Result<&'a ResultNode> {
    nodes
        .iter()
        .find(|n| n.name == name)
        .ok_or_else(|| AggregationError::AggregationNotFound {
            name: name.to_string(),
        })
}

fn resolve_property(
    children: &[ResultNode],
    node: &ResultNode,
    path: &str,
) -> Result<PropertyValue> {
    let invalid = |reason: &str| AggregationError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(invalid("path must not be empty"));
    }

    let segments: Vec<&str> = path.split('.').collect();
    let (last, parents) = segments.split_last().ok_or_else(|| invalid("empty path"))?;

    let mut children = children;
    let mut node = node;
    for segment in parents {
        node = find(children, segment).map_err(|_| {
            invalid(&format!("no aggregation named '{segment}' on the path"))
        })?;
        children = &node.children;
    }

    // The final segment is a scalar when the node exposes one by that name,
    // otherwise it must still resolve as a child carrying a scalar-free
    // lookup error.
    if let Some(scalar) = node.scalar(last) {
        return Ok(scalar);
    }
    match find(children, last) {
        Ok(_) => Err(invalid(&format!(
            "'{last}' is an aggregation, not a scalar property"
        ))),
        Err(_) => Err(invalid(&format!("unknown property '{last}'"))),
    }
}
