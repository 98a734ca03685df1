//! End-to-end aggregation engine tests
//!
//! Exercises the full pipeline - spec validation, tree construction,
//! collection, finalization and result-tree navigation - over small fixed
//! document fixtures:
//!
//! 1. **Filter counting** - predicate, match-all and empty-conjunction counts
//! 2. **Sub-aggregations** - nested metrics and dotted-path property access
//! 3. **Context inheritance** - histogram-supplied value context, context errors
//! 4. **Empty buckets** - `min_doc_count == 0` synthesis with live sub-trees
//! 5. **Partitioned execution** - shard-style replicate-and-merge reduction

use aggtree::{
    AggregationEngine, AggregationError, AggregationSpec, Document, Predicate, PropertyValue,
};

// =============================================================================
// Test Fixtures
// =============================================================================

const NUM_TAG1_DOCS: u64 = 3;
const NUM_TAG2_DOCS: u64 = 7;

/// Index fixture: 3 "tag1" documents with values 1..=3 and 7 "tag2"
/// documents with values 3..=9
fn index_docs() -> Vec<Document> {
    let mut docs = Vec::new();
    for i in 0..NUM_TAG1_DOCS {
        docs.push(
            Document::new()
                .with_field("tag", "tag1")
                .with_field("value", (i + 1) as f64),
        );
    }
    for i in NUM_TAG1_DOCS..(NUM_TAG1_DOCS + NUM_TAG2_DOCS) {
        docs.push(
            Document::new()
                .with_field("tag", "tag2")
                .with_field("value", i as f64)
                .with_field("name", format!("name{}", i)),
        );
    }
    docs
}

/// Fixture for empty-bucket synthesis: two documents with values 0 and 2,
/// leaving a gap at key 1
fn empty_bucket_docs() -> Vec<Document> {
    (0..2)
        .map(|i| Document::new().with_field("value", (i * 2) as f64))
        .collect()
}

// =============================================================================
// Filter Counting
// =============================================================================

#[test]
fn simple_filter() {
    let results = AggregationEngine::new()
        .execute(
            &index_docs(),
            &[AggregationSpec::filter("tag1").predicate(Predicate::term("tag", "tag1"))],
        )
        .unwrap();

    let filter = results.get("tag1").unwrap();
    assert_eq!(filter.name, "tag1");
    assert_eq!(filter.doc_count, NUM_TAG1_DOCS);
}

#[test]
fn empty_filter_declaration_matches_all() {
    // An empty conjunction is semantically empty but syntactically valid;
    // it must behave as match-all, not as an error or match-none.
    let results = AggregationEngine::new()
        .execute(
            &index_docs(),
            &[AggregationSpec::filter("tag1").predicate(Predicate::and(vec![]))],
        )
        .unwrap();

    assert_eq!(
        results.get("tag1").unwrap().doc_count,
        NUM_TAG1_DOCS + NUM_TAG2_DOCS
    );
}

#[test]
fn missing_predicate_matches_all() {
    let results = AggregationEngine::new()
        .execute(&index_docs(), &[AggregationSpec::filter("everything")])
        .unwrap();

    assert_eq!(
        results.get("everything").unwrap().doc_count,
        NUM_TAG1_DOCS + NUM_TAG2_DOCS
    );
}

#[test]
fn duplicate_indexed_documents_count_as_physical_matches() {
    // The engine is handed physical documents; duplicate indexed copies of
    // logically identical content each count.
    let mut docs = index_docs();
    let dup = Document::new()
        .with_field("tag", "tag2")
        .with_field("value", 5.0);
    docs.push(dup.clone());
    docs.push(dup);

    let results = AggregationEngine::new()
        .execute(
            &docs,
            &[AggregationSpec::filter("tag2").predicate(Predicate::term("tag", "tag2"))],
        )
        .unwrap();

    assert_eq!(results.get("tag2").unwrap().doc_count, NUM_TAG2_DOCS + 2);
}

// =============================================================================
// Sub-Aggregations & Property Paths
// =============================================================================

#[test]
fn filter_with_avg_sub_aggregation() {
    let results = AggregationEngine::new()
        .execute(
            &index_docs(),
            &[AggregationSpec::filter("tag1")
                .predicate(Predicate::term("tag", "tag1"))
                .sub_aggregation(AggregationSpec::average("avg_value").field("value"))],
        )
        .unwrap();

    let filter = results.get("tag1").unwrap();
    assert_eq!(filter.doc_count, NUM_TAG1_DOCS);
    assert_eq!(
        filter.get_property("_count").unwrap(),
        PropertyValue::Count(NUM_TAG1_DOCS)
    );

    // values 1 + 2 + 3 over 3 documents
    let expected = 6.0 / NUM_TAG1_DOCS as f64;
    let avg = filter.get("avg_value").unwrap();
    assert_eq!(avg.name, "avg_value");
    assert_eq!(avg.value, Some(expected));
    assert_eq!(
        filter.get_property("avg_value.value").unwrap(),
        PropertyValue::Value(expected)
    );
    assert_eq!(
        results.get_property("tag1.avg_value.value").unwrap(),
        PropertyValue::Value(expected)
    );
}

#[test]
fn absent_aggregation_name_is_an_error() {
    let results = AggregationEngine::new()
        .execute(&index_docs(), &[AggregationSpec::filter("tag1")])
        .unwrap();

    assert!(matches!(
        results.get("nope"),
        Err(AggregationError::AggregationNotFound { .. })
    ));
    assert!(matches!(
        results.get_property("tag1.nope"),
        Err(AggregationError::InvalidPath { .. })
    ));
}

// =============================================================================
// Context Inheritance
// =============================================================================

#[test]
fn context_based_sub_aggregation_without_source_fails() {
    // A field-less average under a filter has no value source to inherit;
    // the whole request must fail before any result is produced.
    let err = AggregationEngine::new()
        .execute(
            &index_docs(),
            &[AggregationSpec::filter("tag1")
                .predicate(Predicate::term("tag", "tag1"))
                .sub_aggregation(AggregationSpec::average("avg_value"))],
        )
        .unwrap_err();

    assert!(matches!(err, AggregationError::MissingContext { name } if name == "avg_value"));
}

#[test]
fn histogram_context_feeds_fieldless_average() {
    let results = AggregationEngine::new()
        .execute(
            &index_docs(),
            &[AggregationSpec::histogram("histo", "value", 100.0)
                .sub_aggregation(AggregationSpec::average("avg_value"))],
        )
        .unwrap();

    // Single bucket holding every document; the average inherits the
    // histogram's field. tag1 values are 1,2,3 and tag2 values 3..=9.
    let histo = results.get("histo").unwrap();
    assert_eq!(histo.children.len(), 1);
    let bucket = &histo.children[0];
    assert_eq!(bucket.doc_count, NUM_TAG1_DOCS + NUM_TAG2_DOCS);

    let sum: f64 = (1..=3).sum::<i64>() as f64 + (3..10).sum::<i64>() as f64;
    let expected = sum / (NUM_TAG1_DOCS + NUM_TAG2_DOCS) as f64;
    assert_eq!(bucket.get("avg_value").unwrap().value, Some(expected));
}

// =============================================================================
// Empty Buckets
// =============================================================================

#[test]
fn empty_aggregation() {
    // Histogram over values {0, 2} with interval 1 and min_doc_count 0:
    // bucket key 1 is synthesized with a live, never-fed sub-tree.
    let results = AggregationEngine::new()
        .execute(
            &empty_bucket_docs(),
            &[AggregationSpec::histogram("histo", "value", 1.0)
                .min_doc_count(0)
                .sub_aggregation(
                    AggregationSpec::filter("filter").predicate(Predicate::MatchAll),
                )],
        )
        .unwrap();

    let histo = results.get("histo").unwrap();
    assert_eq!(histo.children.len(), 3);

    let bucket = &histo.children[1];
    assert_eq!(bucket.key, Some(1.0));
    assert_eq!(bucket.doc_count, 0);

    let filter = bucket.get("filter").unwrap();
    assert_eq!(filter.name, "filter");
    assert_eq!(filter.doc_count, 0);

    // The same lookup through the flattened path
    assert_eq!(
        results.get_property("histo.1.filter._count").unwrap(),
        PropertyValue::Count(0)
    );
}

#[test]
fn empty_bucket_metric_finalizes_without_error() {
    let results = AggregationEngine::new()
        .execute(
            &empty_bucket_docs(),
            &[AggregationSpec::histogram("histo", "value", 1.0)
                .min_doc_count(0)
                .sub_aggregation(AggregationSpec::average("avg_value"))],
        )
        .unwrap();

    let empty = &results.get("histo").unwrap().children[1];
    let avg = empty.get("avg_value").unwrap();
    assert_eq!(avg.doc_count, 0);
    assert!(avg.value.unwrap().is_nan());
}

// =============================================================================
// Requests over the Wire
// =============================================================================

#[test]
fn request_arrives_as_json() {
    let json = r#"{
        "name": "tag1",
        "kind": "filter",
        "predicate": {"type": "term", "field": "tag", "value": "tag1"},
        "sub_aggregations": [
            {"name": "avg_value", "kind": "average", "field": "value"}
        ]
    }"#;
    let spec: AggregationSpec = serde_json::from_str(json).unwrap();

    let results = AggregationEngine::new()
        .execute(&index_docs(), &[spec])
        .unwrap();
    assert_eq!(
        results.get_property("tag1.avg_value.value").unwrap(),
        PropertyValue::Value(2.0)
    );
}

#[test]
fn results_serialize_to_json() {
    let results = AggregationEngine::new()
        .execute(
            &index_docs(),
            &[AggregationSpec::filter("tag1")
                .predicate(Predicate::term("tag", "tag1"))
                .sub_aggregation(AggregationSpec::average("avg_value").field("value"))],
        )
        .unwrap();

    let json = results.to_json();
    assert!(json.contains("\"name\":\"tag1\""));
    assert!(json.contains("\"doc_count\":3"));
    assert!(json.contains("\"avg_value\""));
}

// =============================================================================
// Partitioned Execution
// =============================================================================

#[test]
fn partitioned_execution_matches_single_pass() {
    let docs = index_docs();
    let specs = vec![
        AggregationSpec::filter("tag1")
            .predicate(Predicate::term("tag", "tag1"))
            .sub_aggregation(AggregationSpec::average("avg_value").field("value")),
        AggregationSpec::histogram("histo", "value", 2.0)
            .min_doc_count(0)
            .sub_aggregation(AggregationSpec::average("bucket_avg")),
    ];

    let engine = AggregationEngine::new();
    let single = engine.execute(&docs, &specs).unwrap();

    let (a, rest) = docs.split_at(4);
    let (b, c) = rest.split_at(3);
    let merged = engine.execute_partitioned(&[a, b, c], &specs).unwrap();

    assert_eq!(single.to_json(), merged.to_json());
}

#[test]
fn partition_boundaries_do_not_change_counts() {
    let docs = index_docs();
    let spec = AggregationSpec::filter("tag2").predicate(Predicate::term("tag", "tag2"));
    let engine = AggregationEngine::new();

    for split in [1, 5, 9] {
        let (left, right) = docs.split_at(split);
        let results = engine
            .execute_partitioned(&[left, right], std::slice::from_ref(&spec))
            .unwrap();
        assert_eq!(results.get("tag2").unwrap().doc_count, NUM_TAG2_DOCS);
    }
}
