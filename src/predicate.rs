//! Match predicates
//!
//! A predicate is the filter aggregator's membership test. The engine does
//! not evaluate the enclosing search query (that happens upstream); these
//! predicates only decide which already-matched documents fall into a
//! filter bucket.
//!
//! An empty conjunction matches every document. The original system once
//! crashed on empty filter declarations, so "empty means match-all" is a
//! documented contract here, not an accident of evaluation order.
//!
//! The recursive variants use struct fields rather than newtype payloads:
//! an internally-tagged newtype variant wrapping a sequence does not
//! serialize, and the trait resolution for that shape diverges at compile
//! time.

use serde::{Deserialize, Serialize};

use crate::document::{Document, FieldValue};

/// A boolean membership test over a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every document
    MatchAll,

    /// Exact match on a single field
    Term {
        /// Field to test
        field: String,
        /// Value the field must equal
        value: FieldValue,
    },

    /// Half-open numeric range test: `from <= field < to`
    Range {
        /// Numeric field to test
        field: String,
        /// Inclusive lower bound (None = unbounded)
        from: Option<f64>,
        /// Exclusive upper bound (None = unbounded)
        to: Option<f64>,
    },

    /// Conjunction; empty matches everything
    And {
        /// Clauses that must all match
        clauses: Vec<Predicate>,
    },

    /// Disjunction; empty matches nothing
    Or {
        /// Clauses of which at least one must match
        clauses: Vec<Predicate>,
    },

    /// Negation
    Not {
        /// Clause that must not match
        clause: Box<Predicate>,
    },
}

impl Predicate {
    /// Build a term predicate
    pub fn term(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Predicate::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Build a numeric range predicate
    pub fn range(field: impl Into<String>, from: Option<f64>, to: Option<f64>) -> Self {
        Predicate::Range {
            field: field.into(),
            from,
            to,
        }
    }

    /// Build a conjunction
    pub fn and(clauses: Vec<Predicate>) -> Self {
        Predicate::And { clauses }
    }

    /// Build a disjunction
    pub fn or(clauses: Vec<Predicate>) -> Self {
        Predicate::Or { clauses }
    }

    /// Build a negation
    pub fn not(clause: Predicate) -> Self {
        Predicate::Not {
            clause: Box::new(clause),
        }
    }

    /// Evaluate the predicate against a document
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Predicate::MatchAll => true,
            Predicate::Term { field, value } => doc.field(field) == Some(value),
            Predicate::Range { field, from, to } => match doc.numeric(field) {
                Some(v) => from.map_or(true, |f| v >= f) && to.map_or(true, |t| v < t),
                None => false,
            },
            // Empty conjunction is vacuously true: a filter declared with no
            // clauses behaves like match-all.
            Predicate::And { clauses } => clauses.iter().all(|p| p.matches(doc)),
            Predicate::Or { clauses } => clauses.iter().any(|p| p.matches(doc)),
            Predicate::Not { clause } => !clause.matches(doc),
        }
    }
}
