//! Error types for the aggregation engine
//!
//! Errors are split by the phase that raises them: build-time validation
//! errors reject a request before any document is visited, context errors
//! abort aggregator construction, and lookup errors surface when navigating
//! a finished result tree.

use thiserror::Error;

/// Main error type for aggregation requests
#[derive(Error, Debug)]
pub enum AggregationError {
    /// A metric aggregator has neither an explicit field nor an inherited
    /// value context to resolve one from. Raised while the aggregator tree
    /// is built, before collection starts.
    #[error("aggregation '{name}' has no field and no value context to inherit one from")]
    MissingContext {
        /// Name of the offending aggregation
        name: String,
    },

    /// A kind-specific parameter failed build-time validation
    #[error("invalid parameter for aggregation '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending aggregation
        name: String,
        /// What was wrong with the parameter
        reason: String,
    },

    /// A histogram produced more live buckets than the configured bound
    #[error("aggregation '{name}' exceeded the bucket limit of {limit}")]
    TooManyBuckets {
        /// Name of the offending aggregation
        name: String,
        /// Configured `max_buckets` bound
        limit: usize,
    },

    /// A result-tree lookup named a child that does not exist
    #[error("no aggregation named '{name}' in results")]
    AggregationNotFound {
        /// The name that failed to resolve
        name: String,
    },

    /// A dotted property path could not be resolved
    #[error("invalid property path '{path}': {reason}")]
    InvalidPath {
        /// The full path as given
        path: String,
        /// Which part of the resolution failed
        reason: String,
    },

    /// Two partial trees disagreed structurally during a partition merge
    #[error("cannot merge aggregation '{name}': partial results have different kinds")]
    KindMismatch {
        /// Name of the aggregation that failed to merge
        name: String,
    },

    /// Engine configuration failed validation
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for aggregation operations
pub type Result<T> = std::result::Result<T, AggregationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_context_display() {
        let err = AggregationError::MissingContext {
            name: "avg_value".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("avg_value"));
        assert!(msg.contains("value context"));
    }

    #[test]
    fn test_invalid_path_display() {
        let err = AggregationError::InvalidPath {
            path: "avg_value.bogus".to_string(),
            reason: "unknown property 'bogus'".to_string(),
        };
        assert!(format!("{}", err).contains("avg_value.bogus"));
    }
}
