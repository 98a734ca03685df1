//! Engine configuration
//!
//! Limits that keep a single aggregation pass from consuming unbounded
//! memory. Configuration is plain data passed explicitly into the engine;
//! there is no process-global or environment-derived state. The struct is
//! serde-deserializable so it can live in the host application's TOML or
//! JSON configuration file.

use serde::{Deserialize, Serialize};

use crate::error::{AggregationError, Result};

/// Default bound on live buckets across one histogram instance
fn default_max_buckets() -> usize {
    65_536
}

/// Configuration for one aggregation engine instance
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Maximum number of live buckets a single multi-bucket aggregator may
    /// produce, counting synthesized empty buckets. Exceeding it fails the
    /// whole request with [`AggregationError::TooManyBuckets`].
    #[serde(default = "default_max_buckets")]
    pub max_buckets: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_buckets: default_max_buckets(),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_buckets == 0 {
            return Err(AggregationError::Configuration(
                "max_buckets must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_max_buckets_rejected() {
        let config = EngineConfig { max_buckets: 0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_buckets, 65_536);

        let config: EngineConfig = serde_json::from_str(r#"{"max_buckets": 16}"#).unwrap();
        assert_eq!(config.max_buckets, 16);
    }
}
