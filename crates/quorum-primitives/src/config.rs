//! Protocol constants
//!
//! These values are fixed at deployment time and must agree between proof
//! producers and the settlement contract.

use serde::{Deserialize, Serialize};

use crate::error::PrimitivesError;

/// Claims per batch
pub const BATCH_CAPACITY: usize = 20;

/// Default settle condition: 66.66%
pub const THRESHOLD_NUMERATOR: u64 = 6666;

/// Fixed-point denominator for the settle condition
pub const THRESHOLD_DENOMINATOR: u64 = 10_000;

/// Depth of the membership map and the verified-message ledger. At full
/// digest width every key has a leaf of its own.
pub const MAP_DEPTH: usize = 256;

/// Deepest supported sparse map: one level per digest bit
pub const MAX_MAP_DEPTH: usize = 256;

/// Deployment parameters shared by provers and the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Number of claims in every batch
    pub batch_capacity: usize,

    /// Settle condition numerator
    pub threshold_numerator: u64,

    /// Settle condition denominator
    pub threshold_denominator: u64,

    /// Sparse map depth (1..=256)
    pub map_depth: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            batch_capacity: BATCH_CAPACITY,
            threshold_numerator: THRESHOLD_NUMERATOR,
            threshold_denominator: THRESHOLD_DENOMINATOR,
            map_depth: MAP_DEPTH,
        }
    }
}

impl ProtocolConfig {
    /// Small batches for local testing
    pub fn small_batches() -> Self {
        Self {
            batch_capacity: 4,
            ..Self::default()
        }
    }

    pub fn with_batch_capacity(mut self, batch_capacity: usize) -> Self {
        self.batch_capacity = batch_capacity;
        self
    }

    pub fn with_threshold(mut self, numerator: u64, denominator: u64) -> Self {
        self.threshold_numerator = numerator;
        self.threshold_denominator = denominator;
        self
    }

    pub fn with_map_depth(mut self, map_depth: usize) -> Self {
        self.map_depth = map_depth;
        self
    }

    /// Check the parameters are usable
    pub fn validate(&self) -> Result<(), PrimitivesError> {
        if self.batch_capacity == 0 {
            return Err(PrimitivesError::InvalidConfig(
                "batch_capacity must be greater than zero".to_string(),
            ));
        }
        if self.threshold_denominator == 0 {
            return Err(PrimitivesError::InvalidConfig(
                "threshold_denominator must be greater than zero".to_string(),
            ));
        }
        if self.threshold_numerator > self.threshold_denominator {
            return Err(PrimitivesError::InvalidConfig(format!(
                "threshold {}/{} exceeds 100%",
                self.threshold_numerator, self.threshold_denominator
            )));
        }
        if self.map_depth == 0 || self.map_depth > MAX_MAP_DEPTH {
            return Err(PrimitivesError::InvalidConfig(format!(
                "map_depth must be in 1..={MAX_MAP_DEPTH}, got {}",
                self.map_depth
            )));
        }
        Ok(())
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, PrimitivesError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PrimitivesError::InvalidConfig(format!("JSON error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Fixed-point settle condition:
    /// `numerator * signers_count <= count * denominator`
    pub fn threshold_met(&self, count: u64, signers_count: u64) -> bool {
        threshold_met(self.threshold_numerator, self.threshold_denominator, count, signers_count)
    }
}

/// `numerator / denominator <= count / signers_count`, without division.
///
/// Evaluated in u128 so no realistic committee size overflows.
pub fn threshold_met(numerator: u64, denominator: u64, count: u64, signers_count: u64) -> bool {
    (numerator as u128) * (signers_count as u128) <= (count as u128) * (denominator as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProtocolConfig::default();
        assert_eq!(config.batch_capacity, 20);
        assert_eq!(config.threshold_numerator, 6666);
        assert_eq!(config.threshold_denominator, 10_000);
        assert_eq!(config.map_depth, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_boundary() {
        let config = ProtocolConfig::default();
        // 44 * 10000 = 440000 >= 66 * 6666 = 439956
        assert!(config.threshold_met(44, 66));
        // 43 * 10000 = 430000 < 439956
        assert!(!config.threshold_met(43, 66));
    }

    #[test]
    fn test_threshold_no_overflow() {
        assert!(threshold_met(u64::MAX, u64::MAX, u64::MAX, u64::MAX));
        assert!(!threshold_met(u64::MAX, 1, 0, u64::MAX));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(ProtocolConfig::default().with_batch_capacity(0).validate().is_err());
        assert!(ProtocolConfig::default().with_threshold(3, 2).validate().is_err());
        assert!(ProtocolConfig::default().with_threshold(0, 0).validate().is_err());
        assert!(ProtocolConfig::default().with_map_depth(257).validate().is_err());
        assert!(ProtocolConfig::default().with_map_depth(32).validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = ProtocolConfig::from_json(r#"{"batch_capacity": 8}"#).unwrap();
        assert_eq!(config.batch_capacity, 8);
        assert_eq!(config.map_depth, MAP_DEPTH);
    }
}
