//! Audit configuration.

use crate::error::{AuditError, AuditResult};
use serde::{Deserialize, Serialize};

/// Smallest amount a claiming address may hold, in nanowits
pub const CLAIMING_ADDRESS_MIN_NANOWITS: u64 = 50_000_000_000;

/// Chunk sizes are `min_unit * base^k`
pub const DEFAULT_DENOMINATION_BASE: u64 = 10;

/// Denomination alphabet parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DenominationConfig {
    /// Smallest chunk; sub-minimum remainders round up to one of these
    pub min_unit: u64,
    /// Growth factor between chunk sizes
    pub base: u64,
}

impl Default for DenominationConfig {
    fn default() -> Self {
        Self {
            min_unit: CLAIMING_ADDRESS_MIN_NANOWITS,
            base: DEFAULT_DENOMINATION_BASE,
        }
    }
}

impl DenominationConfig {
    /// Check ranges
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `min_unit` is zero or `base` is below 2
    pub fn validate(&self) -> AuditResult<()> {
        if self.min_unit == 0 {
            return Err(AuditError::InvalidConfig {
                field: "min_unit".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.base < 2 {
            return Err(AuditError::InvalidConfig {
                field: "base".to_string(),
                reason: format!("must be at least 2, got {}", self.base),
            });
        }
        Ok(())
    }
}

/// Everything the pipeline needs besides the two input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Denomination alphabet
    pub denomination: DenominationConfig,
    /// How many seconds early a submitted timelock may be
    pub tolerance_seconds: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            denomination: DenominationConfig::default(),
            tolerance_seconds: 0,
        }
    }
}

impl AuditConfig {
    /// Parse from JSON; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` on parse failure, `InvalidConfig` on bad ranges
    pub fn from_json(json: &str) -> AuditResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AuditError::malformed("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the denomination parameters are out of range
    pub fn validate(&self) -> AuditResult<()> {
        self.denomination.validate()
    }
}
