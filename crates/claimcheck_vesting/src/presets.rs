//! Vesting policies assigned per allocation source when proofs are issued.

use claimcheck_core::VestingPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DAY: u64 = 86_400;

/// Allocation source of a participant proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePreset {
    /// Debt payable by assets
    Dpa,
    /// Foundation reserve
    Foundation,
    /// Founders
    Founder,
    /// Pre-purchase agreement
    Ppa,
    /// Simple agreement for future tokens
    Saft,
    /// Stakeholders
    Stakeholder,
    /// Testnet incentives program
    Tip,
}

impl SourcePreset {
    /// All known sources
    pub const ALL: [SourcePreset; 7] = [
        Self::Dpa,
        Self::Foundation,
        Self::Founder,
        Self::Ppa,
        Self::Saft,
        Self::Stakeholder,
        Self::Tip,
    ];

    /// Source name as it appears in proofs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dpa => "dpa",
            Self::Foundation => "foundation",
            Self::Founder => "founder",
            Self::Ppa => "ppa",
            Self::Saft => "saft",
            Self::Stakeholder => "stakeholder",
            Self::Tip => "tip",
        }
    }

    /// `(delay, cliff, installment_length, installments)`
    const fn shape(&self) -> (u64, u64, u64, u64) {
        match self {
            // 6 month cliff, then 15 day installments over 2 years
            Self::Founder | Self::Stakeholder => (0, 180 * DAY, 15 * DAY, 48),
            // 14 day cliff, then 14 day installments over 6 months
            Self::Tip => (0, 14 * DAY, 14 * DAY, 12),
            Self::Dpa | Self::Foundation | Self::Ppa | Self::Saft => UNVESTED,
        }
    }

    /// Number of installments the allocation is spread over
    #[must_use]
    pub const fn installments(&self) -> u64 {
        self.shape().3
    }

    /// Policy for an allocation of `total_nanowits`
    #[must_use]
    pub const fn policy(&self, total_nanowits: u64) -> VestingPolicy {
        shape_to_policy(self.shape(), total_nanowits)
    }
}

const UNVESTED: (u64, u64, u64, u64) = (0, 0, 0, 1);

const fn shape_to_policy(shape: (u64, u64, u64, u64), total_nanowits: u64) -> VestingPolicy {
    let (delay, cliff, installment_length, installments) = shape;
    VestingPolicy {
        delay,
        installment_length,
        cliff,
        installment_wits: total_nanowits / installments,
    }
}

impl fmt::Display for SourcePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourcePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown source: {}", s))
    }
}

/// Policy for any source name; unknown sources are unvested
#[must_use]
pub fn policy_for_source(source: &str, total_nanowits: u64) -> VestingPolicy {
    source
        .parse::<SourcePreset>()
        .map_or_else(|_| shape_to_policy(UNVESTED, total_nanowits), |p| p.policy(total_nanowits))
}
