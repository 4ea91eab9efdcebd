//! Participant proofs and the vesting policies they carry.

use crate::error::{AuditError, AuditResult};
use crate::time::{Duration, Timestamp};
use serde::{Deserialize, Serialize};

/// Cliff plus fixed-cadence installment policy
///
/// All durations are in seconds; `installment_wits` is in nanowits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VestingPolicy {
    /// Wait before the cliff starts counting
    pub delay: u64,
    /// Length of one installment period
    pub installment_length: u64,
    /// Cliff length
    pub cliff: u64,
    /// Amount released per installment
    pub installment_wits: u64,
}

impl VestingPolicy {
    /// Check that the policy can drive a schedule
    ///
    /// # Errors
    ///
    /// Returns `ScheduleDegenerate` if the installment length or unit is zero
    pub fn validate(&self) -> AuditResult<()> {
        if self.installment_length == 0 {
            return Err(AuditError::degenerate("installment_length must be positive"));
        }
        if self.installment_wits == 0 {
            return Err(AuditError::degenerate("installment_wits must be positive"));
        }
        Ok(())
    }

    /// Delay as a duration
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if not representable in milliseconds
    pub fn delay_duration(&self) -> AuditResult<Duration> {
        Duration::from_secs(self.delay).ok_or_else(|| AuditError::overflow("vesting delay"))
    }

    /// Cliff as a duration
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if not representable in milliseconds
    pub fn cliff_duration(&self) -> AuditResult<Duration> {
        Duration::from_secs(self.cliff).ok_or_else(|| AuditError::overflow("vesting cliff"))
    }

    /// Installment length as a duration
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if not representable in milliseconds
    pub fn installment_duration(&self) -> AuditResult<Duration> {
        Duration::from_secs(self.installment_length)
            .ok_or_else(|| AuditError::overflow("installment length"))
    }
}

/// Signed payload of a participant proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofData {
    /// Participant email, the claim lookup key together with `source`
    pub email_address: String,
    /// Participant display name
    pub name: String,
    /// Allocation source (`founder`, `saft`, `tip`, ...)
    pub source: String,
    /// Dollar amount the allocation was bought with, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd: Option<u64>,
    /// Total allocation in nanowits
    pub wit: u64,
    /// Vesting policy for the allocation
    pub vesting: VestingPolicy,
    /// Genesis instant in unix seconds
    pub genesis_date: u64,
}

/// A signed participant proof, as issued to the participant
///
/// The signature is opaque here; it is checked by a separate process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProof {
    /// Signed payload
    pub data: ProofData,
    /// Signature over `data`
    pub signature: serde_json::Value,
}

impl ParticipantProof {
    /// Parse a proof from JSON
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if a field is missing or has the wrong type
    pub fn from_json(json: &str) -> AuditResult<Self> {
        serde_json::from_str(json).map_err(|e| AuditError::malformed("participant proof", e.to_string()))
    }

    /// Genesis instant
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if not representable in milliseconds
    pub fn genesis_time(&self) -> AuditResult<Timestamp> {
        Timestamp::from_unix_seconds(self.data.genesis_date)
            .ok_or_else(|| AuditError::overflow("genesis date"))
    }
}
