//! Claim files: the derived reference and the untrusted submission.

use crate::error::{AuditError, AuditResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One timelocked reward: the part of an address entry the auditor compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimEntry {
    /// Amount in nanowits
    pub amount: u64,
    /// Unix seconds before which the amount cannot be spent
    pub timelock: u64,
}

impl ClaimEntry {
    /// Create a new entry
    #[must_use]
    pub const fn new(amount: u64, timelock: u64) -> Self {
        Self { amount, timelock }
    }
}

/// Claim recomputed from a participant proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceClaim {
    /// Participant email
    pub email_address: String,
    /// Participant name
    pub name: String,
    /// Allocation source
    pub source: String,
    /// Entries in schedule order
    pub addresses: Vec<ClaimEntry>,
    /// Always empty; disclaimers are checked elsewhere
    pub disclaimers: Value,
    /// Proof signature, copied through
    pub signature: Value,
}

/// Address entry of a submitted claim
///
/// Fields other than `amount` and `timelock` (the derived address and
/// anything the wallet adds) are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedEntry {
    /// Amount in nanowits
    pub amount: u64,
    /// Unix seconds
    pub timelock: u64,
    /// Address identifier fields
    #[serde(flatten)]
    pub identifiers: Map<String, Value>,
}

impl SubmittedEntry {
    /// The derived address, if the entry carries one
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.identifiers.get("address").and_then(Value::as_str)
    }

    /// Compared shape of this entry
    #[must_use]
    pub fn entry(&self) -> ClaimEntry {
        ClaimEntry::new(self.amount, self.timelock)
    }
}

impl From<ClaimEntry> for SubmittedEntry {
    fn from(entry: ClaimEntry) -> Self {
        Self {
            amount: entry.amount,
            timelock: entry.timelock,
            identifiers: Map::new(),
        }
    }
}

/// Claim file as submitted by a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedClaim {
    /// Participant email
    pub email_address: String,
    /// Participant name
    pub name: String,
    /// Allocation source
    pub source: String,
    /// Entries as submitted
    pub addresses: Vec<SubmittedEntry>,
    /// Signed disclaimers, opaque here
    #[serde(default)]
    pub disclaimers: Value,
    /// Proof signature as echoed by the wallet
    pub signature: Value,
}

impl SubmittedClaim {
    /// Parse a claim from JSON
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if a field is missing or has the wrong type
    pub fn from_json(json: &str) -> AuditResult<Self> {
        serde_json::from_str(json).map_err(|e| AuditError::malformed("claim file", e.to_string()))
    }

    /// Copy of this claim with every timelock replaced, in order
    ///
    /// # Errors
    ///
    /// Returns `AddressSetMismatch` if the number of timelocks differs from
    /// the number of entries
    pub fn with_timelocks(&self, timelocks: &[u64]) -> AuditResult<Self> {
        if timelocks.len() != self.addresses.len() {
            return Err(AuditError::AddressSetMismatch {
                index: None,
                reason: format!(
                    "{} timelocks for {} entries",
                    timelocks.len(),
                    self.addresses.len()
                ),
            });
        }
        let mut corrected = self.clone();
        for (entry, timelock) in corrected.addresses.iter_mut().zip(timelocks) {
            entry.timelock = *timelock;
        }
        Ok(corrected)
    }
}

impl From<ReferenceClaim> for SubmittedClaim {
    fn from(reference: ReferenceClaim) -> Self {
        Self {
            email_address: reference.email_address,
            name: reference.name,
            source: reference.source,
            addresses: reference.addresses.into_iter().map(SubmittedEntry::from).collect(),
            disclaimers: reference.disclaimers,
            signature: reference.signature,
        }
    }
}

/// The compared shape of a claim
///
/// Disclaimers and address identifiers are projected away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimProjection<'a> {
    /// Participant email
    pub email_address: &'a str,
    /// Participant name
    pub name: &'a str,
    /// Allocation source
    pub source: &'a str,
    /// Signature
    pub signature: &'a Value,
    /// Amount and timelock per entry
    pub entries: Vec<ClaimEntry>,
}

/// Types that can be reduced to a [`ClaimProjection`]
pub trait Project {
    /// Project onto the compared shape
    fn project(&self) -> ClaimProjection<'_>;
}

impl Project for ReferenceClaim {
    fn project(&self) -> ClaimProjection<'_> {
        ClaimProjection {
            email_address: &self.email_address,
            name: &self.name,
            source: &self.source,
            signature: &self.signature,
            entries: self.addresses.clone(),
        }
    }
}

impl Project for SubmittedClaim {
    fn project(&self) -> ClaimProjection<'_> {
        ClaimProjection {
            email_address: &self.email_address,
            name: &self.name,
            source: &self.source,
            signature: &self.signature,
            entries: self.addresses.iter().map(SubmittedEntry::entry).collect(),
        }
    }
}
