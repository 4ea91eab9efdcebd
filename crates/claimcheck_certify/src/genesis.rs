//! Genesis allocation assembly.
//!
//! Proofs are indexed by participant, each submitted claim is validated
//! against the reference derived from its proof, and the corrected entries of
//! accepted claims become the genesis allocation.

use crate::validator::{ClaimValidator, ValidationReport};
use claimcheck_core::{AuditConfig, AuditError, DenominationConfig, ParticipantProof, SubmittedClaim};
use claimcheck_vesting::{derive_reference, policy_for_source};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant identity: one proof per email and source
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantKey {
    /// Participant email
    pub email_address: String,
    /// Allocation source
    pub source: String,
}

impl ParticipantKey {
    fn new(email_address: &str, source: &str) -> Self {
        Self {
            email_address: email_address.to_string(),
            source: source.to_string(),
        }
    }
}

impl fmt::Display for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.email_address, self.source)
    }
}

/// Genesis assembly errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenesisError {
    /// Invalid audit configuration
    #[error("invalid audit config: {0}")]
    Config(#[source] AuditError),
    /// Two proofs for the same participant
    #[error("duplicate participant proof for {participant}")]
    DuplicateProof {
        /// Participant
        participant: ParticipantKey,
    },
    /// Claim without a matching proof
    #[error("no participant proof for claim by {participant}")]
    UnknownParticipant {
        /// Participant
        participant: ParticipantKey,
    },
    /// Second claim for the same participant
    #[error("participant {participant} has already claimed")]
    AlreadyClaimed {
        /// Participant
        participant: ParticipantKey,
    },
    /// The reference could not be derived from the proof
    #[error("cannot derive reference for {participant}: {cause}")]
    Reference {
        /// Participant
        participant: ParticipantKey,
        /// Derivation failure
        #[source]
        cause: AuditError,
    },
    /// The claim did not match its reference
    #[error("claim by {participant} rejected: {cause}")]
    Rejected {
        /// Participant
        participant: ParticipantKey,
        /// First failed check
        #[source]
        cause: AuditError,
    },
    /// An accepted entry has no address to allocate to
    #[error("claim by {participant} has no address at entry {index}")]
    MissingAddress {
        /// Participant
        participant: ParticipantKey,
        /// Entry index
        index: usize,
    },
}

/// One genesis output; amount and timelock are decimal strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisUtxo {
    /// Claiming address
    pub address: String,
    /// Amount in nanowits
    pub amount: String,
    /// Unix seconds
    pub timelock: String,
}

/// Genesis allocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBlock {
    /// All outputs, in claim processing order
    pub alloc: Vec<GenesisUtxo>,
}

impl GenesisBlock {
    /// Sum of all allocated amounts
    #[must_use]
    pub fn total_amount(&self) -> u128 {
        self.alloc
            .iter()
            .filter_map(|utxo| utxo.amount.parse::<u128>().ok())
            .sum()
    }
}

/// Result of a finished assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisSummary {
    /// The allocation
    pub block: GenesisBlock,
    /// Number of accepted claims
    pub accepted_claims: usize,
    /// Participants with a proof but no claim
    pub unclaimed: Vec<ParticipantKey>,
}

/// Builds the genesis allocation from proofs and claims
#[derive(Debug, Clone)]
pub struct GenesisAssembler {
    denomination: DenominationConfig,
    validator: ClaimValidator,
    pending: IndexMap<ParticipantKey, ParticipantProof>,
    claimed: IndexSet<ParticipantKey>,
    block: GenesisBlock,
}

impl GenesisAssembler {
    /// Create an assembler
    ///
    /// # Errors
    ///
    /// Returns `Config` if the audit config is out of range
    pub fn new(config: &AuditConfig) -> Result<Self, GenesisError> {
        config.validate().map_err(GenesisError::Config)?;
        Ok(Self {
            denomination: config.denomination,
            validator: ClaimValidator::from_config(config),
            pending: IndexMap::new(),
            claimed: IndexSet::new(),
            block: GenesisBlock::default(),
        })
    }

    /// Register a participant proof
    ///
    /// # Errors
    ///
    /// Returns `DuplicateProof` if the participant already has a proof
    pub fn add_proof(&mut self, proof: ParticipantProof) -> Result<(), GenesisError> {
        let participant = ParticipantKey::new(&proof.data.email_address, &proof.data.source);
        if self.pending.contains_key(&participant) || self.claimed.contains(&participant) {
            return Err(GenesisError::DuplicateProof { participant });
        }

        let preset = policy_for_source(&proof.data.source, proof.data.wit);
        if preset != proof.data.vesting {
            tracing::warn!(
                %participant,
                expected = ?preset,
                actual = ?proof.data.vesting,
                "proof vesting differs from the preset for its source"
            );
        }

        self.pending.insert(participant, proof);
        Ok(())
    }

    /// Number of proofs still waiting for a claim
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Validate a claim and append its entries to the allocation
    ///
    /// Nothing is appended unless the whole claim is accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the claim has no proof, was already processed,
    /// does not match its reference, or lacks an address
    pub fn add_claim(&mut self, claim: &SubmittedClaim) -> Result<ValidationReport, GenesisError> {
        let participant = ParticipantKey::new(&claim.email_address, &claim.source);
        if self.claimed.contains(&participant) {
            return Err(GenesisError::AlreadyClaimed { participant });
        }
        let Some(proof) = self.pending.get(&participant) else {
            return Err(GenesisError::UnknownParticipant { participant });
        };

        let reference = match derive_reference(proof, &self.denomination) {
            Ok(reference) => reference,
            Err(cause) => return Err(GenesisError::Reference { participant, cause }),
        };

        let outcome = self.validator.validate(&reference, claim);
        let report = outcome.report.clone();
        let corrected = match outcome.into_result() {
            Ok(corrected) => corrected,
            Err(cause) => return Err(GenesisError::Rejected { participant, cause }),
        };

        let mut utxos = Vec::with_capacity(corrected.addresses.len());
        for (index, entry) in corrected.addresses.iter().enumerate() {
            let Some(address) = entry.address() else {
                return Err(GenesisError::MissingAddress { participant, index });
            };
            utxos.push(GenesisUtxo {
                address: address.to_string(),
                amount: entry.amount.to_string(),
                timelock: entry.timelock.to_string(),
            });
        }

        tracing::info!(%participant, outputs = utxos.len(), "claim added to genesis allocation");
        self.block.alloc.extend(utxos);
        self.pending.shift_remove(&participant);
        self.claimed.insert(participant);
        Ok(report)
    }

    /// Finish assembly
    #[must_use]
    pub fn finish(self) -> GenesisSummary {
        let unclaimed: Vec<ParticipantKey> = self.pending.into_keys().collect();
        if !unclaimed.is_empty() {
            let names: Vec<String> = unclaimed.iter().map(ToString::to_string).collect();
            tracing::warn!(
                count = unclaimed.len(),
                participants = %names.join(", "),
                "participants have not submitted a claim"
            );
        }
        GenesisSummary {
            block: self.block,
            accepted_claims: self.claimed.len(),
            unclaimed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimcheck_core::{ProofData, SubmittedEntry, VestingPolicy};
    use serde_json::Value;

    const T0: u64 = 1_602_666_000;
    const MONTH: u64 = 2_592_000;
    const MIN: u64 = 50_000_000_000;

    fn proof(email: &str, source: &str, wit: u64) -> ParticipantProof {
        ParticipantProof {
            data: ProofData {
                email_address: email.to_string(),
                name: email.to_uppercase(),
                source: source.to_string(),
                usd: None,
                wit,
                vesting: VestingPolicy {
                    delay: 0,
                    installment_length: MONTH,
                    cliff: 0,
                    installment_wits: MIN,
                },
                genesis_date: T0,
            },
            signature: Value::from(format!("sig-{email}")),
        }
    }

    fn claim_for(proof: &ParticipantProof) -> SubmittedClaim {
        let reference = derive_reference(proof, &DenominationConfig::default()).unwrap();
        let mut claim = SubmittedClaim::from(reference);
        for (i, entry) in claim.addresses.iter_mut().enumerate() {
            entry.identifiers.insert(
                "address".to_string(),
                Value::from(format!("twit1{}{}", proof.data.email_address.len(), i)),
            );
        }
        claim
    }

    fn assembler() -> GenesisAssembler {
        GenesisAssembler::new(&AuditConfig::default()).unwrap()
    }

    #[test]
    fn test_assemble_allocation() {
        let alice = proof("alice@example.com", "saft", 2 * MIN);
        let bob = proof("bob@example.com", "dpa", MIN);

        let mut assembler = assembler();
        assembler.add_proof(alice.clone()).unwrap();
        assembler.add_proof(bob.clone()).unwrap();

        let report = assembler.add_claim(&claim_for(&alice)).unwrap();
        assert!(report.passed);
        assert_eq!(assembler.pending_count(), 1);

        let summary = assembler.finish();
        assert_eq!(summary.accepted_claims, 1);
        assert_eq!(summary.block.alloc.len(), 2);
        assert_eq!(summary.block.alloc[0].amount, MIN.to_string());
        assert_eq!(summary.block.alloc[1].timelock, (T0 + MONTH).to_string());
        assert_eq!(summary.block.total_amount(), u128::from(2 * MIN));
        assert_eq!(
            summary.unclaimed,
            vec![ParticipantKey::new("bob@example.com", "dpa")]
        );
    }

    #[test]
    fn test_same_email_different_sources() {
        let mut assembler = assembler();
        assembler.add_proof(proof("carol@example.com", "saft", MIN)).unwrap();
        assembler.add_proof(proof("carol@example.com", "ppa", MIN)).unwrap();
        assert_eq!(assembler.pending_count(), 2);
    }

    #[test]
    fn test_duplicate_proof() {
        let mut assembler = assembler();
        assembler.add_proof(proof("alice@example.com", "saft", MIN)).unwrap();
        assert!(matches!(
            assembler.add_proof(proof("alice@example.com", "saft", 2 * MIN)),
            Err(GenesisError::DuplicateProof { .. })
        ));
    }

    #[test]
    fn test_unknown_and_repeated_claims() {
        let alice = proof("alice@example.com", "saft", MIN);
        let mut assembler = assembler();
        assert!(matches!(
            assembler.add_claim(&claim_for(&alice)),
            Err(GenesisError::UnknownParticipant { .. })
        ));

        assembler.add_proof(alice.clone()).unwrap();
        assembler.add_claim(&claim_for(&alice)).unwrap();
        assert!(matches!(
            assembler.add_claim(&claim_for(&alice)),
            Err(GenesisError::AlreadyClaimed { .. })
        ));
    }

    #[test]
    fn test_rejected_claim_adds_nothing() {
        let alice = proof("alice@example.com", "saft", 2 * MIN);
        let mut claim = claim_for(&alice);
        claim.addresses[1].amount += 1;

        let mut assembler = assembler();
        assembler.add_proof(alice).unwrap();
        let err = assembler.add_claim(&claim).unwrap_err();
        assert!(matches!(
            err,
            GenesisError::Rejected {
                cause: AuditError::AddressSetMismatch { index: Some(1), .. },
                ..
            }
        ));
        assert_eq!(assembler.pending_count(), 1);
        assert!(assembler.finish().block.alloc.is_empty());
    }

    #[test]
    fn test_missing_address() {
        let alice = proof("alice@example.com", "saft", MIN);
        let mut claim = claim_for(&alice);
        claim.addresses[0] = SubmittedEntry {
            amount: claim.addresses[0].amount,
            timelock: claim.addresses[0].timelock,
            identifiers: serde_json::Map::new(),
        };

        let mut assembler = assembler();
        assembler.add_proof(alice).unwrap();
        assert!(matches!(
            assembler.add_claim(&claim),
            Err(GenesisError::MissingAddress { index: 0, .. })
        ));
    }

    #[test]
    fn test_degenerate_proof_surfaces_as_reference_error() {
        let alice = proof("alice@example.com", "saft", 0);
        let mut claim = claim_for(&proof("alice@example.com", "saft", MIN));
        claim.addresses.clear();

        let mut assembler = assembler();
        assembler.add_proof(alice).unwrap();
        assert!(matches!(
            assembler.add_claim(&claim),
            Err(GenesisError::Reference {
                cause: AuditError::ScheduleDegenerate { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_skewed_claim_is_snapped() {
        let alice = proof("alice@example.com", "saft", 2 * MIN);
        let mut claim = claim_for(&alice);
        claim.addresses[1].timelock -= 600;

        let config = AuditConfig {
            tolerance_seconds: 3_600,
            ..AuditConfig::default()
        };
        let mut assembler = GenesisAssembler::new(&config).unwrap();
        assembler.add_proof(alice).unwrap();
        let report = assembler.add_claim(&claim).unwrap();
        assert_eq!(report.skewed_entries, 1);
        assert_eq!(
            assembler.finish().block.alloc[1].timelock,
            (T0 + MONTH).to_string()
        );
    }

    #[test]
    fn test_error_display() {
        let err = GenesisError::UnknownParticipant {
            participant: ParticipantKey::new("dave@example.com", "tip"),
        };
        assert_eq!(err.to_string(), "no participant proof for claim by dave@example.com (tip)");
    }
}
