//! CLAIMCHECK Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! Proofs and claims round-trip through serde exactly as they appear on disk.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod config;
pub mod error;
pub mod proof;
pub mod time;

// Re-exports
pub use claim::{ClaimEntry, ClaimProjection, Project, ReferenceClaim, SubmittedClaim, SubmittedEntry};
pub use config::{AuditConfig, DenominationConfig};
pub use error::{AuditError, AuditResult};
pub use proof::{ParticipantProof, ProofData, VestingPolicy};
pub use time::{Duration, Timestamp};
