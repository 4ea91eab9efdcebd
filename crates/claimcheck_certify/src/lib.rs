//! Claim certification for CLAIMCHECK.
//!
//! This crate accepts or rejects submitted claim files by comparing them with
//! the reference recomputed from the participant proof, and assembles the
//! accepted claims into a genesis allocation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod genesis;
pub mod validator;

pub use genesis::{
    GenesisAssembler, GenesisBlock, GenesisError, GenesisSummary, GenesisUtxo, ParticipantKey,
};
pub use validator::{ClaimValidator, ValidationCheck, ValidationOutcome, ValidationReport};
