//! Laying out denomination chunks as timelocked entries.

use crate::schedule::UnlockStep;
use claimcheck_core::{AuditError, AuditResult, ClaimEntry};

/// Combines unlock steps with their chunk sets
pub struct AddressAssigner;

impl AddressAssigner {
    /// One entry per chunk, steps in schedule order, chunks in the order given
    ///
    /// Every entry of a step carries that step's floored timelock.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if there is not exactly one chunk set per step
    pub fn assign(steps: &[UnlockStep], chunks_by_step: &[Vec<u64>]) -> AuditResult<Vec<ClaimEntry>> {
        if steps.len() != chunks_by_step.len() {
            return Err(AuditError::malformed(
                "address assignment",
                format!("{} steps but {} chunk sets", steps.len(), chunks_by_step.len()),
            ));
        }

        Ok(steps
            .iter()
            .zip(chunks_by_step)
            .flat_map(|(step, chunks)| {
                let timelock = step.timelock();
                chunks.iter().map(move |&amount| ClaimEntry::new(amount, timelock))
            })
            .collect())
    }
}
