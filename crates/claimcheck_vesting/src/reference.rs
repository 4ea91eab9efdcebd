//! Reference claim derivation from a participant proof.

use crate::assign::AddressAssigner;
use crate::denominate::Denominator;
use crate::schedule::VestingScheduler;
use claimcheck_core::{AuditError, AuditResult, DenominationConfig, ParticipantProof, ReferenceClaim};
use serde_json::{Map, Value};

/// Recompute the claim a participant is entitled to submit
///
/// # Errors
///
/// Returns `ScheduleDegenerate` for a zero allocation or an unusable policy,
/// `InvalidConfig` for a bad denomination, and `ArithmeticOverflow` if the
/// schedule does not fit
pub fn derive_reference(
    proof: &ParticipantProof,
    denomination: &DenominationConfig,
) -> AuditResult<ReferenceClaim> {
    let data = &proof.data;
    if data.wit == 0 {
        return Err(AuditError::degenerate(format!(
            "{} ({}) has a zero allocation",
            data.email_address, data.source
        )));
    }

    let scheduler = VestingScheduler::new(data.vesting)?;
    let denominator = Denominator::new(denomination)?;

    let steps = scheduler.schedule(data.wit, proof.genesis_time()?)?;
    let chunks: Vec<Vec<u64>> = steps.iter().map(|s| denominator.denominate(s.amount)).collect();
    let addresses = AddressAssigner::assign(&steps, &chunks)?;

    tracing::debug!(
        email_address = %data.email_address,
        source = %data.source,
        steps = steps.len(),
        entries = addresses.len(),
        "derived reference claim"
    );

    Ok(ReferenceClaim {
        email_address: data.email_address.clone(),
        name: data.name.clone(),
        source: data.source.clone(),
        addresses,
        disclaimers: Value::Object(Map::new()),
        signature: proof.signature.clone(),
    })
}
