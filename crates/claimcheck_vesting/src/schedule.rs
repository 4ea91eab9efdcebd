//! Vesting schedule generation.
//!
//! A policy releases `installment_wits` every `installment_length` seconds,
//! starting at `genesis + delay + cliff`. Installments that fall inside the
//! cliff are not released separately: the first step carries them as a lump
//! sum together with the installment due at the cliff instant.

use claimcheck_core::{AuditError, AuditResult, Timestamp, VestingPolicy};
use serde::{Deserialize, Serialize};

/// Upper bound on unlock steps per schedule; each step becomes at least one
/// claim entry
pub const MAX_UNLOCK_STEPS: u64 = 100_000;

/// One unlock event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockStep {
    /// When the amount becomes spendable
    pub unlock_time: Timestamp,
    /// Amount released at `unlock_time`
    pub amount: u64,
}

impl UnlockStep {
    /// Timelock for entries of this step (unix seconds, floored)
    #[must_use]
    pub const fn timelock(&self) -> u64 {
        self.unlock_time.as_unix_seconds()
    }
}

/// Turns a vesting policy into an ordered list of unlock steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VestingScheduler {
    policy: VestingPolicy,
}

impl VestingScheduler {
    /// Create a scheduler for `policy`
    ///
    /// # Errors
    ///
    /// Returns `ScheduleDegenerate` if the installment length or unit is zero
    pub fn new(policy: VestingPolicy) -> AuditResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// The policy this scheduler runs
    #[must_use]
    pub const fn policy(&self) -> &VestingPolicy {
        &self.policy
    }

    /// Number of installment periods folded into the cliff
    #[must_use]
    pub fn cliff_steps(&self) -> u64 {
        self.policy.cliff.div_ceil(self.policy.installment_length)
    }

    /// Number of unlock steps for `total_amount`; never less than one
    #[must_use]
    pub fn step_count(&self, total_amount: u64) -> u64 {
        total_amount
            .div_ceil(self.policy.installment_wits)
            .saturating_sub(self.cliff_steps())
            .max(1)
    }

    /// Compute the schedule
    ///
    /// Unlock times are strictly increasing and the amounts sum to
    /// `total_amount`. A zero total still yields a single zero-amount step.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleDegenerate` if the policy needs more than
    /// [`MAX_UNLOCK_STEPS`] steps, and `ArithmeticOverflow` if an unlock time
    /// or the cliff lump sum does not fit
    pub fn schedule(&self, total_amount: u64, genesis: Timestamp) -> AuditResult<Vec<UnlockStep>> {
        let unit = self.policy.installment_wits;
        let period = self.policy.installment_duration()?;
        let delay = self.policy.delay_duration()?;
        let cliff = self.policy.cliff_duration()?;
        let first_unlock = genesis
            .checked_add(&delay)
            .and_then(|t| t.checked_add(&cliff))
            .ok_or_else(|| AuditError::overflow("first unlock time"))?;

        let step_count = self.step_count(total_amount);
        if step_count > MAX_UNLOCK_STEPS {
            return Err(AuditError::degenerate(format!(
                "{} unlock steps exceed the limit of {}",
                step_count, MAX_UNLOCK_STEPS
            )));
        }
        let cliff_lump = if self.policy.cliff > 0 {
            self.cliff_steps()
                .checked_add(1)
                .and_then(|n| n.checked_mul(unit))
                .ok_or_else(|| AuditError::overflow("cliff lump sum"))?
        } else {
            unit
        };

        let mut steps = Vec::new();
        let mut remaining = total_amount;
        for index in 0..step_count {
            let unlock_time = period
                .checked_mul(index)
                .and_then(|offset| first_unlock.checked_add(&offset))
                .ok_or_else(|| AuditError::overflow("unlock time"))?;
            let allowance = if index == 0 { cliff_lump } else { unit };
            let amount = remaining.min(allowance);
            remaining -= amount;
            steps.push(UnlockStep {
                unlock_time,
                amount,
            });
        }

        tracing::debug!(
            steps = steps.len(),
            total_amount,
            cliff_steps = self.cliff_steps(),
            "computed vesting schedule"
        );
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T0: u64 = 1_602_666_000;
    const MONTH: u64 = 2_592_000;

    fn genesis() -> Timestamp {
        Timestamp::from_unix_seconds(T0).unwrap()
    }

    fn policy(delay: u64, cliff: u64, installment_length: u64, installment_wits: u64) -> VestingPolicy {
        VestingPolicy {
            delay,
            installment_length,
            cliff,
            installment_wits,
        }
    }

    fn amounts(steps: &[UnlockStep]) -> Vec<u64> {
        steps.iter().map(|s| s.amount).collect()
    }

    fn timelocks(steps: &[UnlockStep]) -> Vec<u64> {
        steps.iter().map(UnlockStep::timelock).collect()
    }

    #[test]
    fn test_monthly_installments_without_cliff() {
        let scheduler = VestingScheduler::new(policy(0, 0, MONTH, 50_000_000_000)).unwrap();
        let steps = scheduler.schedule(125_000_000_000, genesis()).unwrap();

        assert_eq!(amounts(&steps), vec![50_000_000_000, 50_000_000_000, 25_000_000_000]);
        assert_eq!(timelocks(&steps), vec![T0, T0 + MONTH, T0 + 2 * MONTH]);
    }

    #[test]
    fn test_delay_shifts_every_step() {
        let scheduler = VestingScheduler::new(policy(100, 0, MONTH, 10)).unwrap();
        let steps = scheduler.schedule(20, genesis()).unwrap();
        assert_eq!(timelocks(&steps), vec![T0 + 100, T0 + 100 + MONTH]);
    }

    #[test]
    fn test_cliff_lump_sum() {
        // Founder-style: 12 periods inside the cliff, 48 installments overall.
        let length = 1_296_000;
        let cliff = 15_552_000;
        let scheduler = VestingScheduler::new(policy(0, cliff, length, 10)).unwrap();
        assert_eq!(scheduler.cliff_steps(), 12);

        let steps = scheduler.schedule(480, genesis()).unwrap();
        assert_eq!(steps.len(), 36);
        assert_eq!(steps[0].amount, 130);
        assert!(steps[1..].iter().all(|s| s.amount == 10));
        assert_eq!(steps[0].timelock(), T0 + cliff);
        assert_eq!(steps[1].timelock(), T0 + cliff + length);
        assert_eq!(amounts(&steps).iter().sum::<u64>(), 480);
    }

    #[test]
    fn test_cliff_with_partial_period() {
        // A cliff of 1.5 periods folds two periods.
        let scheduler = VestingScheduler::new(policy(0, 150, 100, 10)).unwrap();
        assert_eq!(scheduler.cliff_steps(), 2);

        let steps = scheduler.schedule(55, genesis()).unwrap();
        assert_eq!(amounts(&steps), vec![30, 10, 10, 5]);
        assert_eq!(steps[0].timelock(), T0 + 150);
    }

    #[test]
    fn test_cliff_larger_than_allocation() {
        let scheduler = VestingScheduler::new(policy(0, 1_000, 100, 10)).unwrap();
        let steps = scheduler.schedule(25, genesis()).unwrap();
        assert_eq!(amounts(&steps), vec![25]);
        assert_eq!(steps[0].timelock(), T0 + 1_000);
    }

    #[test]
    fn test_tiny_amount_still_has_one_step() {
        let scheduler = VestingScheduler::new(policy(0, 0, MONTH, 50)).unwrap();
        assert_eq!(amounts(&scheduler.schedule(7, genesis()).unwrap()), vec![7]);
    }

    #[test]
    fn test_zero_total_yields_single_zero_step() {
        let scheduler = VestingScheduler::new(policy(0, 0, MONTH, 50)).unwrap();
        let steps = scheduler.schedule(0, genesis()).unwrap();
        assert_eq!(amounts(&steps), vec![0]);
    }

    #[test]
    fn test_degenerate_policies_rejected() {
        assert!(matches!(
            VestingScheduler::new(policy(0, 0, 0, 50)),
            Err(AuditError::ScheduleDegenerate { .. })
        ));
        assert!(matches!(
            VestingScheduler::new(policy(0, 0, MONTH, 0)),
            Err(AuditError::ScheduleDegenerate { .. })
        ));
    }

    #[test]
    fn test_unlock_time_overflow() {
        let scheduler = VestingScheduler::new(policy(u64::MAX / 1_000, 0, MONTH, 1)).unwrap();
        assert!(matches!(
            scheduler.schedule(1, genesis()),
            Err(AuditError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_step_limit() {
        let scheduler = VestingScheduler::new(policy(0, 0, 1, 1)).unwrap();
        assert!(matches!(
            scheduler.schedule(u64::MAX, genesis()),
            Err(AuditError::ScheduleDegenerate { .. })
        ));

        let steps = scheduler.schedule(MAX_UNLOCK_STEPS, genesis()).unwrap();
        assert_eq!(steps.len() as u64, MAX_UNLOCK_STEPS);
        assert!(matches!(
            scheduler.schedule(MAX_UNLOCK_STEPS + 1, genesis()),
            Err(AuditError::ScheduleDegenerate { .. })
        ));
    }

    fn arb_schedule_input() -> impl Strategy<Value = (VestingPolicy, u64)> {
        (
            0u64..10_000_000,
            0u64..10_000_000,
            1_000u64..5_000_000,
            1u64..1_000_000_000_000,
            0u64..200,
            0u64..1_000_000_000_000,
        )
            .prop_map(|(delay, cliff, length, unit, whole, extra)| {
                let total = unit * whole + extra % unit;
                (policy(delay, cliff, length, unit), total)
            })
    }

    proptest! {
        #[test]
        fn prop_amounts_sum_to_total((policy, total) in arb_schedule_input()) {
            let steps = VestingScheduler::new(policy).unwrap().schedule(total, genesis()).unwrap();
            prop_assert_eq!(steps.iter().map(|s| s.amount).sum::<u64>(), total);
        }

        #[test]
        fn prop_unlock_times_strictly_increase((policy, total) in arb_schedule_input()) {
            let steps = VestingScheduler::new(policy).unwrap().schedule(total, genesis()).unwrap();
            prop_assert!(!steps.is_empty());
            for pair in steps.windows(2) {
                prop_assert!(pair[0].unlock_time < pair[1].unlock_time);
            }
        }

        #[test]
        fn prop_no_step_exceeds_its_allowance((policy, total) in arb_schedule_input()) {
            let scheduler = VestingScheduler::new(policy).unwrap();
            let steps = scheduler.schedule(total, genesis()).unwrap();
            for step in steps.iter().skip(1) {
                prop_assert!(step.amount <= policy.installment_wits);
            }
        }
    }
}
