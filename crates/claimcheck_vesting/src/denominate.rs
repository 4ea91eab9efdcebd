//! Splitting amounts into round denomination chunks.
//!
//! Each chunk becomes its own address downstream, so chunks are drawn from the
//! small alphabet `min_unit * base^k`. That keeps the number of addresses
//! logarithmic in the amount and stops any single address from revealing the
//! exact allocation.

use claimcheck_core::{AuditResult, DenominationConfig};

/// Greedy splitter over the `min_unit * base^k` alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denominator {
    min_unit: u64,
    base: u64,
}

impl Denominator {
    /// Create a denominator
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `min_unit` is zero or `base` is below 2
    pub fn new(config: &DenominationConfig) -> AuditResult<Self> {
        config.validate()?;
        Ok(Self {
            min_unit: config.min_unit,
            base: config.base,
        })
    }

    /// Smallest chunk
    #[must_use]
    pub const fn min_unit(&self) -> u64 {
        self.min_unit
    }

    /// Split `amount` into chunks, largest first
    ///
    /// The chunks sum to `amount` when it is a multiple of `min_unit`.
    /// Otherwise the sub-minimum remainder becomes one extra `min_unit` chunk,
    /// so the sum exceeds `amount` by less than `min_unit`.
    #[must_use]
    pub fn denominate(&self, amount: u64) -> Vec<u64> {
        let mut chunks = Vec::new();
        let mut remaining = amount;
        while remaining > 0 {
            if remaining < self.min_unit {
                chunks.push(self.min_unit);
                break;
            }
            let chunk = self.largest_chunk(remaining);
            chunks.push(chunk);
            remaining -= chunk;
        }
        chunks
    }

    /// Largest `min_unit * base^k` not above `amount`; requires `amount >= min_unit`
    fn largest_chunk(&self, amount: u64) -> u64 {
        let mut chunk = self.min_unit;
        while let Some(next) = chunk.checked_mul(self.base) {
            if next > amount {
                break;
            }
            chunk = next;
        }
        chunk
    }

    /// Whether `value` belongs to the chunk alphabet
    #[must_use]
    pub fn is_chunk(&self, value: u64) -> bool {
        if value < self.min_unit || value % self.min_unit != 0 {
            return false;
        }
        let mut power = value / self.min_unit;
        while power % self.base == 0 {
            power /= self.base;
        }
        power == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MIN: u64 = 50_000_000_000;

    fn denominator() -> Denominator {
        Denominator::new(&DenominationConfig::default()).unwrap()
    }

    #[test]
    fn test_zero_amount_is_empty() {
        assert!(denominator().denominate(0).is_empty());
    }

    #[test]
    fn test_sub_minimum_rounds_up() {
        assert_eq!(denominator().denominate(1), vec![MIN]);
        assert_eq!(denominator().denominate(MIN - 1), vec![MIN]);
    }

    #[test]
    fn test_remainder_absorbed_into_one_chunk() {
        assert_eq!(denominator().denominate(75_000_000_000), vec![MIN, MIN]);
    }

    #[test]
    fn test_digit_grouping_largest_first() {
        // 23 * MIN = 2 * 10 * MIN + 3 * MIN
        let chunks = denominator().denominate(23 * MIN);
        assert_eq!(
            chunks,
            vec![10 * MIN, 10 * MIN, MIN, MIN, MIN]
        );
    }

    #[test]
    fn test_exact_power() {
        assert_eq!(denominator().denominate(1_000 * MIN), vec![1_000 * MIN]);
    }

    #[test]
    fn test_binary_base() {
        let d = Denominator::new(&DenominationConfig { min_unit: 1, base: 2 }).unwrap();
        assert_eq!(d.denominate(13), vec![8, 4, 1]);
    }

    #[test]
    fn test_near_u64_max() {
        let d = Denominator::new(&DenominationConfig { min_unit: 1, base: 10 }).unwrap();
        let chunks = d.denominate(u64::MAX);
        assert_eq!(chunks[0], 10_000_000_000_000_000_000);
        assert_eq!(chunks.iter().map(|&c| u128::from(c)).sum::<u128>(), u128::from(u64::MAX));
    }

    #[test]
    fn test_invalid_config() {
        assert!(Denominator::new(&DenominationConfig { min_unit: 0, base: 10 }).is_err());
        assert!(Denominator::new(&DenominationConfig { min_unit: 1, base: 1 }).is_err());
    }

    #[test]
    fn test_is_chunk() {
        let d = denominator();
        assert!(d.is_chunk(MIN));
        assert!(d.is_chunk(100 * MIN));
        assert!(!d.is_chunk(20 * MIN));
        assert!(!d.is_chunk(MIN / 2));
    }

    proptest! {
        #[test]
        fn prop_excess_below_min_unit(
            amount in 0u64..1_000_000_000_000_000,
            min_unit in 1u64..100_000_000_000,
            base in 2u64..17,
        ) {
            let d = Denominator::new(&DenominationConfig { min_unit, base }).unwrap();
            let chunks = d.denominate(amount);
            let sum: u128 = chunks.iter().map(|&c| u128::from(c)).sum();
            prop_assert!(sum >= u128::from(amount));
            prop_assert!(sum - u128::from(amount) < u128::from(min_unit));
            if amount % min_unit == 0 {
                prop_assert_eq!(sum, u128::from(amount));
            }
        }

        #[test]
        fn prop_chunks_in_alphabet_and_sorted(
            amount in 0u64..1_000_000_000_000_000,
            min_unit in 1u64..100_000_000_000,
            base in 2u64..17,
        ) {
            let d = Denominator::new(&DenominationConfig { min_unit, base }).unwrap();
            let chunks = d.denominate(amount);
            prop_assert!(chunks.iter().all(|&c| d.is_chunk(c)));
            prop_assert!(chunks.windows(2).all(|w| w[0] >= w[1]));
        }

        #[test]
        fn prop_deterministic(amount: u64) {
            let d = denominator();
            prop_assert_eq!(d.denominate(amount), d.denominate(amount));
        }
    }
}
