//! Human-readable output.

use claimcheck_vesting::UnlockStep;
use std::fmt::Write;

/// `2 x 500 + 3 x 50`, largest chunk first
pub fn group_chunks(chunks: &[u64]) -> String {
    let mut groups: Vec<(u64, usize)> = Vec::new();
    for &chunk in chunks {
        match groups.last_mut() {
            Some((value, count)) if *value == chunk => *count += 1,
            _ => groups.push((chunk, 1)),
        }
    }
    if groups.is_empty() {
        return "-".to_string();
    }
    groups
        .iter()
        .map(|(value, count)| format!("{} x {}", count, value))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Schedule table, one row per unlock step
pub fn schedule_table(steps: &[UnlockStep], chunks_by_step: &[Vec<u64>]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<25}  {:>10}  {:>20}  chunks",
        "step", "unlock (UTC)", "timelock", "amount"
    );
    for (index, (step, chunks)) in steps.iter().zip(chunks_by_step).enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<25}  {:>10}  {:>20}  {}",
            index,
            step.unlock_time.to_rfc3339(),
            step.timelock(),
            step.amount,
            group_chunks(chunks)
        );
    }
    let total: u128 = steps.iter().map(|s| u128::from(s.amount)).sum();
    let claimed: u128 = chunks_by_step.iter().flatten().map(|&c| u128::from(c)).sum();
    let _ = writeln!(out, "total {} in {} steps, {} claimable", total, steps.len(), claimed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimcheck_core::Timestamp;

    #[test]
    fn test_group_chunks() {
        assert_eq!(group_chunks(&[500, 500, 50, 50, 50]), "2 x 500 + 3 x 50");
        assert_eq!(group_chunks(&[50]), "1 x 50");
        assert_eq!(group_chunks(&[]), "-");
    }

    #[test]
    fn test_schedule_table() {
        let steps = [UnlockStep {
            unlock_time: Timestamp::from_unix_seconds(1_602_666_000).unwrap(),
            amount: 75,
        }];
        let table = schedule_table(&steps, &[vec![50, 50]]);
        assert!(table.contains("2020-10-14T09:00:00+00:00"));
        assert!(table.contains("1602666000"));
        assert!(table.contains("2 x 50"));
        assert!(table.ends_with("total 75 in 1 steps, 100 claimable\n"));
    }
}
