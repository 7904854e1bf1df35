use std::collections::BTreeSet;
use zombie_core::{Month, Transaction};

/// Minimum number of distinct months a group needs when no threshold is given:
/// half the covered months, rounded up, but never less than two.
pub fn advise(distinct_months: usize) -> u32 {
    let half = distinct_months.div_ceil(2);
    u32::try_from(half).unwrap_or(u32::MAX).max(2)
}

pub fn guess_threshold(transactions: &[Transaction]) -> u32 {
    let months: BTreeSet<Month> = transactions.iter().map(Transaction::month).collect();
    advise(months.len())
}
