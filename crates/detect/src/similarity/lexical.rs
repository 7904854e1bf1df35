//! Gestalt (Ratcliff/Obershelp) string similarity.

use std::collections::HashMap;

use super::{Representation, SimilarityStrategy};
use crate::error::MatchError;

/// Compares lowercased descriptions by their longest matching blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalStrategy;

impl SimilarityStrategy for LexicalStrategy {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn represent(&self, description: &str) -> Result<Representation, MatchError> {
        Ok(Representation::Text(description.to_lowercase()))
    }

    fn score(&self, a: &Representation, b: &Representation) -> f32 {
        match (a, b) {
            (Representation::Text(a), Representation::Text(b)) => ratio(a, b),
            _ => 0.0,
        }
    }
}

/// `2·M / (|a| + |b|)` over chars, where M is the total length of the
/// matching blocks. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f32 / total as f32
}

/// Sum of the block sizes found by recursively taking the longest common
/// block and repeating on the pieces to its left and right.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+size] == b[j..j+size]` inside the given bounds.
/// Ties go to the smallest `i`, then the smallest `j`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // Length of the match ending at (i - 1, j), keyed by j.
    let mut run_ending: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_ending = next;
    }
    (best_i, best_j, best_size)
}
