//! Assigns each transaction to an identity group.
//!
//! Exact mode keys on `(description, amount)` verbatim. Fuzzy mode is an
//! online greedy clustering: a transaction joins the first existing key (in
//! creation order) with the same amount whose description is identical or
//! scores at least `ratio_threshold`; otherwise it founds a new key. Results
//! therefore depend on input order when descriptions chain (A≈B, B≈C, A≉C).

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use zombie_core::{Amount, IdentityKey, Transaction};

use crate::error::MatchError;
use crate::similarity::{Representation, SimilarityStrategy};

#[derive(Clone)]
pub enum MatchMode {
    Exact,
    Fuzzy {
        strategy: Arc<dyn SimilarityStrategy>,
        ratio_threshold: f32,
    },
}

impl std::fmt::Debug for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "Exact"),
            MatchMode::Fuzzy {
                strategy,
                ratio_threshold,
            } => write!(f, "Fuzzy({}, {ratio_threshold})", strategy.name()),
        }
    }
}

/// Per-run matching state. Keys and cached representations live only as
/// long as one detection run.
pub struct MatchState {
    mode: MatchMode,
    keys: Vec<IdentityKey>,
    by_amount: HashMap<Amount, Vec<usize>>,
    representations: HashMap<String, Representation>,
}

impl MatchState {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            keys: Vec::new(),
            by_amount: HashMap::new(),
            representations: HashMap::new(),
        }
    }

    pub fn exact() -> Self {
        Self::new(MatchMode::Exact)
    }

    pub fn fuzzy(strategy: Arc<dyn SimilarityStrategy>, ratio_threshold: f32) -> Self {
        Self::new(MatchMode::Fuzzy {
            strategy,
            ratio_threshold,
        })
    }

    /// Keys in creation order.
    pub fn keys(&self) -> &[IdentityKey] {
        &self.keys
    }

    pub fn assign(&mut self, tx: &Transaction) -> Result<IdentityKey, MatchError> {
        let found = match self.mode.clone() {
            MatchMode::Exact => self.find_exact(tx),
            MatchMode::Fuzzy {
                strategy,
                ratio_threshold,
            } => self.find_similar(tx, strategy.as_ref(), ratio_threshold)?,
        };

        let index = match found {
            Some(index) => index,
            None => {
                self.keys.push(tx.exact_key());
                let index = self.keys.len() - 1;
                self.by_amount.entry(tx.amount()).or_default().push(index);
                index
            }
        };
        Ok(self.keys[index].clone())
    }

    fn find_exact(&self, tx: &Transaction) -> Option<usize> {
        self.candidates(tx.amount())
            .iter()
            .copied()
            .find(|&i| self.keys[i].description == tx.description())
    }

    fn find_similar(
        &mut self,
        tx: &Transaction,
        strategy: &dyn SimilarityStrategy,
        ratio_threshold: f32,
    ) -> Result<Option<usize>, MatchError> {
        let candidates = self.candidates(tx.amount()).to_vec();
        for index in candidates {
            let existing = self.keys[index].description.clone();
            if existing == tx.description() {
                return Ok(Some(index));
            }
            self.cache(strategy, tx.description())?;
            self.cache(strategy, &existing)?;
            let score = strategy.score(
                &self.representations[tx.description()],
                &self.representations[&existing],
            );
            if score >= ratio_threshold {
                debug!("'{}' joins '{existing}' (score {score:.3})", tx.description());
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn candidates(&self, amount: Amount) -> &[usize] {
        self.by_amount.get(&amount).map(Vec::as_slice).unwrap_or_default()
    }

    fn cache(
        &mut self,
        strategy: &dyn SimilarityStrategy,
        description: &str,
    ) -> Result<(), MatchError> {
        if !self.representations.contains_key(description) {
            debug!("Computing {} representation for '{description}'", strategy.name());
            let rep = strategy.represent(description)?;
            self.representations.insert(description.to_string(), rep);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::testing::TableEmbedder;
    use crate::similarity::{EmbeddingStrategy, LexicalStrategy};
    use zombie_core::Month;

    fn tx(desc: &str, amount: &str, month: &str) -> Transaction {
        Transaction::new(desc, amount.parse().unwrap(), month.parse::<Month>().unwrap()).unwrap()
    }

    fn lexical(ratio: f32) -> MatchState {
        MatchState::fuzzy(Arc::new(LexicalStrategy), ratio)
    }

    // ── Exact ─────────────────────────────────────────────────────────────────

    #[test]
    fn exact_groups_identical_pairs() {
        let mut state = MatchState::exact();
        let a = state.assign(&tx("Netflix", "15.99", "2024-01")).unwrap();
        let b = state.assign(&tx("Netflix", "15.99", "2024-02")).unwrap();
        let c = state.assign(&tx("netflix", "15.99", "2024-03")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(state.keys().len(), 2);
    }

    #[test]
    fn exact_amounts_compare_numerically() {
        let mut state = MatchState::exact();
        let a = state.assign(&tx("Gym", "30.00", "2024-01")).unwrap();
        let b = state.assign(&tx("Gym", "30", "2024-02")).unwrap();
        assert_eq!(a, b);
    }

    // ── Fuzzy ─────────────────────────────────────────────────────────────────

    #[test]
    fn fuzzy_merges_spelling_variants() {
        let mut state = lexical(0.8);
        let first = state.assign(&tx("Service A", "10.00", "2024-01")).unwrap();
        assert_eq!(state.assign(&tx("service-a", "10.00", "2024-02")).unwrap(), first);
        assert_eq!(state.assign(&tx("SERVICE A", "10.00", "2024-03")).unwrap(), first);
        assert_eq!(first.description, "Service A");
        assert_eq!(state.keys().len(), 1);
    }

    #[test]
    fn fuzzy_never_merges_different_amounts() {
        let mut state = lexical(0.0);
        let a = state.assign(&tx("Service A", "10.00", "2024-01")).unwrap();
        let b = state.assign(&tx("Service A", "10.01", "2024-01")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fuzzy_below_ratio_stays_apart() {
        let mut state = lexical(0.8);
        let a = state.assign(&tx("Spotify", "9.99", "2024-01")).unwrap();
        let b = state.assign(&tx("Hulu", "9.99", "2024-01")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fuzzy_first_match_wins() {
        // "netflix h" clears the ratio against both keys and scores higher
        // against the newer one; it still joins the older.
        let mut state = lexical(0.85);
        let first = state.assign(&tx("netflix", "1", "2024-01")).unwrap();
        let second = state.assign(&tx("netflix hd", "1", "2024-01")).unwrap();
        assert_ne!(first, second);
        assert_eq!(state.assign(&tx("netflix h", "1", "2024-02")).unwrap(), first);
    }

    #[test]
    fn identical_description_matches_even_at_ratio_one() {
        let mut state = lexical(1.0);
        let a = state.assign(&tx("Gym", "30", "2024-01")).unwrap();
        let b = state.assign(&tx("Gym", "30", "2024-02")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn representations_are_cached_per_description() {
        let embedder = Arc::new(TableEmbedder::new(vec![
            ("Netflix", vec![1.0, 0.0]),
            ("NETFLIX.COM", vec![0.95, 0.05]),
            ("Hulu", vec![0.0, 1.0]),
        ]));
        let mut state = MatchState::fuzzy(Arc::new(EmbeddingStrategy::new(embedder.clone())), 0.9);
        let netflix = state.assign(&tx("Netflix", "15.99", "2024-01")).unwrap();
        assert_eq!(state.assign(&tx("NETFLIX.COM", "15.99", "2024-02")).unwrap(), netflix);
        assert_eq!(state.assign(&tx("NETFLIX.COM", "15.99", "2024-03")).unwrap(), netflix);
        let hulu = state.assign(&tx("Hulu", "15.99", "2024-03")).unwrap();
        assert_ne!(hulu, netflix);
        // One call per distinct description.
        assert_eq!(embedder.calls(), 3);
    }

    #[test]
    fn embedding_failure_is_an_error() {
        let embedder = Arc::new(TableEmbedder::new(vec![("Netflix", vec![1.0])]));
        let mut state = MatchState::fuzzy(Arc::new(EmbeddingStrategy::new(embedder)), 0.9);
        state.assign(&tx("Netflix", "15.99", "2024-01")).unwrap();
        assert!(matches!(
            state.assign(&tx("Unknown", "15.99", "2024-02")),
            Err(MatchError::Embedding(_))
        ));
    }

    #[test]
    fn lone_key_needs_no_representation() {
        let embedder = Arc::new(TableEmbedder::new(vec![]));
        let mut state = MatchState::fuzzy(Arc::new(EmbeddingStrategy::new(embedder.clone())), 0.9);
        state.assign(&tx("Anything", "1", "2024-01")).unwrap();
        state.assign(&tx("Anything", "1", "2024-02")).unwrap();
        assert_eq!(embedder.calls(), 0);
    }
}
