//! Description similarity used by fuzzy matching.
//!
//! A strategy is picked once per run and handed to the resolver as a value.
//! `auto` prefers embeddings when a model answers a warm-up request and falls
//! back to the lexical ratio otherwise; `lexical` and `embedding` force one.

pub mod embedding;
pub mod lexical;

use std::sync::Arc;
use tracing::{info, warn};
use zombie_core::{EmbeddingConfig, SimilarityPreference};

use crate::error::MatchError;

pub use embedding::{cosine, Embedder, EmbeddingStrategy, OllamaEmbedder};
pub use lexical::{ratio, LexicalStrategy};

/// What a strategy compares: a normalized string or an embedding.
#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
    Text(String),
    Vector(Vec<f32>),
}

pub trait SimilarityStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn represent(&self, description: &str) -> Result<Representation, MatchError>;
    /// Similarity in `0..=1` (cosine may dip below zero for opposed vectors).
    fn score(&self, a: &Representation, b: &Representation) -> f32;
}

const WARM_UP_TEXT: &str = "subscription";

/// Resolve the configured preference against the configured (or
/// `OLLAMA_HOST`) embedding server.
pub fn resolve_strategy(
    preference: SimilarityPreference,
    config: &EmbeddingConfig,
) -> Result<Arc<dyn SimilarityStrategy>, MatchError> {
    if preference == SimilarityPreference::Lexical {
        return Ok(select(preference, None));
    }

    let config = if config.base_url.is_some() {
        Some(config.clone())
    } else {
        EmbeddingConfig::from_env()
    };
    let embedder = match config.as_ref().and_then(OllamaEmbedder::from_config) {
        Some(Ok(embedder)) => Some(Arc::new(embedder) as Arc<dyn Embedder>),
        Some(Err(e)) if preference == SimilarityPreference::Embedding => return Err(e),
        Some(Err(e)) => {
            warn!("Embedding client unavailable, using lexical similarity: {e}");
            None
        }
        None => None,
    };
    resolve_with_embedder(preference, embedder)
}

/// Core of [`resolve_strategy`] with the embedder already built.
pub fn resolve_with_embedder(
    preference: SimilarityPreference,
    embedder: Option<Arc<dyn Embedder>>,
) -> Result<Arc<dyn SimilarityStrategy>, MatchError> {
    let embedder = match (preference, embedder) {
        (SimilarityPreference::Lexical, _) => None,
        (SimilarityPreference::Embedding, None) => {
            return Err(MatchError::Embedding("no embedding model configured".to_string()))
        }
        (SimilarityPreference::Embedding, Some(embedder)) => {
            embedder.embed(WARM_UP_TEXT)?;
            Some(embedder)
        }
        (SimilarityPreference::Auto, Some(embedder)) => match embedder.embed(WARM_UP_TEXT) {
            Ok(_) => Some(embedder),
            Err(e) => {
                warn!(
                    "Embedding model '{}' unavailable, falling back to lexical similarity: {e}",
                    embedder.model()
                );
                None
            }
        },
        (SimilarityPreference::Auto, None) => None,
    };
    Ok(select(preference, embedder))
}

fn select(
    preference: SimilarityPreference,
    embedder: Option<Arc<dyn Embedder>>,
) -> Arc<dyn SimilarityStrategy> {
    match embedder {
        Some(embedder) => {
            info!(
                "Similarity strategy: embedding ({}), requested {preference:?}",
                embedder.model()
            );
            Arc::new(EmbeddingStrategy::new(embedder))
        }
        None => {
            info!("Similarity strategy: lexical, requested {preference:?}");
            Arc::new(LexicalStrategy)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Embedder;
    use crate::error::MatchError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed description → vector table; unknown text is an embedding error.
    pub struct TableEmbedder {
        table: HashMap<String, Vec<f32>>,
        calls: AtomicUsize,
    }

    impl TableEmbedder {
        pub fn new(entries: Vec<(&str, Vec<f32>)>) -> Self {
            Self {
                table: entries
                    .into_iter()
                    .map(|(text, v)| (text.to_string(), v))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Embedder for TableEmbedder {
        fn model(&self) -> &str {
            "table"
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.table
                .get(text)
                .cloned()
                .ok_or_else(|| MatchError::Embedding(format!("no vector for '{text}'")))
        }
    }
}
