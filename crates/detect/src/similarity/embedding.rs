//! Semantic similarity through a text-embedding model.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use zombie_core::EmbeddingConfig;

use super::{Representation, SimilarityStrategy};
use crate::error::MatchError;

/// Turns a description into a dense vector. Shared read-only across a run.
pub trait Embedder: Send + Sync {
    fn model(&self) -> &str;
    fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError>;
}

/// Client for an Ollama-compatible `/api/embed` endpoint.
pub struct OllamaEmbedder {
    http_client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, MatchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MatchError::Embedding(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// `None` when no base URL is configured.
    pub fn from_config(config: &EmbeddingConfig) -> Option<Result<Self, MatchError>> {
        let base_url = config.base_url.as_deref()?;
        Some(Self::new(
            base_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Embedder for OllamaEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError> {
        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };
        let response = self
            .http_client
            .post(format!("{}/api/embed", self.base_url))
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| MatchError::Embedding(e.to_string()))?;

        let body: EmbedResponse = response
            .json()
            .map_err(|e| MatchError::Embedding(format!("unexpected response: {e}")))?;
        debug!("Embedded '{text}' with {}", self.model);

        body.embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| MatchError::Embedding("response contained no embedding".to_string()))
    }
}

/// Cosine similarity over embeddings.
pub struct EmbeddingStrategy {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingStrategy {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn model(&self) -> &str {
        self.embedder.model()
    }
}

impl SimilarityStrategy for EmbeddingStrategy {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn represent(&self, description: &str) -> Result<Representation, MatchError> {
        self.embedder.embed(description).map(Representation::Vector)
    }

    fn score(&self, a: &Representation, b: &Representation) -> f32 {
        match (a, b) {
            (Representation::Vector(a), Representation::Vector(b)) => cosine(a, b),
            _ => 0.0,
        }
    }
}

/// Vectors of different length or zero magnitude share nothing.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
