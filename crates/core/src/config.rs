//! Run configuration, loaded from TOML.
//!
//! ```toml
//! threshold = 3
//! fuzzy = true
//! ratio_threshold = 0.8
//! similarity = "auto"
//!
//! [embedding]
//! base_url = "http://localhost:11434"
//! model = "nomic-embed-text"
//!
//! [extraction]
//! delimiter = ","
//! ocr_language = "eng"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_RATIO_THRESHOLD: f32 = 0.8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which description-similarity strategy fuzzy mode should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityPreference {
    /// Embeddings when the model answers a warm-up request, lexical otherwise.
    #[default]
    Auto,
    Lexical,
    Embedding,
}

impl std::str::FromStr for SimilarityPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(SimilarityPreference::Auto),
            "lexical" => Ok(SimilarityPreference::Lexical),
            "embedding" => Ok(SimilarityPreference::Embedding),
            other => Err(format!("Unknown similarity strategy: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of an Ollama-compatible server. `None` disables embeddings.
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "nomic-embed-text".to_string(),
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    /// Read `OLLAMA_HOST` / `OLLAMA_EMBED_MODEL`. Returns `None` without a host.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let mut config = Self {
            base_url: Some(host),
            ..Self::default()
        };
        if let Ok(model) = std::env::var("OLLAMA_EMBED_MODEL") {
            config.model = model;
        }
        Some(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub delimiter: String,
    pub ocr_language: String,
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            ocr_language: "eng".to_string(),
            tessdata_dir: None,
        }
    }
}

impl ExtractionConfig {
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Minimum distinct months; `None` lets the threshold advisor decide.
    pub threshold: Option<u32>,
    pub fuzzy: bool,
    pub ratio_threshold: f32,
    pub similarity: SimilarityPreference,
    pub embedding: EmbeddingConfig,
    pub extraction: ExtractionConfig,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            fuzzy: false,
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
            similarity: SimilarityPreference::default(),
            embedding: EmbeddingConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl DetectConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: DetectConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == Some(0) {
            return Err(ConfigError::Invalid("threshold must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.ratio_threshold) {
            return Err(ConfigError::Invalid(format!(
                "ratio_threshold must be within 0..=1, got {}",
                self.ratio_threshold
            )));
        }
        if self.extraction.delimiter.len() != 1 {
            return Err(ConfigError::Invalid(format!(
                "delimiter must be a single byte, got '{}'",
                self.extraction.delimiter
            )));
        }
        if self.similarity == SimilarityPreference::Embedding && self.embedding.base_url.is_none() {
            return Err(ConfigError::Invalid(
                "similarity = \"embedding\" requires [embedding] base_url".to_string(),
            ));
        }
        Ok(())
    }
}
