//! Error types for the detection engine

use std::path::PathBuf;
use thiserror::Error;
use zombie_core::ConfigError;

/// A source file could not be turned into rows. Every variant names the file.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No text could be extracted from {path}: {reason}")]
    ExtractionFailure { path: PathBuf, reason: String },

    #[error("Cannot read {path}: {reason}")]
    UnsupportedMedia { path: PathBuf, reason: String },

    #[error("Failed to parse delimited text in {path}: {source}")]
    Delimited {
        path: PathBuf,
        #[source]
        source: zombie_import::CsvError,
    },
}

impl ExtractError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ExtractError::Io { path, .. }
            | ExtractError::ExtractionFailure { path, .. }
            | ExtractError::UnsupportedMedia { path, .. }
            | ExtractError::Delimited { path, .. } => path,
        }
    }
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Embedding request failed: {0}")]
    Embedding(String),
}

#[derive(Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Threshold must be at least 1, got {0}")]
    InvalidThreshold(u32),

    #[error("Invalid ratio threshold {0}: expected a value within 0..=1")]
    InvalidRatio(f32),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, DetectError>;
