//! Recurring ("zombie") charge detection.
//!
//! ```text
//! file ─▶ Extractor ─▶ RawRow ─▶ normalize ─▶ Transaction
//!      ─▶ MatchState ─▶ Aggregator ─▶ RecurringCharge
//! ```
//!
//! A charge is recurring when its identity (description, exact amount) shows
//! up in at least `threshold` distinct calendar months. Fuzzy mode lets
//! slightly different descriptions with the same amount share an identity.

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod resolver;
pub mod similarity;
pub mod threshold;

use std::path::Path;
use std::sync::Arc;
use tracing::info;
use zombie_core::{DetectConfig, RawRow, DEFAULT_RATIO_THRESHOLD};
use zombie_import::normalize_rows;

pub use aggregate::{Aggregator, RecurringCharge};
pub use error::{DetectError, ExtractError, MatchError, Result};
pub use extract::{Extractor, FileKind};
pub use resolver::{MatchMode, MatchState};
pub use similarity::{
    resolve_strategy, Embedder, EmbeddingStrategy, LexicalStrategy, OllamaEmbedder,
    SimilarityStrategy,
};
pub use threshold::{advise, guess_threshold};

/// Per-run knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectOptions {
    /// Minimum distinct months; `None` derives one from the data.
    pub threshold: Option<u32>,
    pub fuzzy: bool,
    pub ratio_threshold: f32,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            threshold: None,
            fuzzy: false,
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
        }
    }
}

impl DetectOptions {
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            threshold: Some(threshold),
            ..Self::default()
        }
    }

    pub fn fuzzy(ratio_threshold: f32) -> Self {
        Self {
            fuzzy: true,
            ratio_threshold,
            ..Self::default()
        }
    }

    pub fn from_config(config: &DetectConfig) -> Self {
        Self {
            threshold: config.threshold,
            fuzzy: config.fuzzy,
            ratio_threshold: config.ratio_threshold,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.threshold == Some(0) {
            return Err(DetectError::InvalidThreshold(0));
        }
        if !(0.0..=1.0).contains(&self.ratio_threshold) {
            return Err(DetectError::InvalidRatio(self.ratio_threshold));
        }
        Ok(())
    }
}

/// Holds everything resolved once per run: the similarity strategy used in
/// fuzzy mode and the file extractor.
pub struct Detector {
    extractor: Extractor,
    strategy: Arc<dyn SimilarityStrategy>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(Extractor::default(), Arc::new(LexicalStrategy))
    }
}

impl Detector {
    pub fn new(extractor: Extractor, strategy: Arc<dyn SimilarityStrategy>) -> Self {
        Self { extractor, strategy }
    }

    /// Resolves the similarity strategy (probing the embedding server when
    /// fuzzy matching may use it) and builds the extractor.
    pub fn from_config(config: &DetectConfig) -> Result<Self> {
        config.validate()?;
        let strategy: Arc<dyn SimilarityStrategy> = if config.fuzzy {
            resolve_strategy(config.similarity, &config.embedding)?
        } else {
            Arc::new(LexicalStrategy)
        };
        Ok(Self::new(Extractor::from_config(&config.extraction), strategy))
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn extract_rows(&self, path: &Path) -> Result<Vec<RawRow>> {
        Ok(self.extractor.extract_rows(path)?)
    }

    pub fn detect(&self, rows: &[RawRow], options: &DetectOptions) -> Result<Vec<RecurringCharge>> {
        options.validate()?;

        let batch = normalize_rows(rows);
        let threshold = match options.threshold {
            Some(threshold) => threshold,
            None => guess_threshold(&batch.transactions),
        };

        let mut state = if options.fuzzy {
            MatchState::fuzzy(self.strategy.clone(), options.ratio_threshold)
        } else {
            MatchState::exact()
        };
        let mut aggregator = Aggregator::new();
        for tx in &batch.transactions {
            let key = state.assign(tx)?;
            aggregator.record(key, tx.month());
        }

        let recurring = aggregator.recurring(threshold);
        info!(
            "Detection: {} transactions, {} dropped rows, {} groups, threshold {}, {} recurring",
            batch.transactions.len(),
            batch.dropped,
            aggregator.group_count(),
            threshold,
            recurring.len()
        );
        Ok(recurring)
    }

    pub fn detect_from_file(
        &self,
        path: &Path,
        options: &DetectOptions,
    ) -> Result<Vec<RecurringCharge>> {
        options.validate()?;
        let rows = self.extract_rows(path)?;
        self.detect(&rows, options)
    }

    /// Extracts every file, merges the rows in file order, and detects once.
    /// The first file that cannot be read aborts the run.
    pub fn detect_from_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &DetectOptions,
    ) -> Result<Vec<RecurringCharge>> {
        options.validate()?;
        let mut rows = Vec::new();
        for path in paths {
            rows.extend(self.extract_rows(path.as_ref())?);
        }
        self.detect(&rows, options)
    }
}

/// Detect with lexical fuzzy matching and the default extractor.
pub fn detect(rows: &[RawRow], options: &DetectOptions) -> Result<Vec<RecurringCharge>> {
    Detector::default().detect(rows, options)
}

pub fn detect_from_file(path: &Path, options: &DetectOptions) -> Result<Vec<RecurringCharge>> {
    Detector::default().detect_from_file(path, options)
}
