pub mod amount;
pub mod config;
pub mod month;
pub mod row;
pub mod transaction;

pub use amount::Amount;
pub use config::{
    ConfigError, DetectConfig, EmbeddingConfig, ExtractionConfig, SimilarityPreference,
    DEFAULT_RATIO_THRESHOLD,
};
pub use month::{Month, MonthParseError};
pub use row::RawRow;
pub use transaction::{IdentityKey, Transaction, TransactionError};
