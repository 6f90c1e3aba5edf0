//! Error taxonomy for the scoring-and-aggregation core.
//!
//! Every core failure aborts the whole batch. The only silent behaviors are
//! the data-repair policies documented on the ingestion adapter and the
//! aggregator; they never surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// Engine selector did not name a known engine.
    #[error("unknown engine: {0:?} (expected \"lexicon\" or \"classifier\")")]
    UnknownEngine(String),

    /// Classifier engine used before a successful training pass.
    #[error("engine is not ready: classifier has not been trained")]
    EngineNotReady,

    /// Training corpus was empty or degenerate (single class, no usable tokens).
    #[error("insufficient training data: {0}")]
    InsufficientTrainingData(String),

    /// Aggregation granularity was not one of hour/day/week.
    #[error("invalid granularity: {0:?} (expected \"hour\", \"day\" or \"week\")")]
    InvalidGranularity(String),

    /// Malformed tabular input reported by the ingestion adapter.
    #[error("ingestion error: {0}")]
    Ingestion(String),
}

impl SentimentError {
    /// Stable machine-readable kind, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownEngine(_) => "unknown_engine",
            Self::EngineNotReady => "engine_not_ready",
            Self::InsufficientTrainingData(_) => "insufficient_training_data",
            Self::InvalidGranularity(_) => "invalid_granularity",
            Self::Ingestion(_) => "ingestion_error",
        }
    }
}

impl From<csv::Error> for SentimentError {
    fn from(e: csv::Error) -> Self {
        Self::Ingestion(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
