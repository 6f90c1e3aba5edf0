// src/bootstrap.rs
//! Engine set-up for long-running hosts (the HTTP service).
//!
//! Training runs on the blocking pool under a deadline. Missing the deadline
//! is reported as `EngineNotReady`; the classifier simply stays unavailable
//! while lexicon scoring keeps working.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::engine::{ClassifierEngine, Engines, TrainingCorpus};
use crate::error::{Result, SentimentError};

pub struct EngineRuntime {
    pub cfg: PipelineConfig,
    pub engines: Engines,
}

impl EngineRuntime {
    /// Build engines from config, training the classifier once.
    /// Training failures are logged, not fatal: the service still starts.
    pub async fn from_config(cfg: PipelineConfig) -> anyhow::Result<Self> {
        let classifier = Arc::new(ClassifierEngine::new());
        let corpus = cfg.load_training_corpus()?;

        match train_with_timeout(classifier.clone(), corpus, cfg.training_timeout()).await {
            Ok(()) => info!(
                vocabulary = classifier.vocabulary_size().unwrap_or_default(),
                "classifier engine ready"
            ),
            Err(e) => warn!(error = %e, "classifier engine unavailable"),
        }

        Ok(Self {
            cfg,
            engines: Engines::new(classifier),
        })
    }
}

/// Run `classifier.train(corpus)` off the async executor with a deadline.
///
/// If the deadline passes, the caller gets `EngineNotReady`; the detached
/// training task may still finish later and make the engine ready.
pub async fn train_with_timeout(
    classifier: Arc<ClassifierEngine>,
    corpus: TrainingCorpus,
    limit: Duration,
) -> Result<()> {
    let task = tokio::task::spawn_blocking(move || classifier.train(&corpus));
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(res)) => res,
        Ok(Err(join_err)) => {
            warn!(error = %join_err, "classifier training task panicked");
            Err(SentimentError::EngineNotReady)
        }
        Err(_) => {
            warn!(timeout_secs = limit.as_secs_f64(), "classifier training timed out");
            Err(SentimentError::EngineNotReady)
        }
    }
}
