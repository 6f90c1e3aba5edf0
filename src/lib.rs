// src/lib.rs
// Public library surface for the service, the batch CLI and integration tests.

pub mod aggregate;
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod record;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, AggregateBucket, Granularity};
pub use crate::api::{create_router, AppState};
pub use crate::config::PipelineConfig;
pub use crate::engine::{
    ClassifierEngine, EngineKind, Engines, LexiconEngine, ScoringEngine, TrainingCorpus,
};
pub use crate::error::{Result, SentimentError};
pub use crate::pipeline::{analyze, run_batch, Report};
pub use crate::record::{Label, Record, Scored};

use axum::Router;
use tracing::info;

/// Build the HTTP application from config on disk (or defaults).
///
/// The classifier is trained once here, under the configured timeout; a
/// failed or late training leaves it not-ready and the lexicon engine still
/// serves requests.
pub async fn app() -> anyhow::Result<Router> {
    // Recorder first, so training metrics are captured.
    let metrics = metrics::Metrics::init()?;
    let cfg = PipelineConfig::load_default()?;
    let runtime = bootstrap::EngineRuntime::from_config(cfg).await?;

    let state = AppState::new(runtime.engines, runtime.cfg);
    let router = create_router(state).merge(metrics.router());
    info!("router ready");
    Ok(router)
}
