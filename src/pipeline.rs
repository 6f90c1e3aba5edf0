//! # Analysis Pipeline
//! Applies one engine to a batch of records, then (optionally) aggregates.
//!
//! A batch is all-or-nothing: every score is computed before any record is
//! touched, so a failing engine leaves the input exactly as it was.

use metrics::counter;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{aggregate, AggregateBucket, Granularity};
use crate::engine::{EngineKind, ScoringEngine};
use crate::error::{Result, SentimentError};
use crate::record::{Record, Scored};

/// Score every record in place. Order and length are untouched; only
/// `score`/`label` change. On error no record is modified.
///
/// One call assigns each record once. Records that arrive already scored are
/// re-derived with `engine`, so the last successful call wins; callers that
/// want a record's first scoring kept must not pass it in again.
pub fn analyze_in_place(records: &mut [Record], engine: &dyn ScoringEngine) -> Result<()> {
    let kind = engine.kind();
    counter!("sentiment_batches_total", "engine" => kind.as_str()).increment(1);

    let scored = match score_all(records, engine) {
        Ok(s) => s,
        Err(e) => {
            counter!("sentiment_batch_failures_total", "engine" => kind.as_str()).increment(1);
            warn!(engine = %kind, error = %e, records = records.len(), "batch analysis failed");
            return Err(e);
        }
    };

    for (record, s) in records.iter_mut().zip(scored) {
        record.assign(s);
    }

    counter!("sentiment_records_scored_total", "engine" => kind.as_str())
        .increment(records.len() as u64);
    info!(engine = %kind, records = records.len(), "batch analyzed");
    Ok(())
}

/// Owned variant of [`analyze_in_place`].
pub fn analyze(mut records: Vec<Record>, engine: &dyn ScoringEngine) -> Result<Vec<Record>> {
    analyze_in_place(&mut records, engine)?;
    Ok(records)
}

fn score_all(records: &[Record], engine: &dyn ScoringEngine) -> Result<Vec<Scored>> {
    if !engine.is_ready() {
        return Err(SentimentError::EngineNotReady);
    }
    records.iter().map(|r| engine.score_text(&r.text)).collect()
}

/// Scored records plus their aggregate view: what the export adapters and
/// the charting layer consume.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub engine: EngineKind,
    pub granularity: Granularity,
    pub records: Vec<Record>,
    pub aggregates: Vec<AggregateBucket>,
}

/// One full batch: analyze, then aggregate.
pub fn run_batch(
    records: Vec<Record>,
    engine: &dyn ScoringEngine,
    granularity: Granularity,
) -> Result<Report> {
    let records = analyze(records, engine)?;
    let aggregates = aggregate(&records, granularity);
    Ok(Report {
        engine: engine.kind(),
        granularity,
        records,
        aggregates,
    })
}
