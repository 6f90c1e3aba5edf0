//! CSV export adapter for scored records and aggregate buckets.
//!
//! Columns mirror the entity shapes one-to-one; timestamps are RFC 3339,
//! absent values are empty cells.

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use serde::Serialize;
use std::io::Write;

use crate::aggregate::AggregateBucket;
use crate::record::{Label, Record};

#[derive(Serialize)]
struct RecordRow<'a> {
    timestamp: String,
    text: &'a str,
    symbol: Option<&'a str>,
    score: Option<f64>,
    label: Option<Label>,
}

#[derive(Serialize)]
struct BucketRow {
    bucket_start: String,
    score_mean: f64,
    count: usize,
}

/// `timestamp,text,symbol,score,label`
pub fn write_records_csv<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(RecordRow {
            timestamp: r.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            text: &r.text,
            symbol: r.symbol.as_deref(),
            score: r.score(),
            label: r.label(),
        })
        .context("serializing record row")?;
    }
    if records.is_empty() {
        wtr.write_record(["timestamp", "text", "symbol", "score", "label"])?;
    }
    wtr.flush().context("flushing records csv")?;
    Ok(())
}

/// `bucket_start,score_mean,count`
pub fn write_aggregates_csv<W: Write>(writer: W, buckets: &[AggregateBucket]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for b in buckets {
        wtr.serialize(BucketRow {
            bucket_start: b.bucket_start.to_rfc3339_opts(SecondsFormat::Secs, true),
            score_mean: b.score_mean,
            count: b.count,
        })
        .context("serializing aggregate row")?;
    }
    if buckets.is_empty() {
        wtr.write_record(["bucket_start", "score_mean", "count"])?;
    }
    wtr.flush().context("flushing aggregates csv")?;
    Ok(())
}

pub fn records_to_csv_string(records: &[Record]) -> Result<String> {
    let mut buf = Vec::new();
    write_records_csv(&mut buf, records)?;
    String::from_utf8(buf).context("records csv is not utf-8")
}

pub fn aggregates_to_csv_string(buckets: &[AggregateBucket]) -> Result<String> {
    let mut buf = Vec::new();
    write_aggregates_csv(&mut buf, buckets)?;
    String::from_utf8(buf).context("aggregates csv is not utf-8")
}
