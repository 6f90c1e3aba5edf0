// src/ingest/mod.rs
//! CSV ingestion adapter: tabular rows → [`Record`]s.
//!
//! Data-repair policies (silent by contract, but logged and counted):
//! - missing or unparsable `timestamp` → the batch's ingestion instant,
//! - missing or blank `symbol` → `None`.
//!
//! Structural problems (no `text` column, ragged rows, bad UTF-8) are
//! `IngestionError`s and abort the batch.

pub mod timestamp;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{debug, info};

use crate::error::{Result, SentimentError};
use crate::record::Record;

pub use timestamp::parse_timestamp;

/// Read records using the current instant as the timestamp fallback.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Record>> {
    read_csv_at(reader, Utc::now())
}

/// Read records; rows with a missing/unparsable timestamp get `now`.
pub fn read_csv_at<R: Read>(reader: R, now: DateTime<Utc>) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let text_idx = col("text").ok_or_else(|| {
        SentimentError::Ingestion("missing required `text` column".to_string())
    })?;
    let ts_idx = col("timestamp");
    let symbol_idx = col("symbol");

    let mut out = Vec::new();
    let mut fallbacks = 0usize;

    for row in rdr.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let text = row.get(text_idx).unwrap_or_default().to_string();

        let raw_ts = ts_idx.and_then(|i| row.get(i)).unwrap_or_default();
        let timestamp = match parse_timestamp(raw_ts) {
            Some(ts) => ts,
            None => {
                fallbacks += 1;
                debug!(line, raw = raw_ts, "timestamp missing or unparsable; using ingestion time");
                now
            }
        };

        let symbol = symbol_idx
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mut record = Record::new(text, timestamp);
        record.symbol = symbol;
        out.push(record);
    }

    counter!("ingest_rows_total").increment(out.len() as u64);
    counter!("ingest_timestamp_fallbacks_total").increment(fallbacks as u64);
    info!(rows = out.len(), timestamp_fallbacks = fallbacks, "csv ingested");
    Ok(out)
}

/// Convenience for files on disk.
pub fn read_csv_path(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)
        .map_err(|e| SentimentError::Ingestion(format!("opening {}: {e}", path.display())))?;
    read_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn reads_all_columns() {
        let csv = "timestamp,text,symbol\n2025-09-01T09:00,great day,DJI\n";
        let out = read_csv_at(csv.as_bytes(), now()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "great day");
        assert_eq!(out[0].symbol.as_deref(), Some("DJI"));
        assert_eq!(
            out[0].timestamp,
            Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap()
        );
        assert!(!out[0].is_scored());
    }

    #[test]
    fn header_lookup_is_case_insensitive_and_trimmed() {
        let csv = " Text , SYMBOL \nhello,AAPL\n";
        let out = read_csv_at(csv.as_bytes(), now()).unwrap();
        assert_eq!(out[0].text, "hello");
        assert_eq!(out[0].symbol.as_deref(), Some("AAPL"));
        assert_eq!(out[0].timestamp, now());
    }

    #[test]
    fn bad_timestamp_falls_back_and_keeps_row() {
        let csv = "timestamp,text\nnot-a-date,a\n,b\n";
        let out = read_csv_at(csv.as_bytes(), now()).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.timestamp == now()));
    }

    #[test]
    fn blank_symbol_is_none_and_empty_text_is_kept() {
        let csv = "text,symbol\n,  \n";
        let out = read_csv_at(csv.as_bytes(), now()).unwrap();
        assert_eq!(out[0].text, "");
        assert_eq!(out[0].symbol, None);
    }

    #[test]
    fn missing_text_column_is_an_error() {
        let csv = "timestamp,body\n2025-09-01,hi\n";
        assert!(matches!(
            read_csv_at(csv.as_bytes(), now()),
            Err(SentimentError::Ingestion(_))
        ));
        assert!(matches!(
            read_csv_at("".as_bytes(), now()),
            Err(SentimentError::Ingestion(_))
        ));
    }

    #[test]
    fn ragged_row_is_an_error() {
        let csv = "timestamp,text\n2025-09-01,a\n2025-09-02,b,extra\n";
        assert!(matches!(
            read_csv_at(csv.as_bytes(), now()),
            Err(SentimentError::Ingestion(_))
        ));
    }
}
