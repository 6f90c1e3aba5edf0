// tests/export_csv.rs
//
// Export of a full lexicon batch: the results file a user downloads and the
// per-bucket summary.

use std::fs::{self, File};

use market_sentiment::engine::LexiconEngine;
use market_sentiment::export::{
    aggregates_to_csv_string, write_aggregates_csv, write_records_csv,
};
use market_sentiment::{ingest, run_batch, Granularity};

const SAMPLE: &str = include_str!("../data/sample_sentiment.csv");

#[test]
fn results_file_has_one_row_per_record_with_derived_columns() {
    let records = ingest::read_csv(SAMPLE.as_bytes()).unwrap();
    let report = run_batch(records, &LexiconEngine::new(), Granularity::Day).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sentiment_results.csv");
    write_records_csv(File::create(&path).unwrap(), &report.records).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, ["timestamp", "text", "symbol", "score", "label"]);

    let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), report.records.len());
    for (row, rec) in rows.iter().zip(&report.records) {
        assert_eq!(&row[1], rec.text);
        assert_eq!(row[2].is_empty(), rec.symbol.is_none());
        let score: f64 = row[3].parse().unwrap();
        assert!((score - rec.score().unwrap()).abs() < 1e-12);
        assert!(["positive", "negative", "neutral"].contains(&&row[4]));
    }
    // First sample row was read as naive UTC.
    assert_eq!(&rows[0][0], "2025-09-01T09:00:00Z");
}

#[test]
fn aggregate_file_matches_report() {
    let records = ingest::read_csv(SAMPLE.as_bytes()).unwrap();
    let report = run_batch(records, &LexiconEngine::new(), Granularity::Day).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aggregates.csv");
    write_aggregates_csv(File::create(&path).unwrap(), &report.aggregates).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, aggregates_to_csv_string(&report.aggregates).unwrap());

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("bucket_start,score_mean,count"));
    let first = lines.next().unwrap();
    assert!(first.starts_with("2025-09-01T00:00:00Z,"), "{first}");
    assert!(first.ends_with(",3"), "{first}");
    assert_eq!(lines.count(), report.aggregates.len() - 1);
}
