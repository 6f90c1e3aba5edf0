//! # Aggregator
//! Time-bucketed mean score and count over scored records.
//!
//! Records without a score are skipped (an unscored record cannot contribute
//! to a mean). Buckets come out sparse and in ascending `bucket_start` order.

use chrono::{DateTime, Datelike, Days, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::error::{Result, SentimentError};
use crate::record::Record;

/// Bucket width. Boundaries are UTC: hour → :00, day → 00:00,
/// week → Monday 00:00 (ISO week start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Granularity {
    Hour,
    #[default]
    Day,
    Week,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
        }
    }

    /// Start of the bucket containing `ts`. Never panics, even at the edges
    /// of chrono's range.
    pub fn truncate(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = ts.date_naive();
        let start = match self {
            Granularity::Hour => date.and_hms_opt(ts.hour(), 0, 0),
            Granularity::Day => date.and_hms_opt(0, 0, 0),
            Granularity::Week => {
                let back = Days::new(u64::from(ts.weekday().num_days_from_monday()));
                // The earliest representable week has no Monday; clamp to MIN.
                date
                    .checked_sub_days(back)
                    .unwrap_or(NaiveDate::MIN)
                    .and_hms_opt(0, 0, 0)
            }
        };
        start.map_or(ts, |naive| naive.and_utc())
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            _ => Err(SentimentError::InvalidGranularity(s.to_string())),
        }
    }
}

impl TryFrom<String> for Granularity {
    type Error = SentimentError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateBucket {
    pub bucket_start: DateTime<Utc>,
    pub score_mean: f64,
    pub count: usize,
}

/// Group scored records by truncated timestamp; mean + count per bucket.
///
/// Pure: same input and granularity → same output.
pub fn aggregate(records: &[Record], granularity: Granularity) -> Vec<AggregateBucket> {
    let mut groups: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
    for r in records {
        let Some(score) = r.score() else {
            continue;
        };
        let slot = groups
            .entry(granularity.truncate(r.timestamp))
            .or_insert((0.0, 0));
        slot.0 += score;
        slot.1 += 1;
    }

    groups
        .into_iter()
        .map(|(bucket_start, (sum, count))| AggregateBucket {
            bucket_start,
            score_mean: sum / count as f64,
            count,
        })
        .collect()
}
