//! # Record Model
//! A timestamped text entry plus the score/label pair derived from it.
//!
//! `text`, `timestamp` and `symbol` are input fields. `score` and `label`
//! are derived: both unset until the analysis pipeline runs, then both set
//! together from a single [`Scored`] value. A label is never assigned on its
//! own, it always comes out of the engine's score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compound score at or above this is `positive` (lexicon engine).
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score at or below this is `negative` (lexicon engine).
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "positive",
            Label::Negative => "negative",
            Label::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a scoring engine: a score and the label derived from it.
///
/// The two constructors are the only way to build one, so the label is
/// always consistent with the score for the engine family that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    score: f64,
    label: Label,
}

impl Scored {
    /// Continuous compound polarity in [-1.0, 1.0] with the fixed
    /// ±0.05 neutral band.
    pub fn from_compound(score: f64) -> Self {
        let score = if score.is_finite() {
            score.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let label = if score >= POSITIVE_THRESHOLD {
            Label::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            Label::Negative
        } else {
            Label::Neutral
        };
        Self { score, label }
    }

    /// Binary class prediction: 1.0 → positive, 0.0 → negative. No neutral.
    pub fn from_class(positive: bool) -> Self {
        if positive {
            Self {
                score: 1.0,
                label: Label::Positive,
            }
        } else {
            Self {
                score: 0.0,
                label: Label::Negative,
            }
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn label(&self) -> Label {
        self.label
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub symbol: Option<String>,
    score: Option<f64>,
    label: Option<Label>,
}

impl Record {
    pub fn new(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            text: text.into(),
            symbol: None,
            score: None,
            label: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Build an already-scored record (e.g. re-imported results).
    pub fn with_scored(mut self, scored: Scored) -> Self {
        self.assign(scored);
        self
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn label(&self) -> Option<Label> {
        self.label
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Sets score and label together; only the pipeline calls this.
    pub(crate) fn assign(&mut self, scored: Scored) {
        self.score = Some(scored.score);
        self.label = Some(scored.label);
    }
}
