//! # Scoring Engines
//! Pluggable text → (score, label) strategies behind one small trait.
//!
//! Two variants, picked by the closed [`EngineKind`] enumeration:
//! - [`LexiconEngine`]: stateless, compound polarity in [-1, 1], ternary label.
//! - [`ClassifierEngine`]: trained once from a labeled corpus, binary {0, 1}
//!   score, no neutral label.
//!
//! The score/label domains differ on purpose; callers must not assume one.

pub mod classifier;
pub mod lexicon;
pub mod model;

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

use crate::error::{Result, SentimentError};
use crate::record::Scored;

pub use classifier::{ClassifierEngine, LabeledText, TrainingCorpus};
pub use lexicon::LexiconEngine;

/// Capability shared by every engine.
pub trait ScoringEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Pure given the engine's trained state. Empty text is a valid input.
    fn score_text(&self, text: &str) -> Result<Scored>;

    /// Whether `score_text` can succeed right now.
    fn is_ready(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum EngineKind {
    #[default]
    Lexicon,
    Classifier,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::Lexicon, EngineKind::Classifier];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Lexicon => "lexicon",
            EngineKind::Classifier => "classifier",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = SentimentError;

    /// Accepts the canonical names plus the legacy selectors `vader` and `ml`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicon" | "vader" => Ok(EngineKind::Lexicon),
            "classifier" | "ml" => Ok(EngineKind::Classifier),
            _ => Err(SentimentError::UnknownEngine(s.to_string())),
        }
    }
}

impl TryFrom<String> for EngineKind {
    type Error = SentimentError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// The engine set a caller injects into the pipeline.
///
/// The lexicon engine is stateless; the classifier is shared behind an `Arc`
/// so one trained model serves every batch in the process.
#[derive(Clone)]
pub struct Engines {
    lexicon: Arc<LexiconEngine>,
    classifier: Arc<ClassifierEngine>,
}

impl Engines {
    pub fn new(classifier: Arc<ClassifierEngine>) -> Self {
        Self {
            lexicon: Arc::new(LexiconEngine::new()),
            classifier,
        }
    }

    pub fn select(&self, kind: EngineKind) -> &dyn ScoringEngine {
        match kind {
            EngineKind::Lexicon => self.lexicon.as_ref(),
            EngineKind::Classifier => self.classifier.as_ref(),
        }
    }

    /// Resolve an engine by selector string; unknown names fail with `UnknownEngine`.
    pub fn by_name(&self, name: &str) -> Result<&dyn ScoringEngine> {
        let kind: EngineKind = name.parse()?;
        Ok(self.select(kind))
    }

    pub fn lexicon(&self) -> &Arc<LexiconEngine> {
        &self.lexicon
    }

    pub fn classifier(&self) -> &Arc<ClassifierEngine> {
        &self.classifier
    }
}

impl Default for Engines {
    /// Lexicon ready, classifier untrained.
    fn default() -> Self {
        Self::new(Arc::new(ClassifierEngine::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("lexicon".parse::<EngineKind>().unwrap(), EngineKind::Lexicon);
        assert_eq!(" VADER ".parse::<EngineKind>().unwrap(), EngineKind::Lexicon);
        assert_eq!("ml".parse::<EngineKind>().unwrap(), EngineKind::Classifier);
        assert_eq!(
            "Classifier".parse::<EngineKind>().unwrap(),
            EngineKind::Classifier
        );
    }

    #[test]
    fn bogus_name_is_unknown_engine() {
        let err = "bogus".parse::<EngineKind>().unwrap_err();
        assert!(matches!(err, SentimentError::UnknownEngine(ref s) if s == "bogus"));

        let engines = Engines::default();
        assert!(matches!(
            engines.by_name("bogus"),
            Err(SentimentError::UnknownEngine(_))
        ));
    }

    #[test]
    fn select_returns_matching_kind() {
        let engines = Engines::default();
        for kind in EngineKind::ALL {
            assert_eq!(engines.select(kind).kind(), kind);
        }
        assert!(engines.select(EngineKind::Lexicon).is_ready());
        assert!(!engines.select(EngineKind::Classifier).is_ready());
    }

    #[test]
    fn deserializes_through_parser() {
        #[derive(Deserialize)]
        struct Cfg {
            engine: EngineKind,
        }
        let ok: Cfg = toml::from_str(r#"engine = "ml""#).unwrap();
        assert_eq!(ok.engine, EngineKind::Classifier);
        assert!(toml::from_str::<Cfg>(r#"engine = "bogus""#).is_err());
    }
}
