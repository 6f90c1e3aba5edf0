//! Classifier engine: bag-of-words + logistic regression, trained once.
//!
//! The engine starts untrained; `score_text` fails with `EngineNotReady`
//! until `train()` succeeds. After that the fitted model is immutable and
//! shared (`Arc`) by every reader. `train()` is a no-op once a model exists;
//! `retrain()` is the explicit way to replace it.

use std::io::Read;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use metrics::{gauge, histogram};
use tracing::{debug, info};

use super::model::{BagOfWords, LogisticRegression, SparseVector, TrainingParams};
use super::{EngineKind, ScoringEngine};
use crate::error::{Result, SentimentError};
use crate::record::Scored;

static BUNDLED_CORPUS: &str = include_str!("../../data/training_corpus.csv");

/// One labeled training document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledText {
    pub text: String,
    pub positive: bool,
}

impl LabeledText {
    pub fn new(text: impl Into<String>, positive: bool) -> Self {
        Self {
            text: text.into(),
            positive,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrainingCorpus {
    docs: Vec<LabeledText>,
}

impl TrainingCorpus {
    pub fn new(docs: Vec<LabeledText>) -> Self {
        Self { docs }
    }

    /// Small labeled market-headline corpus shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_csv_reader(BUNDLED_CORPUS.as_bytes())
    }

    /// CSV with `text,label` columns. Labels: `pos`/`positive`/`1` and
    /// `neg`/`negative`/`0` (case-insensitive); anything else is rejected.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let (Some(text_idx), Some(label_idx)) = (col("text"), col("label")) else {
            return Err(SentimentError::Ingestion(
                "training corpus needs `text` and `label` columns".into(),
            ));
        };

        let mut docs = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            let text = row.get(text_idx).unwrap_or_default();
            let raw_label = row.get(label_idx).unwrap_or_default();
            let positive = match raw_label.to_ascii_lowercase().as_str() {
                "pos" | "positive" | "1" => true,
                "neg" | "negative" | "0" => false,
                other => {
                    return Err(SentimentError::Ingestion(format!(
                        "training corpus row {}: unsupported label {other:?}",
                        i + 2
                    )))
                }
            };
            docs.push(LabeledText::new(text, positive));
        }
        Ok(Self { docs })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            SentimentError::Ingestion(format!("opening corpus {}: {e}", path.display()))
        })?;
        Self::from_csv_reader(file)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn docs(&self) -> &[LabeledText] {
        &self.docs
    }
}

/// Fitted vocabulary + weights. Immutable once built.
#[derive(Debug)]
pub struct TrainedModel {
    vectorizer: BagOfWords,
    regression: LogisticRegression,
}

impl TrainedModel {
    pub fn fit(corpus: &TrainingCorpus, params: TrainingParams) -> Result<Self> {
        if corpus.is_empty() {
            return Err(SentimentError::InsufficientTrainingData(
                "corpus is empty".into(),
            ));
        }
        let positives = corpus.docs.iter().filter(|d| d.positive).count();
        if positives == 0 || positives == corpus.len() {
            return Err(SentimentError::InsufficientTrainingData(
                "corpus must contain both positive and negative examples".into(),
            ));
        }

        let vectorizer = BagOfWords::fit(corpus.docs.iter().map(|d| d.text.as_str()));
        if vectorizer.is_empty() {
            return Err(SentimentError::InsufficientTrainingData(
                "corpus has no usable tokens".into(),
            ));
        }

        let features: Vec<SparseVector> = corpus
            .docs
            .iter()
            .map(|d| vectorizer.transform(&d.text))
            .collect();
        let labels: Vec<bool> = corpus.docs.iter().map(|d| d.positive).collect();
        let regression = LogisticRegression::fit(&features, &labels, vectorizer.len(), params);

        Ok(Self {
            vectorizer,
            regression,
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.len()
    }

    pub fn iterations(&self) -> usize {
        self.regression.iterations
    }

    pub fn predict(&self, text: &str) -> bool {
        self.regression.predict(&self.vectorizer.transform(text))
    }
}

#[derive(Debug, Default)]
pub struct ClassifierEngine {
    params: TrainingParams,
    model: RwLock<Option<Arc<TrainedModel>>>,
}

impl ClassifierEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: TrainingParams) -> Self {
        Self {
            params,
            model: RwLock::new(None),
        }
    }

    /// Train if no model exists yet; otherwise keep the current one.
    pub fn train(&self, corpus: &TrainingCorpus) -> Result<()> {
        if self.is_ready() {
            debug!("classifier already trained; skipping");
            return Ok(());
        }
        let model = self.fit(corpus)?;
        let mut slot = self.model.write().unwrap_or_else(|e| e.into_inner());
        // A concurrent trainer may have won the race; first model stays.
        if slot.is_none() {
            *slot = Some(Arc::new(model));
        }
        Ok(())
    }

    /// Explicit retrain request: fit a fresh model and swap it in.
    /// On failure the previous model (if any) is kept.
    pub fn retrain(&self, corpus: &TrainingCorpus) -> Result<()> {
        let model = self.fit(corpus)?;
        *self.model.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(model));
        Ok(())
    }

    pub fn vocabulary_size(&self) -> Option<usize> {
        self.current().map(|m| m.vocabulary_size())
    }

    fn current(&self) -> Option<Arc<TrainedModel>> {
        self.model
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn fit(&self, corpus: &TrainingCorpus) -> Result<TrainedModel> {
        let started = Instant::now();
        let model = TrainedModel::fit(corpus, self.params)?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        histogram!("classifier_train_ms").record(elapsed_ms);
        gauge!("classifier_vocabulary_size").set(model.vocabulary_size() as f64);
        info!(
            docs = corpus.len(),
            vocabulary = model.vocabulary_size(),
            iterations = model.iterations(),
            elapsed_ms,
            "classifier trained"
        );
        Ok(model)
    }
}

impl ScoringEngine for ClassifierEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Classifier
    }

    fn score_text(&self, text: &str) -> Result<Scored> {
        let model = self.current().ok_or(SentimentError::EngineNotReady)?;
        Ok(Scored::from_class(model.predict(text)))
    }

    fn is_ready(&self) -> bool {
        self.model
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
