//! Bag-of-words vectorizer + binary logistic regression.
//!
//! Vocabulary is fixed at fit time; unseen tokens are dropped at transform
//! time. Documents are stored sparsely as `(term index, count)` pairs, which
//! keeps full-batch gradient descent cheap on wide vocabularies.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Word tokens of two or more word characters.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("static word regex"));

pub type SparseVector = Vec<(usize, f64)>;

pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD_RE.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Count vectorizer with a frozen vocabulary.
#[derive(Debug, Clone, Default)]
pub struct BagOfWords {
    vocabulary: HashMap<String, usize>,
}

impl BagOfWords {
    /// Build the vocabulary from a corpus. Terms are indexed in sorted order
    /// so the feature layout is deterministic.
    pub fn fit<'a>(documents: impl IntoIterator<Item = &'a str>) -> Self {
        let mut terms: BTreeSet<String> = BTreeSet::new();
        for doc in documents {
            for tok in tokenize(doc) {
                terms.insert(tok);
            }
        }
        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();
        Self { vocabulary }
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Term counts for `text`, sorted by index. Unknown words are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for tok in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&tok) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        counts.into_iter().collect()
    }
}

/// Hyper-parameters for gradient-descent fitting.
#[derive(Debug, Clone, Copy)]
pub struct TrainingParams {
    pub learning_rate: f64,
    pub max_iter: usize,
    pub tolerance: f64,
    /// L2 penalty strength.
    pub l2: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            max_iter: 1000,
            tolerance: 1e-7,
            l2: 1e-3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
    /// Iterations actually run before convergence or `max_iter`.
    pub iterations: usize,
}

impl LogisticRegression {
    /// Full-batch gradient descent on binary cross-entropy with L2.
    /// `labels[i]` is `true` for the positive class.
    pub fn fit(
        features: &[SparseVector],
        labels: &[bool],
        n_features: usize,
        params: TrainingParams,
    ) -> Self {
        let n = features.len().max(1) as f64;
        let mut weights = vec![0.0f64; n_features];
        let mut bias = 0.0f64;
        let mut prev_cost = f64::INFINITY;
        let mut iterations = 0;

        for iter in 0..params.max_iter {
            iterations = iter + 1;
            let mut grad_w = vec![0.0f64; n_features];
            let mut grad_b = 0.0f64;
            let mut cost = 0.0f64;

            for (x, &y) in features.iter().zip(labels) {
                let y = if y { 1.0 } else { 0.0 };
                let p = sigmoid(dot(&weights, x) + bias);
                let err = p - y;
                for &(idx, v) in x {
                    grad_w[idx] += err * v;
                }
                grad_b += err;

                let pc = p.clamp(1e-15, 1.0 - 1e-15);
                cost -= y * pc.ln() + (1.0 - y) * (1.0 - pc).ln();
            }
            cost /= n;
            cost += 0.5 * params.l2 * weights.iter().map(|w| w * w).sum::<f64>();

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= params.learning_rate * (g / n + params.l2 * *w);
            }
            bias -= params.learning_rate * grad_b / n;

            if (prev_cost - cost).abs() < params.tolerance {
                break;
            }
            prev_cost = cost;
        }

        Self {
            weights,
            bias,
            iterations,
        }
    }

    pub fn decision_function(&self, x: &SparseVector) -> f64 {
        dot(&self.weights, x) + self.bias
    }

    pub fn predict_proba(&self, x: &SparseVector) -> f64 {
        sigmoid(self.decision_function(x))
    }

    /// Positive class iff the decision function is strictly above zero.
    pub fn predict(&self, x: &SparseVector) -> bool {
        self.decision_function(x) > 0.0
    }
}

fn dot(weights: &[f64], x: &SparseVector) -> f64 {
    x.iter()
        .filter_map(|&(idx, v)| weights.get(idx).map(|w| w * v))
        .sum()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
