//! Lexicon engine: valence lookup + local heuristics → normalized compound score.
//!
//! Per sentiment-bearing token:
//! - base valence from `sentiment_lexicon.json` (roughly -4..+4),
//! - intensifiers/dampeners in the 3 preceding tokens shift it (decaying with distance),
//! - a negator in the 3 preceding tokens flips and damps it,
//! - ALL-CAPS emphasis when the text mixes cases,
//! - a contrastive "but" halves what came before and boosts what follows.
//!
//! The valence sum (plus exclamation emphasis) is squashed into [-1, 1] with
//! `x / sqrt(x² + 15)`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::{EngineKind, ScoringEngine};
use crate::error::Result;
use crate::record::Scored;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).unwrap_or_else(|e| {
        tracing::error!(error = %e, "bundled sentiment lexicon is invalid; scoring everything neutral");
        HashMap::new()
    })
});

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]+(?:['’][A-Za-z]+)*").expect("static token regex"));

/// Normalization constant for the compound squash.
const ALPHA: f64 = 15.0;
const BOOST_INCR: f64 = 0.293;
const BOOST_DECR: f64 = -0.293;
const CAPS_INCR: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_STEP: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
/// How far back negators and boosters reach.
const WINDOW: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct LexiconEngine;

impl LexiconEngine {
    pub fn new() -> Self {
        Self
    }

    /// Number of entries in the bundled lexicon.
    pub fn lexicon_size(&self) -> usize {
        LEXICON.len()
    }

    #[inline]
    fn word_valence(&self, w: &str) -> Option<f64> {
        LEXICON.get(w).copied()
    }

    /// Compound score in [-1, 1]; exposed for diagnostics.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<&str> = TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect();
        if tokens.is_empty() {
            return 0.0;
        }
        let lower: Vec<String> = tokens
            .iter()
            .map(|t| t.to_lowercase().replace('’', "'"))
            .collect();
        let caps_differ = caps_differential(&tokens);

        let mut valences = vec![0.0f64; tokens.len()];
        for i in 0..tokens.len() {
            let w = lower[i].as_str();
            if booster(w).is_some() {
                continue;
            }
            let Some(base) = self.word_valence(w) else {
                continue;
            };

            let mut v = base;
            if caps_differ && is_all_caps(tokens[i]) {
                v += CAPS_INCR * base.signum();
            }

            for k in 1..=WINDOW.min(i) {
                let prev = lower[i - k].as_str();
                if let Some(b) = booster(prev) {
                    let mut s = b * base.signum();
                    if caps_differ && is_all_caps(tokens[i - k]) {
                        s += CAPS_INCR * s.signum();
                    }
                    v += s * distance_decay(k);
                }
                if is_negator(prev) {
                    v *= NEGATION_SCALAR;
                }
            }

            valences[i] = v;
        }

        // Contrastive "but": soften the clause before, stress the clause after.
        if let Some(b) = lower.iter().position(|w| w == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < b {
                    *v *= 0.5;
                } else if i > b {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            let bangs = text.matches('!').count().min(MAX_EXCLAMATIONS) as f64;
            sum += bangs * EXCLAMATION_STEP * sum.signum();
        }

        normalize(sum)
    }
}

impl ScoringEngine for LexiconEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Lexicon
    }

    fn score_text(&self, text: &str) -> Result<Scored> {
        Ok(Scored::from_compound(self.compound(text)))
    }
}

fn normalize(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn distance_decay(k: usize) -> f64 {
    match k {
        1 => 1.0,
        2 => 0.95,
        _ => 0.9,
    }
}

fn is_all_caps(tok: &str) -> bool {
    tok.chars().filter(|c| c.is_alphabetic()).count() > 1
        && tok
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

/// True when some, but not all, words are shouted.
fn caps_differential(tokens: &[&str]) -> bool {
    let caps = tokens.iter().filter(|t| is_all_caps(t)).count();
    caps > 0 && caps < tokens.len()
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "nor"
            | "neither"
            | "without"
            | "cannot"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "weren't"
            | "won't"
            | "can't"
            | "don't"
            | "doesn't"
            | "didn't"
            | "shouldn't"
            | "wouldn't"
            | "couldn't"
            | "hasn't"
            | "haven't"
            | "hardly"
            | "barely"
    )
}

fn booster(tok: &str) -> Option<f64> {
    match tok {
        "very" | "extremely" | "really" | "so" | "incredibly" | "highly" | "hugely"
        | "absolutely" | "totally" | "completely" | "deeply" | "especially" | "exceptionally"
        | "remarkably" | "significantly" | "sharply" | "strongly" | "most" | "more" => {
            Some(BOOST_INCR)
        }
        "slightly" | "somewhat" | "marginally" | "partly" | "less" | "little"
        | "mildly" | "modestly" => Some(BOOST_DECR),
        _ => None,
    }
}
