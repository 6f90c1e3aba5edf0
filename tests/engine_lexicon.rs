// tests/engine_lexicon.rs
//
// Lexicon engine behavior through the public trait, plus randomized range
// and determinism checks over generated headlines.

use market_sentiment::engine::{LexiconEngine, ScoringEngine};
use market_sentiment::record::{NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD};
use market_sentiment::{EngineKind, Label};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const VOCAB: &[&str] = &[
    "stocks", "rally", "plunge", "not", "very", "GREAT", "bad", "but", "Fed", "earnings",
    "strong", "weak", "slightly", "!", "gains", "losses", "never", "extremely", "flat", "fear",
    "optimism", "DJI", "2025", "isn't", "don’t",
];

fn headline(rng: &mut StdRng) -> String {
    let n = rng.random_range(0..12);
    (0..n)
        .map(|_| VOCAB[rng.random_range(0..VOCAB.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn lexicon_is_always_ready_and_kind_is_lexicon() {
    let e = LexiconEngine::new();
    assert!(e.is_ready());
    assert_eq!(e.kind(), EngineKind::Lexicon);
    assert!(e.lexicon_size() > 100);
}

#[test]
fn polarity_of_plain_headlines() {
    let e = LexiconEngine::new();
    let up = e.score_text("Stocks rally on strong gains").unwrap();
    let down = e.score_text("Stocks plunge on weak demand and fear").unwrap();
    let flat = e.score_text("The index closed at 35000").unwrap();

    assert_eq!(up.label(), Label::Positive);
    assert_eq!(down.label(), Label::Negative);
    assert_eq!(flat.label(), Label::Neutral);
    assert_eq!(flat.score(), 0.0);
}

#[test]
fn negation_flips_polarity() {
    let e = LexiconEngine::new();
    let good = e.score_text("a good quarter").unwrap();
    let not_good = e.score_text("not a good quarter").unwrap();
    assert_eq!(good.label(), Label::Positive);
    assert_eq!(not_good.label(), Label::Negative);
}

#[test]
fn empty_and_whitespace_are_neutral_zero() {
    let e = LexiconEngine::new();
    for text in ["", "   ", "\n\t", "!!!"] {
        let s = e.score_text(text).unwrap();
        assert_eq!(s.score(), 0.0, "{text:?}");
        assert_eq!(s.label(), Label::Neutral, "{text:?}");
    }
}

#[test]
fn random_headlines_stay_in_range_with_consistent_labels() {
    let e = LexiconEngine::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..2_000 {
        let text = headline(&mut rng);
        let s = e.score_text(&text).unwrap();
        assert!((-1.0..=1.0).contains(&s.score()), "{text:?} → {}", s.score());

        let expected = if s.score() >= POSITIVE_THRESHOLD {
            Label::Positive
        } else if s.score() <= NEGATIVE_THRESHOLD {
            Label::Negative
        } else {
            Label::Neutral
        };
        assert_eq!(s.label(), expected, "{text:?}");
    }
}

#[test]
fn scoring_is_deterministic() {
    let e = LexiconEngine::new();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let text = headline(&mut rng);
        let a = e.score_text(&text).unwrap();
        let b = LexiconEngine::new().score_text(&text).unwrap();
        assert_eq!(a, b, "{text:?}");
    }
}
