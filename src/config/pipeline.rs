// src/config/pipeline.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

use crate::aggregate::Granularity;
use crate::engine::{EngineKind, TrainingCorpus};

pub const ENV_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";
pub const ENV_ENGINE: &str = "SENTIMENT_ENGINE";
pub const ENV_GRANULARITY: &str = "SENTIMENT_GRANULARITY";
pub const DEFAULT_CONFIG_PATH: &str = "config/sentiment.toml";

fn default_training_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Engine used when a request does not name one.
    #[serde(default)]
    pub engine: EngineKind,
    #[serde(default)]
    pub granularity: Granularity,
    /// `text,label` CSV; the bundled corpus is used when absent.
    #[serde(default)]
    pub training_corpus: Option<PathBuf>,
    #[serde(default = "default_training_timeout_secs")]
    pub training_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            granularity: Granularity::default(),
            training_corpus: None,
            training_timeout_secs: default_training_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        let cfg: PipelineConfig = toml::from_str(&data)
            .with_context(|| format!("parsing pipeline config {}", path.display()))?;
        Ok(cfg)
    }

    /// Resolve config:
    /// 1) $SENTIMENT_CONFIG_PATH (must exist when set)
    /// 2) config/sentiment.toml
    /// 3) built-in defaults
    ///
    /// then apply $SENTIMENT_ENGINE / $SENTIMENT_GRANULARITY overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides()?;
        info!(
            engine = %cfg.engine,
            granularity = %cfg.granularity,
            corpus = ?cfg.training_corpus,
            "pipeline config loaded"
        );
        Ok(cfg)
    }

    /// Env values go through the same typed parsers; bad values are errors.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(v) = env::var(ENV_ENGINE) {
            self.engine = v.parse().context(ENV_ENGINE)?;
        }
        if let Ok(v) = env::var(ENV_GRANULARITY) {
            self.granularity = v.parse().context(ENV_GRANULARITY)?;
        }
        Ok(())
    }

    pub fn training_timeout(&self) -> Duration {
        Duration::from_secs(self.training_timeout_secs)
    }

    pub fn load_training_corpus(&self) -> Result<TrainingCorpus> {
        let corpus = match &self.training_corpus {
            Some(p) => TrainingCorpus::from_path(p)
                .with_context(|| format!("loading training corpus {}", p.display()))?,
            None => TrainingCorpus::bundled().context("loading bundled training corpus")?,
        };
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.engine, EngineKind::Lexicon);
        assert_eq!(cfg.granularity, Granularity::Day);
        assert_eq!(cfg.training_timeout(), Duration::from_secs(30));
        assert!(cfg.training_corpus.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: PipelineConfig = toml::from_str(r#"granularity = "week""#).unwrap();
        assert_eq!(cfg.granularity, Granularity::Week);
        assert_eq!(cfg.engine, EngineKind::Lexicon);
        assert_eq!(cfg.training_timeout_secs, 30);
    }

    #[test]
    fn rejects_bad_values_and_unknown_keys() {
        assert!(toml::from_str::<PipelineConfig>(r#"granularity = "D""#).is_err());
        assert!(toml::from_str::<PipelineConfig>(r#"engine = "bogus""#).is_err());
        assert!(toml::from_str::<PipelineConfig>(r#"engines = "lexicon""#).is_err());
    }

    #[test]
    fn bundled_corpus_when_unset() {
        let corpus = PipelineConfig::default().load_training_corpus().unwrap();
        assert!(!corpus.is_empty());
    }
}
