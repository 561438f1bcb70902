//! Engine configuration.
//!
//! Every field has a default so a partial JSON document is a valid
//! configuration. Values are checked by [`EngineConfig::validate`] before an
//! engine is built.

use crate::error::{IndexError, Result};
use crate::tokenizer::{AnalyzingTokenizer, Language, Tokenizer, WhitespaceTokenizer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Term-frequency saturation. Standard range 1.2–2.0.
pub const DEFAULT_K1: f64 = 1.2;

/// Length normalization strength. 0 disables it, 1 normalizes fully.
///
/// At 0.75 a one-token document outscores a three-token one holding the same
/// term twice; at 0.5 the higher term frequency wins.
pub const DEFAULT_B: f64 = 0.5;

pub const DEFAULT_TOP_N: usize = 10;

/// Upper bound on the result limit accepted from outer surfaces.
pub const MAX_TOP_N: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: DEFAULT_K1, b: DEFAULT_B }
    }
}

impl Bm25Params {
    pub fn new(k1: f64, b: f64) -> Result<Self> {
        let params = Self { k1, b };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 <= 0.0 {
            return Err(IndexError::InvalidConfiguration(format!(
                "k1 must be a positive number, got {}",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(IndexError::InvalidConfiguration(format!(
                "b must be in [0, 1], got {}",
                self.b
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    Whitespace,
    #[default]
    Analyzing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub kind: TokenizerKind,
    pub language: Language,
    pub stemming: bool,
    /// Replaces the language's built-in stop words when set.
    pub stopwords: Option<Vec<String>>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            kind: TokenizerKind::Analyzing,
            language: Language::Portuguese,
            stemming: true,
            stopwords: None,
        }
    }
}

impl TokenizerConfig {
    pub fn build(&self) -> Arc<dyn Tokenizer> {
        match self.kind {
            TokenizerKind::Whitespace => Arc::new(WhitespaceTokenizer),
            TokenizerKind::Analyzing => {
                let mut tokenizer = AnalyzingTokenizer::new(self.language);
                if !self.stemming {
                    tokenizer = tokenizer.without_stemming();
                }
                if let Some(words) = &self.stopwords {
                    tokenizer = tokenizer.with_stopwords(words);
                }
                Arc::new(tokenizer)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub bm25: Bm25Params,
    pub tokenizer: TokenizerConfig,
    pub default_top_n: usize,
    pub max_top_n: usize,
    /// Tokenize documents on a worker pool during the build.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bm25: Bm25Params::default(),
            tokenizer: TokenizerConfig::default(),
            default_top_n: DEFAULT_TOP_N,
            max_top_n: MAX_TOP_N,
            parallel: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| IndexError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_bm25_params(mut self, k1: f64, b: f64) -> Self {
        self.bm25 = Bm25Params { k1, b };
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.bm25.validate()?;
        if self.max_top_n == 0 {
            return Err(IndexError::InvalidConfiguration("max_top_n must be at least 1".into()));
        }
        if self.default_top_n > self.max_top_n {
            return Err(IndexError::InvalidConfiguration(format!(
                "default_top_n {} exceeds max_top_n {}",
                self.default_top_n, self.max_top_n
            )));
        }
        Ok(())
    }

    /// Checks a caller-supplied result limit against `max_top_n`.
    pub fn check_top_n(&self, top_n: usize) -> Result<usize> {
        if top_n > self.max_top_n {
            return Err(IndexError::InvalidConfiguration(format!(
                "requested {top_n} results, limit is {}",
                self.max_top_n
            )));
        }
        Ok(top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bm25.k1, DEFAULT_K1);
        assert_eq!(config.bm25.b, DEFAULT_B);
    }

    #[test]
    fn rejects_bad_bm25_params() {
        assert!(Bm25Params::new(0.0, 0.75).is_err());
        assert!(Bm25Params::new(-1.0, 0.75).is_err());
        assert!(Bm25Params::new(f64::NAN, 0.75).is_err());
        assert!(Bm25Params::new(1.2, 1.5).is_err());
        assert!(Bm25Params::new(1.2, -0.1).is_err());
        assert!(Bm25Params::new(2.0, 0.0).is_ok());
        assert!(Bm25Params::new(2.0, 1.0).is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "bm25": { "k1": 1.5 }, "tokenizer": { "kind": "whitespace" } }"#,
        )
        .unwrap();
        assert_eq!(config.bm25.k1, 1.5);
        assert_eq!(config.bm25.b, DEFAULT_B);
        assert_eq!(config.tokenizer.kind, TokenizerKind::Whitespace);
        assert_eq!(config.default_top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn inline_stopwords_replace_the_language_list() {
        let config = EngineConfig::from_json_str(
            r#"{ "tokenizer": { "stemming": false, "stopwords": ["Gato"] } }"#,
        )
        .unwrap();
        let tokenizer = config.tokenizer.build();
        assert_eq!(tokenizer.tokenize("o gato dorme"), vec!["o", "dorme"]);
    }

    #[test]
    fn invalid_json_config_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "bm25": { "b": 2.0 } }"#).unwrap_err();
        assert!(matches!(err, IndexError::InvalidConfiguration(_)));
        assert!(EngineConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn top_n_over_limit_is_rejected() {
        let config = EngineConfig::default();
        assert_eq!(config.check_top_n(0).unwrap(), 0);
        assert!(config.check_top_n(MAX_TOP_N + 1).is_err());
    }
}
