//! Pluggable tokenization.
//!
//! Everything downstream of the tokenizer (store, builder, scorer, evaluator)
//! only sees the [`Tokenizer`] trait, so stemming and stop-word policy can be
//! swapped without touching the index.

use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// A normalized index term.
pub type Term = String;

/// Splits normalized text into index terms.
///
/// Implementations must be deterministic and stateless: the same input always
/// yields the same sequence, and empty input yields an empty sequence.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Term>;
}

/// Splits on whitespace and nothing else. Suited to bodies that were already
/// cleaned and stop-word filtered during acquisition.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Term> {
        text.split_whitespace().map(str::to_owned).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Portuguese,
    English,
}

impl Language {
    fn algorithm(self) -> Algorithm {
        match self {
            Language::Portuguese => Algorithm::Portuguese,
            Language::English => Algorithm::English,
        }
    }

    /// Built-in stop-word list for the language.
    pub fn stopwords(self) -> &'static HashSet<&'static str> {
        match self {
            Language::Portuguese => &PT_STOPWORDS,
            Language::English => &EN_STOPWORDS,
        }
    }
}

lazy_static! {
    static ref WORD_RE: Regex =
        Regex::new(r"(?u)[\p{L}\p{N}]+(?:['-][\p{L}\p{N}]+)*").expect("valid regex");
    static ref PT_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","ao","aos","aquela","aquelas","aquele","aqueles","aquilo","as","até",
            "com","como","da","das","de","dela","delas","dele","deles","depois","do","dos",
            "e","ela","elas","ele","eles","em","entre","era","eram","essa","essas","esse","esses",
            "esta","estas","este","estes","eu","foi","foram","há","isso","isto","já",
            "lhe","lhes","mais","mas","me","mesmo","meu","minha","muito","na","nas","nem","no","nos",
            "nós","num","numa","o","os","ou","para","pela","pelas","pelo","pelos","por","qual",
            "quando","que","quem","se","sem","ser","seu","seus","só","sua","suas","também",
            "te","tem","têm","um","uma","umas","uns","você","vocês",
        ];
        words.iter().copied().collect()
    };
    static ref EN_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","but","by","for","from","has","have","he","her",
            "his","i","if","in","into","is","it","its","no","not","of","on","or","our","she",
            "so","such","that","the","their","then","there","these","they","this","to","was",
            "we","were","will","with","you","your",
        ];
        words.iter().copied().collect()
    };
}

/// Unicode-aware tokenizer: NFC normalization, lower-casing, word extraction,
/// stop-word removal and optional Snowball stemming.
pub struct AnalyzingTokenizer {
    stopwords: HashSet<String>,
    stemmer: Option<Stemmer>,
}

impl AnalyzingTokenizer {
    /// Built-in stop words and stemming for `language`.
    pub fn new(language: Language) -> Self {
        Self {
            stopwords: language.stopwords().iter().map(|w| (*w).to_owned()).collect(),
            stemmer: Some(Stemmer::create(language.algorithm())),
        }
    }

    pub fn without_stemming(mut self) -> Self {
        self.stemmer = None;
        self
    }

    /// Replace the stop-word list. Words are lower-cased before insertion.
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        self
    }

    fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

impl Tokenizer for AnalyzingTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Term> {
        let normalized = text.nfc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        for mat in WORD_RE.find_iter(&normalized) {
            let token = mat.as_str();
            if self.is_stopword(token) {
                continue;
            }
            match &self.stemmer {
                Some(stemmer) => tokens.push(stemmer.stem(token).into_owned()),
                None => tokens.push(token.to_owned()),
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_keeps_every_token() {
        let t = WhitespaceTokenizer.tokenize("  gato gato\tcachorro\n");
        assert_eq!(t, vec!["gato", "gato", "cachorro"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(WhitespaceTokenizer.tokenize("").is_empty());
        assert!(AnalyzingTokenizer::new(Language::Portuguese).tokenize("   ").is_empty());
    }

    #[test]
    fn analyzing_drops_stopwords() {
        let t = AnalyzingTokenizer::new(Language::Portuguese)
            .without_stemming()
            .tokenize("O gato e o cachorro");
        assert_eq!(t, vec!["gato", "cachorro"]);
    }

    #[test]
    fn analyzing_is_deterministic() {
        let tok = AnalyzingTokenizer::new(Language::English);
        let text = "Running runners run through the rain";
        assert_eq!(tok.tokenize(text), tok.tokenize(text));
    }
}
