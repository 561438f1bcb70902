//! Okapi BM25.
//!
//! `idf = ln(1 + (N - df + 0.5) / (df + 0.5))` and
//! `score = idf * tf * (k1 + 1) / (tf + k1 * (1 - b + b * dl / avgdl))`.

use crate::config::Bm25Params;
use crate::error::Result;
use crate::index::{DocId, PostingStore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25 {
    k1: f64,
    b: f64,
}

impl Default for Bm25 {
    fn default() -> Self {
        let params = Bm25Params::default();
        Self { k1: params.k1, b: params.b }
    }
}

impl Bm25 {
    pub fn new(params: Bm25Params) -> Result<Self> {
        params.validate()?;
        Ok(Self { k1: params.k1, b: params.b })
    }

    pub fn params(&self) -> Bm25Params {
        Bm25Params { k1: self.k1, b: self.b }
    }

    /// 0 for a term no document contains.
    pub fn idf(&self, document_count: u32, document_frequency: u32) -> f64 {
        if document_frequency == 0 {
            return 0.0;
        }
        let n = f64::from(document_count);
        let df = f64::from(document_frequency);
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    pub fn term_score(&self, idf: f64, term_frequency: u32, doc_len: u32, avgdl: f64) -> f64 {
        if term_frequency == 0 {
            return 0.0;
        }
        let tf = f64::from(term_frequency);
        let relative_len = if avgdl > 0.0 { f64::from(doc_len) / avgdl } else { 1.0 };
        let norm = self.k1 * (1.0 - self.b + self.b * relative_len);
        idf * (tf * (self.k1 + 1.0)) / (tf + norm)
    }

    /// Score of one term against one stored document.
    pub fn score(&self, store: &PostingStore, term: &str, doc_id: DocId) -> f64 {
        let Some(doc) = store.document(doc_id) else {
            return 0.0;
        };
        let stats = store.stats();
        let idf = self.idf(stats.document_count, store.document_frequency(term));
        let tf = store.postings(term).get(doc_id);
        self.term_score(idf, tf, doc.length, stats.average_document_length)
    }

    /// Sum of per-term scores, accumulated in query order.
    pub fn score_document<S: AsRef<str>>(&self, store: &PostingStore, terms: &[S], doc_id: DocId) -> f64 {
        terms
            .iter()
            .fold(0.0, |acc, term| acc + self.score(store, term.as_ref(), doc_id))
    }
}
