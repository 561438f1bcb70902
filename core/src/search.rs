use crate::index::{DocId, PostingStore};
use crate::scorer::Bm25;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
}

/// Disjunctive BM25 retrieval over a read-only store.
///
/// Any document matching at least one query term is a candidate. Results are
/// ordered by descending score, ties by ascending document id.
#[derive(Debug, Clone, Copy)]
pub struct QueryEvaluator<'a> {
    store: &'a PostingStore,
    bm25: Bm25,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(store: &'a PostingStore, bm25: Bm25) -> Self {
        Self { store, bm25 }
    }

    /// Every candidate, fully ordered.
    pub fn rank<S: AsRef<str>>(&self, terms: &[S]) -> Vec<SearchHit> {
        let mut scored = self.accumulate(terms);
        scored.sort_unstable_by(|a, b| self.compare(a, b));
        self.to_hits(scored)
    }

    /// At most `top_n` hits. An empty query or `top_n == 0` yields nothing.
    pub fn search<S: AsRef<str>>(&self, terms: &[S], top_n: usize) -> Vec<SearchHit> {
        if top_n == 0 || terms.is_empty() {
            return Vec::new();
        }
        self.search_counted(terms, top_n).1
    }

    /// Like [`search`](Self::search), also returning how many documents
    /// matched at least one term.
    pub fn search_counted<S: AsRef<str>>(&self, terms: &[S], top_n: usize) -> (usize, Vec<SearchHit>) {
        if terms.is_empty() {
            return (0, Vec::new());
        }
        let mut scored = self.accumulate(terms);
        let total = scored.len();
        if top_n == 0 {
            return (total, Vec::new());
        }
        if scored.len() > top_n {
            scored.select_nth_unstable_by(top_n - 1, |a, b| self.compare(a, b));
            scored.truncate(top_n);
        }
        scored.sort_unstable_by(|a, b| self.compare(a, b));
        (total, self.to_hits(scored))
    }

    fn accumulate<S: AsRef<str>>(&self, terms: &[S]) -> Vec<(DocId, f64)> {
        let stats = self.store.stats();
        let avgdl = stats.average_document_length;
        let mut scores: HashMap<DocId, f64> = HashMap::new();

        // Each document's sum is built term by term in query order.
        for term in terms {
            let postings = self.store.postings(term.as_ref());
            if postings.is_empty() {
                continue;
            }
            let idf = self.bm25.idf(stats.document_count, postings.len() as u32);
            for posting in postings.iter() {
                let Some(doc) = self.store.document(posting.doc_id) else {
                    continue;
                };
                let score = self.bm25.term_score(idf, posting.term_frequency, doc.length, avgdl);
                *scores.entry(posting.doc_id).or_insert(0.0) += score;
            }
        }
        scores.into_iter().collect()
    }

    fn compare(&self, a: &(DocId, f64), b: &(DocId, f64)) -> Ordering {
        b.1.total_cmp(&a.1).then_with(|| self.external_id(a.0).cmp(self.external_id(b.0)))
    }

    fn external_id(&self, doc_id: DocId) -> &'a str {
        self.store.document(doc_id).map_or("", |d| d.external_id.as_str())
    }

    fn to_hits(&self, scored: Vec<(DocId, f64)>) -> Vec<SearchHit> {
        scored
            .into_iter()
            .map(|(doc_id, score)| SearchHit { doc_id: self.external_id(doc_id).to_owned(), score })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{IndexBuilder, SourceDocument};
    use crate::tokenizer::WhitespaceTokenizer;
    use std::sync::Arc;

    fn store(docs: &[(&str, &str)]) -> PostingStore {
        IndexBuilder::new(Arc::new(WhitespaceTokenizer))
            .build(docs.iter().map(|(id, body)| SourceDocument::new(*id, "", *body)))
            .unwrap()
    }

    fn ids(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.doc_id.as_str()).collect()
    }

    #[test]
    fn higher_tf_ranks_first() {
        let s = store(&[("D1", "gato gato cachorro"), ("D2", "gato")]);
        let eval = QueryEvaluator::new(&s, Bm25::default());
        let hits = eval.search(&["gato"], 10);
        assert_eq!(ids(&hits), vec!["D1", "D2"]);
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(ids(&eval.search(&["gato"], 1)), vec!["D1"]);
    }

    #[test]
    fn empty_query_and_zero_limit_yield_nothing() {
        let s = store(&[("D1", "gato")]);
        let eval = QueryEvaluator::new(&s, Bm25::default());
        let empty: [&str; 0] = [];
        assert!(eval.search(&empty, 10).is_empty());
        assert!(eval.search(&["gato"], 0).is_empty());
        assert!(eval.search(&["peixe"], 10).is_empty());
    }

    #[test]
    fn empty_store_returns_no_hits() {
        let s = PostingStore::new();
        assert!(QueryEvaluator::new(&s, Bm25::default()).search(&["gato"], 5).is_empty());
    }

    #[test]
    fn retrieval_is_disjunctive() {
        let s = store(&[("D1", "gato"), ("D2", "cachorro"), ("D3", "peixe")]);
        let hits = QueryEvaluator::new(&s, Bm25::default()).search(&["gato", "cachorro"], 10);
        let mut found = ids(&hits);
        found.sort();
        assert_eq!(found, vec!["D1", "D2"]);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let s = store(&[("c", "gato"), ("a", "gato"), ("b", "gato")]);
        let eval = QueryEvaluator::new(&s, Bm25::default());
        assert_eq!(ids(&eval.search(&["gato"], 10)), vec!["a", "b", "c"]);
        assert_eq!(ids(&eval.search(&["gato"], 2)), vec!["a", "b"]);
    }

    #[test]
    fn matching_more_terms_scores_higher() {
        let s = store(&[("D1", "gato cachorro"), ("D2", "gato peixe"), ("D3", "ave")]);
        let hits = QueryEvaluator::new(&s, Bm25::default()).search(&["gato", "cachorro"], 10);
        assert_eq!(hits[0].doc_id, "D1");
    }

    #[test]
    fn scores_match_scorer_sum() {
        let s = store(&[("D1", "a b a"), ("D2", "b c"), ("D3", "a c c c")]);
        let bm25 = Bm25::default();
        let terms = ["a", "c"];
        for hit in QueryEvaluator::new(&s, bm25).rank(&terms) {
            let doc_id = s.resolve(&hit.doc_id).unwrap();
            let expected = bm25.score_document(&s, &terms, doc_id);
            assert!((hit.score - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn rank_returns_every_candidate() {
        let s = store(&[("D1", "x"), ("D2", "x"), ("D3", "x y")]);
        let eval = QueryEvaluator::new(&s, Bm25::default());
        assert_eq!(eval.rank(&["x"]).len(), 3);
        assert_eq!(eval.search(&["x"], 2).len(), 2);
    }

    #[test]
    fn counted_search_reports_every_candidate() {
        let s = store(&[("D1", "x"), ("D2", "x"), ("D3", "x y"), ("D4", "z")]);
        let eval = QueryEvaluator::new(&s, Bm25::default());
        let (total, hits) = eval.search_counted(&["x", "y"], 2);
        assert_eq!(total, 3);
        assert_eq!(ids(&hits), vec!["D3", "D1"]);
        assert_eq!(eval.search_counted(&["x"], 0), (3, Vec::new()));
        let empty: [&str; 0] = [];
        assert_eq!(eval.search_counted(&empty, 5), (0, Vec::new()));
    }
}
