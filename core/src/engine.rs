use crate::builder::{IndexBuilder, SourceDocument};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::index::{CorpusStatistics, PostingStore};
use crate::scorer::Bm25;
use crate::search::{QueryEvaluator, SearchHit};
use crate::tokenizer::{Term, Tokenizer};
use std::fmt;
use std::sync::Arc;

/// A finished index together with the tokenizer it was built with.
///
/// Read-only once built; share it behind an `Arc` for concurrent queries.
pub struct Engine {
    store: PostingStore,
    tokenizer: Arc<dyn Tokenizer>,
    bm25: Bm25,
    config: EngineConfig,
}

impl Engine {
    pub fn build<I>(config: EngineConfig, documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = SourceDocument>,
    {
        config.validate()?;
        let bm25 = Bm25::new(config.bm25)?;
        let tokenizer = config.tokenizer.build();
        let store = IndexBuilder::new(Arc::clone(&tokenizer))
            .parallel(config.parallel)
            .build(documents)?;
        Ok(Self { store, tokenizer, bm25, config })
    }

    pub fn store(&self) -> &PostingStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> CorpusStatistics {
        self.store.stats()
    }

    pub fn title(&self, doc_id: &str) -> Option<&str> {
        self.store.title(doc_id)
    }

    pub fn evaluator(&self) -> QueryEvaluator<'_> {
        QueryEvaluator::new(&self.store, self.bm25)
    }

    /// Extracts query terms with the same tokenizer used for the bodies.
    pub fn query_terms(&self, query: &str) -> Vec<Term> {
        self.tokenizer.tokenize(query)
    }

    pub fn search_terms<S: AsRef<str>>(&self, terms: &[S], top_n: usize) -> Vec<SearchHit> {
        self.evaluator().search(terms, top_n)
    }

    pub fn search_text(&self, query: &str, top_n: usize) -> Vec<SearchHit> {
        self.search_terms(&self.query_terms(query), top_n)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("documents", &self.store.len())
            .field("terms", &self.store.term_count())
            .field("bm25", &self.bm25)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
