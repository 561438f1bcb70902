use crate::error::{IndexError, Result};
use crate::index::PostingStore;
use crate::tokenizer::{Term, Tokenizer};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Documents handed to the worker pool per round in a parallel build.
const PARALLEL_CHUNK: usize = 1024;

/// A normalized document as delivered by acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub body: String,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), body: body.into() }
    }
}

/// One document reduced to what the store needs: its length and per-term counts.
#[derive(Debug)]
struct DocumentBatch {
    id: String,
    title: String,
    length: u32,
    counts: Vec<(Term, u32)>,
}

/// Folds a token stream into `(term, count)` pairs, sorted by term.
pub fn fold_terms(tokens: Vec<Term>) -> Vec<(Term, u32)> {
    let mut counts: HashMap<Term, u32> = HashMap::new();
    for token in tokens {
        *counts.entry(token).or_insert(0) += 1;
    }
    let mut counts: Vec<(Term, u32)> = counts.into_iter().collect();
    counts.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    counts
}

/// Drives the tokenizer and populates a [`PostingStore`].
///
/// A build stops at the first bad document and returns its error. Mutations
/// made before that point are not rolled back, so callers that need an
/// all-or-nothing build should build into a fresh store and only keep it on
/// success.
#[derive(Clone)]
pub struct IndexBuilder {
    tokenizer: Arc<dyn Tokenizer>,
    parallel: bool,
}

impl IndexBuilder {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer, parallel: false }
    }

    /// Tokenize on the rayon pool; the store is still written by one thread,
    /// in input order.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build<I>(&self, documents: I) -> Result<PostingStore>
    where
        I: IntoIterator<Item = SourceDocument>,
    {
        let mut store = PostingStore::new();
        self.build_into(&mut store, documents)?;
        Ok(store)
    }

    /// Adds `documents` to an existing store.
    pub fn build_into<I>(&self, store: &mut PostingStore, documents: I) -> Result<()>
    where
        I: IntoIterator<Item = SourceDocument>,
    {
        let before = store.len();
        if self.parallel {
            let documents: Vec<SourceDocument> = documents.into_iter().collect();
            for chunk in documents.chunks(PARALLEL_CHUNK) {
                let batches: Vec<Result<DocumentBatch>> =
                    chunk.par_iter().map(|doc| self.analyze(doc)).collect();
                for batch in batches {
                    apply(store, batch?)?;
                }
                debug!(docs = chunk.len(), total = store.len(), "applied batch");
            }
        } else {
            for doc in documents {
                apply(store, self.analyze(&doc)?)?;
            }
        }

        let stats = store.stats();
        info!(
            added = store.len() - before,
            num_docs = stats.document_count,
            num_terms = store.term_count(),
            avg_doc_len = stats.average_document_length,
            "index build complete"
        );
        Ok(())
    }

    fn analyze(&self, doc: &SourceDocument) -> Result<DocumentBatch> {
        if doc.id.trim().is_empty() {
            return Err(IndexError::MalformedDocument {
                id: doc.id.clone(),
                reason: "empty document id".into(),
            });
        }
        let tokens = self.tokenizer.tokenize(&doc.body);
        let length = u32::try_from(tokens.len()).map_err(|_| IndexError::MalformedDocument {
            id: doc.id.clone(),
            reason: format!("{} tokens exceeds the supported length", tokens.len()),
        })?;
        Ok(DocumentBatch {
            id: doc.id.clone(),
            title: doc.title.clone(),
            length,
            counts: fold_terms(tokens),
        })
    }
}

fn apply(store: &mut PostingStore, batch: DocumentBatch) -> Result<()> {
    let doc_id = store.add_document(&batch.id, &batch.title, batch.length)?.doc_id;
    for (term, count) in &batch.counts {
        store.add_occurrence_by_id(term, doc_id, *count)?;
    }
    Ok(())
}
