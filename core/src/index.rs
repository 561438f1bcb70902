//! The inverted index proper: term → (document → term frequency), document
//! lengths, and corpus statistics.
//!
//! Documents are addressed externally by their string identifier and stored
//! internally under a dense `u32` [`DocId`] assigned in insertion order.

use crate::error::{IndexError, Result};
use crate::tokenizer::Term;
use serde::Serialize;
use std::collections::HashMap;

pub type DocId = u32;

/// Corpus-wide statistics needed for length normalization.
///
/// Immutable value; the store replaces it on every insertion so a reader
/// holding a copy keeps a consistent snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CorpusStatistics {
    pub document_count: u32,
    pub average_document_length: f64,
}

impl CorpusStatistics {
    /// Statistics after including one more document of `length` tokens.
    ///
    /// Running mean: `avg' = avg + (len - avg) / count'`.
    #[must_use]
    pub fn with_document(self, length: u32) -> Self {
        let document_count = self.document_count + 1;
        let delta = f64::from(length) - self.average_document_length;
        Self {
            document_count,
            average_document_length: self.average_document_length + delta / f64::from(document_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentEntry {
    #[serde(skip)]
    pub doc_id: DocId,
    #[serde(rename = "doc_id")]
    pub external_id: String,
    pub title: String,
    /// Token count of the body.
    pub length: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_frequency: u32,
}

/// Borrowed view of one term's postings. Empty when the term was never seen.
#[derive(Debug, Clone, Copy)]
pub struct PostingsList<'a> {
    entries: Option<&'a HashMap<DocId, u32>>,
}

impl<'a> PostingsList<'a> {
    pub fn len(&self) -> usize {
        self.entries.map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Term frequency in `doc_id`, 0 when there is no posting.
    pub fn get(&self, doc_id: DocId) -> u32 {
        self.entries
            .and_then(|e| e.get(&doc_id).copied())
            .unwrap_or(0)
    }

    /// Postings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = Posting> + 'a {
        self.entries
            .into_iter()
            .flat_map(|e| e.iter())
            .map(|(&doc_id, &term_frequency)| Posting { doc_id, term_frequency })
    }
}

#[derive(Debug, Default)]
pub struct PostingStore {
    postings: HashMap<Term, HashMap<DocId, u32>>,
    /// Indexed by `DocId`.
    docs: Vec<DocumentEntry>,
    doc_ids: HashMap<String, DocId>,
    stats: CorpusStatistics,
}

impl PostingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document. A duplicate identifier is rejected and leaves the
    /// store untouched.
    pub fn add_document(&mut self, external_id: &str, title: &str, length: u32) -> Result<&DocumentEntry> {
        if self.doc_ids.contains_key(external_id) {
            return Err(IndexError::DuplicateDocument(external_id.to_owned()));
        }
        let doc_id = DocId::try_from(self.docs.len()).map_err(|_| IndexError::MalformedDocument {
            id: external_id.to_owned(),
            reason: "document id space exhausted".into(),
        })?;
        self.doc_ids.insert(external_id.to_owned(), doc_id);
        self.docs.push(DocumentEntry {
            doc_id,
            external_id: external_id.to_owned(),
            title: title.to_owned(),
            length,
        });
        self.stats = self.stats.with_document(length);
        Ok(&self.docs[doc_id as usize])
    }

    /// Adds `count` occurrences of `term` to a registered document.
    pub fn add_occurrence(&mut self, term: &str, external_id: &str, count: u32) -> Result<()> {
        let doc_id = self
            .resolve(external_id)
            .ok_or_else(|| IndexError::UnknownDocument(external_id.to_owned()))?;
        self.add_occurrence_by_id(term, doc_id, count)
    }

    pub(crate) fn add_occurrence_by_id(&mut self, term: &str, doc_id: DocId, count: u32) -> Result<()> {
        if doc_id as usize >= self.docs.len() {
            return Err(IndexError::UnknownDocument(format!("#{doc_id}")));
        }
        if count == 0 {
            return Ok(());
        }
        let slot = self
            .postings
            .entry(term.to_owned())
            .or_default()
            .entry(doc_id)
            .or_insert(0);
        match slot.checked_add(count) {
            Some(total) => *slot = total,
            None => {
                return Err(IndexError::MalformedDocument {
                    id: self.docs[doc_id as usize].external_id.clone(),
                    reason: format!("term frequency of {term:?} overflows"),
                })
            }
        }
        Ok(())
    }

    pub fn postings(&self, term: &str) -> PostingsList<'_> {
        PostingsList { entries: self.postings.get(term) }
    }

    /// Number of distinct documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.postings.get(term).map_or(0, |e| e.len() as u32)
    }

    /// 0 when either the term or the document has no posting.
    pub fn term_frequency(&self, term: &str, external_id: &str) -> u32 {
        match self.resolve(external_id) {
            Some(doc_id) => self.postings(term).get(doc_id),
            None => 0,
        }
    }

    pub fn document_length(&self, external_id: &str) -> Result<u32> {
        self.document_by_external_id(external_id)
            .map(|d| d.length)
            .ok_or_else(|| IndexError::UnknownDocument(external_id.to_owned()))
    }

    pub fn stats(&self) -> CorpusStatistics {
        self.stats
    }

    pub fn title(&self, external_id: &str) -> Option<&str> {
        self.document_by_external_id(external_id).map(|d| d.title.as_str())
    }

    pub fn resolve(&self, external_id: &str) -> Option<DocId> {
        self.doc_ids.get(external_id).copied()
    }

    pub fn document(&self, doc_id: DocId) -> Option<&DocumentEntry> {
        self.docs.get(doc_id as usize)
    }

    pub fn document_by_external_id(&self, external_id: &str) -> Option<&DocumentEntry> {
        self.resolve(external_id).and_then(|id| self.document(id))
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.docs.iter()
    }

    /// Vocabulary size.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
