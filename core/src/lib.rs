//! Inverted index construction and BM25 ranking over short articles.
//!
//! Documents flow through an [`IndexBuilder`] (driving a pluggable
//! [`Tokenizer`]) into a [`PostingStore`], which a [`QueryEvaluator`] reads to
//! produce ranked [`SearchHit`]s.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod scorer;
pub mod search;
pub mod tokenizer;

pub use builder::{fold_terms, IndexBuilder, SourceDocument};
pub use config::{Bm25Params, EngineConfig, TokenizerConfig, TokenizerKind};
pub use engine::Engine;
pub use error::{IndexError, Result};
pub use index::{CorpusStatistics, DocId, DocumentEntry, Posting, PostingStore, PostingsList};
pub use scorer::Bm25;
pub use search::{QueryEvaluator, SearchHit};
pub use tokenizer::{AnalyzingTokenizer, Language, Term, Tokenizer, WhitespaceTokenizer};
