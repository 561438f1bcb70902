//! Document acquisition for the search engine: reading article dumps,
//! cleaning their text, and building an [`Engine`] from them.

pub mod normalize;
pub mod source;
pub mod trec;

use anyhow::{Context, Result};
use sri_core::{Engine, EngineConfig};
use std::path::Path;
use std::time::Instant;

pub use source::{load_config, load_documents, load_queries, load_stopwords, SourceOptions};

/// Loads every document under `input` and builds a fresh engine from them.
pub fn build_engine(input: &Path, config: EngineConfig, options: &SourceOptions) -> Result<Engine> {
    let start = Instant::now();
    let docs = load_documents(input, options)?;
    let num_docs = docs.len();
    let engine = Engine::build(config, docs)
        .with_context(|| format!("failed to index {}", input.display()))?;
    tracing::info!(
        input = %input.display(),
        num_docs,
        num_terms = engine.store().term_count(),
        took_s = start.elapsed().as_secs_f64(),
        "engine ready"
    );
    Ok(engine)
}
