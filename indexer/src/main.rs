use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sri_core::{Engine, EngineConfig, Language, SearchHit, TokenizerKind};
use sri_indexer::{build_engine, load_config, load_queries, load_stopwords, SourceOptions};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sri-indexer")]
#[command(about = "Index an article dump in memory and rank BM25 queries against it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print corpus statistics
    Stats {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Run a single query
    Search {
        #[command(flatten)]
        index: IndexArgs,
        /// Query text
        query: String,
        /// Number of results
        #[arg(short = 'k', long)]
        top_n: Option<usize>,
    },
    /// Run every line of a query file
    Batch {
        #[command(flatten)]
        index: IndexArgs,
        /// File with one query per line
        #[arg(long)]
        queries: PathBuf,
        /// Number of results per query
        #[arg(short = 'k', long)]
        top_n: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TokenizerArg {
    Whitespace,
    Analyzing,
}

#[derive(Clone, Copy, ValueEnum)]
enum LanguageArg {
    Portuguese,
    English,
}

#[derive(Args)]
struct IndexArgs {
    /// Input path (TREC .xml/.trec, .json, .jsonl, or a directory of them)
    #[arg(long)]
    input: PathBuf,
    /// JSON engine configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop-word file, one word per line
    #[arg(long)]
    stopwords: Option<PathBuf>,
    #[arg(long, value_enum)]
    tokenizer: Option<TokenizerArg>,
    #[arg(long, value_enum)]
    language: Option<LanguageArg>,
    /// Disable stemming in the analyzing tokenizer
    #[arg(long, default_value_t = false)]
    no_stemming: bool,
    /// BM25 term-frequency saturation
    #[arg(long)]
    k1: Option<f64>,
    /// BM25 length normalization
    #[arg(long)]
    b: Option<f64>,
    /// Index bodies as given, without markup cleaning
    #[arg(long, default_value_t = false)]
    raw: bool,
    /// Tokenize on a single thread
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

impl IndexArgs {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(kind) = self.tokenizer {
            config.tokenizer.kind = match kind {
                TokenizerArg::Whitespace => TokenizerKind::Whitespace,
                TokenizerArg::Analyzing => TokenizerKind::Analyzing,
            };
        }
        if let Some(language) = self.language {
            config.tokenizer.language = match language {
                LanguageArg::Portuguese => Language::Portuguese,
                LanguageArg::English => Language::English,
            };
        }
        if self.no_stemming {
            config.tokenizer.stemming = false;
        }
        if let Some(path) = &self.stopwords {
            config.tokenizer.stopwords = Some(load_stopwords(path)?);
        }
        if let Some(k1) = self.k1 {
            config.bm25.k1 = k1;
        }
        if let Some(b) = self.b {
            config.bm25.b = b;
        }
        if self.sequential {
            config = config.sequential();
        }
        config.validate()?;
        Ok(config)
    }

    fn engine(&self) -> Result<Engine> {
        let options = SourceOptions { clean: !self.raw };
        build_engine(&self.input, self.engine_config()?, &options)
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { index } => {
            let engine = index.engine()?;
            let stats = engine.stats();
            println!("documents\t{}", stats.document_count);
            println!("avg_length\t{:.3}", stats.average_document_length);
            println!("terms\t{}", engine.store().term_count());
        }
        Commands::Search { index, query, top_n } => {
            let engine = index.engine()?;
            let top_n = resolve_top_n(&engine, top_n)?;
            print_hits(&engine, &engine.search_text(&query, top_n));
        }
        Commands::Batch { index, queries, top_n } => {
            let engine = index.engine()?;
            let top_n = resolve_top_n(&engine, top_n)?;
            for query in load_queries(&queries)? {
                println!("Query: {query}");
                print_hits(&engine, &engine.search_text(&query, top_n));
                println!();
            }
        }
    }
    Ok(())
}

fn resolve_top_n(engine: &Engine, top_n: Option<usize>) -> Result<usize> {
    let config = engine.config();
    Ok(config.check_top_n(top_n.unwrap_or(config.default_top_n))?)
}

fn print_hits(engine: &Engine, hits: &[SearchHit]) {
    for (rank, hit) in hits.iter().enumerate() {
        let title = engine.title(&hit.doc_id).unwrap_or("");
        println!("{:>4}\t{:>6}\t{:>12.6}\t{}", rank, hit.doc_id, hit.score, title);
    }
}
