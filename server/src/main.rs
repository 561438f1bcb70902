use anyhow::Result;
use axum::Router;
use clap::Parser;
use sri_indexer::{load_config, load_stopwords, SourceOptions};
use sri_server::{build_app, AppState, IndexSource};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Article dump (TREC .xml/.trec, .json, .jsonl, or a directory of them)
    #[arg(long)]
    input: PathBuf,
    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop-word file, one word per line
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Index bodies as given, without markup cleaning
    #[arg(long, default_value_t = false)]
    raw: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(path) = &args.stopwords {
        config.tokenizer.stopwords = Some(load_stopwords(path)?);
    }
    let source = IndexSource { input: args.input, config, options: SourceOptions { clean: !args.raw } };
    let engine = source.build()?;

    let state = AppState::new(engine)
        .with_source(source)
        .with_admin_token(std::env::var("ADMIN_TOKEN").ok());
    let app: Router = build_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
