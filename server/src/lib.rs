use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sri_core::{CorpusStatistics, DocumentEntry, Engine, EngineConfig};
use sri_indexer::{build_engine, SourceOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    pub title: String,
}

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CorpusStatistics,
    pub num_terms: usize,
}

/// Where the served index comes from, so it can be rebuilt on demand.
#[derive(Debug, Clone)]
pub struct IndexSource {
    pub input: PathBuf,
    pub config: EngineConfig,
    pub options: SourceOptions,
}

impl IndexSource {
    pub fn build(&self) -> anyhow::Result<Engine> {
        build_engine(&self.input, self.config.clone(), &self.options)
    }
}

#[derive(Clone)]
pub struct AppState {
    /// Swapped wholesale on rebuild; requests work on the `Arc` they cloned.
    engine: Arc<RwLock<Arc<Engine>>>,
    source: Option<Arc<IndexSource>>,
    admin_token: Option<String>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self { engine: Arc::new(RwLock::new(Arc::new(engine))), source: None, admin_token: None }
    }

    pub fn with_source(mut self, source: IndexSource) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token;
        self
    }

    pub fn engine(&self) -> Arc<Engine> {
        self.engine.read().clone()
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                base.allow_origin(Any)
            } else {
                base.allow_origin(AllowOrigin::list(origins))
            }
        }
        Err(_) => base.allow_origin(Any),
    }
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();
    let engine = state.engine();
    let config = engine.config();
    let k = config
        .check_top_n(params.k.unwrap_or(config.default_top_n))
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let terms = engine.query_terms(&params.q);
    let (total_hits, hits) = engine.evaluator().search_counted(&terms, k);
    let results = hits
        .into_iter()
        .map(|hit| SearchHit {
            title: engine.title(&hit.doc_id).unwrap_or_default().to_owned(),
            doc_id: hit.doc_id,
            score: hit.score,
        })
        .collect();

    Ok(Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), total_hits, results }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<DocumentEntry>, ApiError> {
    state
        .engine()
        .store()
        .document_by_external_id(&doc_id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("document {doc_id} not found")))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = state.engine();
    Json(StatsResponse { stats: engine.stats(), num_terms: engine.store().term_count() })
}

/// Rebuilds from the configured source into a fresh engine and swaps it in
/// only if the whole build succeeds.
async fn rebuild_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, ApiError> {
    authorize(&state, &headers)?;
    let source = state
        .source
        .clone()
        .ok_or((StatusCode::CONFLICT, "no index source configured".to_string()))?;

    let built = tokio::task::spawn_blocking(move || source.build())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let engine = match built {
        Ok(engine) => engine,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "rebuild failed, keeping current index");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")));
        }
    };

    let response = StatsResponse { stats: engine.stats(), num_terms: engine.store().term_count() };
    *state.engine.write() = Arc::new(engine);
    tracing::info!(num_docs = response.stats.document_count, "index swapped");
    Ok(Json(response))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
