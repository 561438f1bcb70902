use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sri_core::EngineConfig;
use sri_indexer::SourceOptions;
use sri_server::{build_app, AppState, IndexSource};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_corpus(dir: &Path) {
    fs::write(
        dir.join("corpus.jsonl"),
        concat!(
            "{\"id\":\"D1\",\"title\":\"Gatos e cães\",\"body\":\"gato gato cachorro\"}\n",
            "{\"id\":\"D2\",\"title\":\"Gato\",\"body\":\"gato\"}\n",
            "{\"id\":\"D3\",\"title\":\"Aves\",\"body\":\"arara tucano\"}\n",
        ),
    )
    .unwrap();
}

fn state_for(dir: &Path) -> AppState {
    let source = IndexSource {
        input: dir.to_path_buf(),
        config: EngineConfig::default(),
        options: SourceOptions::default(),
    };
    let engine = source.build().unwrap();
    AppState::new(engine)
        .with_source(source)
        .with_admin_token(Some("secret".into()))
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn rebuild(token: &str) -> Request<Body> {
    Request::post("/index/rebuild")
        .header("X-ADMIN-TOKEN", token)
        .body(Body::empty())
        .unwrap()
}

fn result_ids(json: &Value) -> Vec<String> {
    json["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["doc_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let app = build_app(state_for(dir.path()));

    let (status, json) = call(app.clone(), get("/search?q=gato&k=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result_ids(&json), vec!["D1", "D2"]);
    assert_eq!(json["total_hits"], 2);
    assert_eq!(json["results"][0]["title"], "Gatos e cães");

    let (_, json) = call(app, get("/search?q=gato&k=1")).await;
    assert_eq!(result_ids(&json), vec!["D1"]);
    assert_eq!(json["total_hits"], 2);
}

#[tokio::test]
async fn empty_and_zero_limit_queries_are_not_errors() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let app = build_app(state_for(dir.path()));

    let (status, json) = call(app.clone(), get("/search?q=")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(result_ids(&json).is_empty());

    let (status, json) = call(app.clone(), get("/search?q=gato&k=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(result_ids(&json).is_empty());

    let (status, _) = call(app, get("/search?q=gato&k=1000000")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn doc_and_stats_endpoints() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let app = build_app(state_for(dir.path()));

    let (status, json) = call(app.clone(), get("/doc/D3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Aves");
    assert_eq!(json["doc_id"], "D3");
    assert_eq!(json["length"], 2);

    let (status, _) = call(app.clone(), get("/doc/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = call(app, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["document_count"], 3);
}

#[tokio::test]
async fn rebuild_swaps_in_new_index() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let app = build_app(state_for(dir.path()));

    let (status, _) = call(app.clone(), rebuild("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    fs::write(dir.path().join("more.jsonl"), "{\"id\":\"D4\",\"title\":\"Peixe\",\"body\":\"peixe\"}\n").unwrap();
    let (status, json) = call(app.clone(), rebuild("secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["document_count"], 4);

    let (_, json) = call(app, get("/search?q=peixe")).await;
    assert_eq!(result_ids(&json), vec!["D4"]);
}

#[tokio::test]
async fn failed_rebuild_keeps_serving_previous_index() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let app = build_app(state_for(dir.path()));

    fs::write(dir.path().join("dup.jsonl"), "{\"id\":\"D1\",\"body\":\"duplicado\"}\n").unwrap();
    let (status, _) = call(app.clone(), rebuild("secret")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, json) = call(app.clone(), get("/stats")).await;
    assert_eq!(json["document_count"], 3);
    let (_, json) = call(app, get("/search?q=gato")).await;
    assert_eq!(result_ids(&json), vec!["D1", "D2"]);
}
