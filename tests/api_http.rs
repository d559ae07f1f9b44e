// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /analyze (with and without match contexts)
// - POST /analyze-listing
// - POST /batch (filtering + ranking)

use std::sync::Arc;

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use cre_deal_analyzer::api::{create_router, AppState};
use cre_deal_analyzer::engine::EngineHandle;
use cre_deal_analyzer::provider::{DynProvider, KeywordAnalyzer};
use cre_deal_analyzer::storage;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses, on default keywords.
fn test_router() -> Router {
    let engine = EngineHandle::with_defaults();
    let provider: DynProvider = Arc::new(KeywordAnalyzer::new(engine.clone()));
    create_router(AppState { engine, provider })
}

async fn json_body(resp: shuttle_axum::axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn analyze_returns_the_result_shape() {
    let app = test_router();

    let payload = json!({ "text": "Motivated seller, foreclosure auction, vacant building." });
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /analyze");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert!(v["seller_motivation_score"].as_f64().unwrap() > 0.0);
    assert!(v["total_score"].as_f64().unwrap() > 0.0);
    assert!(v["summary"].as_str().unwrap().starts_with("Seller:"));
    // Contexts are opt-in.
    assert!(v.get("matches").is_none());
}

#[tokio::test]
async fn analyze_with_contexts_includes_snippets() {
    let app = test_router();

    let payload = json!({
        "text": "Long-held asset, owner retiring and ready to deal.",
        "include_matches": true
    });
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /analyze");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    let v = json_body(resp).await;

    let hits = v["matches"]["categories"]["seller_motivation"]
        .as_array()
        .expect("seller hits");
    assert!(hits.iter().any(|h| h["keyword"] == "owner retiring"
        && h["context"].as_str().unwrap().contains("retiring")));
}

#[tokio::test]
async fn analyze_listing_flattens_listing_and_nests_analysis() {
    let app = test_router();

    let payload = json!({
        "id": "lst-9",
        "propertyType": "Office",
        "address": "100 Main St, Madison, WI 53703",
        "description": "Bankruptcy sale, priced to sell."
    });
    let req = Request::builder()
        .method("POST")
        .uri("/analyze-listing")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /analyze-listing");

    let resp = app.oneshot(req).await.expect("oneshot /analyze-listing");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["id"], "lst-9");
    assert_eq!(v["propertyType"], "Office");
    assert!(v["analysis"]["seller_motivation_score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn batch_filters_and_ranks_by_total_score() {
    let app = test_router();

    let payload = json!({
        "listings": [
            { "id": "mild", "state": "WI", "description": "Vacant space available." },
            { "id": "hot", "state": "WI",
              "description": "Motivated seller, foreclosure auction, vacant, value add." },
            { "id": "dropped", "state": "TX", "description": "Motivated seller." }
        ],
        "filters": { "states": ["WI"] }
    });
    let req = Request::builder()
        .method("POST")
        .uri("/batch")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /batch");

    let resp = app.oneshot(req).await.expect("oneshot /batch");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    let rows = v.as_array().expect("array body");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "hot");
    assert_eq!(rows[1]["id"], "mild");
}

#[tokio::test]
#[serial_test::serial]
async fn batch_with_save_persists_a_timestamped_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    std::env::set_var(storage::ENV_DATA_DIR, tmp.path());

    let app = test_router();
    let payload = json!({
        "listings": [
            { "id": "keep", "description": "Motivated seller, vacant building." }
        ],
        "save": true
    });
    let req = Request::builder()
        .method("POST")
        .uri("/batch")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /batch");

    let resp = app.oneshot(req).await.expect("oneshot /batch");
    assert_eq!(resp.status(), StatusCode::OK);

    let saved = storage::list_saved_batches(tmp.path()).expect("list saved");
    assert_eq!(saved.len(), 1);
    let batch = storage::load_batch(&saved[0]).expect("load saved");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].listing.id, "keep");
    assert!(batch[0].analysis.seller_motivation_score > 0.0);

    std::env::remove_var(storage::ENV_DATA_DIR);
}
