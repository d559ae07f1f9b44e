use shuttle_axum::axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config;
use crate::engine::{EngineHandle, KeywordEngine, MatchReport};
use crate::listing::{AnalyzedListing, Listing};
use crate::pipeline::{self, BatchFilters};
use crate::provider::DynProvider;
use crate::report::Analysis;
use crate::storage;

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub provider: DynProvider,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/analyze-listing", post(analyze_listing))
        .route("/batch", post(analyze_batch))
        .route("/admin/reload-config", get(admin_reload_config))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
    #[serde(default)]
    include_matches: bool,
}

#[derive(serde::Serialize)]
struct AnalyzeResp {
    #[serde(flatten)]
    analysis: Analysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<MatchReport>,
}

/// Score raw text with the keyword engine. `include_matches: true` adds the
/// per-category hits with their context snippets.
async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeReq>) -> Json<AnalyzeResp> {
    let matches = body.include_matches.then(|| state.engine.match_text(&body.text));
    let analysis = state.engine.analyze(&body.text);
    Json(AnalyzeResp { analysis, matches })
}

/// Analyze one structured listing through the configured provider.
async fn analyze_listing(
    State(state): State<AppState>,
    Json(listing): Json<Listing>,
) -> Json<AnalyzedListing> {
    let analysis = state.provider.analyze(&listing).await;
    Json(AnalyzedListing { listing, analysis })
}

#[derive(serde::Deserialize)]
struct BatchReq {
    listings: Vec<Listing>,
    #[serde(default)]
    filters: BatchFilters,
    /// Persist the analyzed batch as a timestamped JSON file under the data
    /// directory.
    #[serde(default)]
    save: bool,
}

/// Filter, analyze, and rank a batch of listings, best deals first.
/// With `save: true` the result is also written to disk; a write failure is
/// logged and the response still carries the batch.
async fn analyze_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchReq>,
) -> Json<Vec<AnalyzedListing>> {
    let out = pipeline::run_batch(&state.provider, body.listings, &body.filters).await;
    if body.save {
        if let Err(e) = storage::save_batch(storage::resolve_data_dir(), &out) {
            error!(error = %e, "failed to persist batch");
        }
    }
    Json(out)
}

/// Rebuild the keyword engine from the config file on disk. The previous
/// engine keeps serving if the reload fails.
async fn admin_reload_config(State(state): State<AppState>) -> String {
    match KeywordEngine::from_toml() {
        Ok(fresh) => {
            state.engine.replace(fresh);
            info!(path = %config::resolve_config_path().display(), "config reloaded");
            "reloaded".to_string()
        }
        Err(e) => {
            error!(error = %e, "config reload failed; keeping previous engine");
            format!("failed: {e}")
        }
    }
}
