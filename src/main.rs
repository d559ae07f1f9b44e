//! CRE Deal Analyzer - Binary Entrypoint
//! Boots the Axum HTTP server, wiring the keyword engine, the analysis
//! provider, and the optional config hot-reload watcher.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cre_deal_analyzer::api::{create_router, AppState};
use cre_deal_analyzer::config::{self, AnalyzerConfig};
use cre_deal_analyzer::engine::{start_hot_reload_thread, EngineHandle, KeywordEngine};
use cre_deal_analyzer::provider::build_provider;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - ANALYZER_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("ANALYZER_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cre_deal_analyzer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This enables
    // ANALYZER_CONFIG_PATH / ANALYZER_HIGHLIGHT_THRESHOLD from .env.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = AnalyzerConfig::load().expect("Failed to load analyzer config");
    let engine = KeywordEngine::new(cfg.clone()).expect("Failed to compile keyword config");
    let handle = EngineHandle::new(engine);

    // If hot reload is enabled, spawn the background watcher.
    start_hot_reload_thread(handle.clone(), config::resolve_config_path());

    let provider = build_provider(&cfg, handle.clone());
    let state = AppState {
        engine: handle,
        provider,
    };
    Ok(create_router(state).into())
}
