// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod category;
pub mod clues;
pub mod config;
pub mod engine;
pub mod filtering;
pub mod listing;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod scoring;
pub mod storage;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::category::Category;
pub use crate::config::AnalyzerConfig;
pub use crate::engine::{EngineHandle, KeywordEngine, MatchReport};
pub use crate::listing::{AnalyzedListing, Listing};
pub use crate::provider::{build_provider, AnalysisProvider, DynProvider};
pub use crate::report::Analysis;
pub use crate::scoring::{ScoringWeights, TotalScoreMode};
