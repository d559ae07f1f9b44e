// src/provider.rs
//! Pluggable analysis providers behind one capability trait.
//!
//! The keyword engine is the canonical, deterministic provider; the OpenAI
//! provider is a drop-in alternative producing the same output shape. The
//! choice is made once at construction from configuration, never by runtime
//! branching inside the analysis path. Provider failures degrade to an
//! all-zero `Analysis` with an explanatory summary so a batch never halts on
//! one listing.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AnalyzerConfig;
use crate::engine::EngineHandle;
use crate::listing::Listing;
use crate::report::Analysis;
use crate::scoring::ScoringWeights;

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Analyze one listing. Total: implementations degrade internally and
    /// always return the full output shape.
    async fn analyze(&self, listing: &Listing) -> Analysis;

    /// Provider name for diagnostics/headers.
    fn provider_name(&self) -> &'static str;
}

/// Trait object used by the API layer and the batch pipeline.
pub type DynProvider = Arc<dyn AnalysisProvider>;

/// Factory: build a provider according to config and environment.
///
/// * If `ANALYZER_TEST_MODE=mock`, returns a deterministic mock provider.
/// * `provider = "openai"` builds the model-backed provider.
/// * Anything else (including the default) is the keyword engine.
pub fn build_provider(cfg: &AnalyzerConfig, engine: EngineHandle) -> DynProvider {
    if std::env::var("ANALYZER_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockAnalyzer::default());
    }

    match cfg.analyzer.provider.as_str() {
        "openai" => Arc::new(OpenAiAnalyzer::new(
            cfg.analyzer.model.as_deref(),
            cfg.scoring,
        )),
        "keyword" => Arc::new(KeywordAnalyzer::new(engine)),
        other => {
            warn!(provider = other, "unknown analysis provider; using keyword engine");
            Arc::new(KeywordAnalyzer::new(engine))
        }
    }
}

// ------------------------------------------------------------
// Keyword provider (canonical path)
// ------------------------------------------------------------

pub struct KeywordAnalyzer {
    engine: EngineHandle,
}

impl KeywordAnalyzer {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl AnalysisProvider for KeywordAnalyzer {
    async fn analyze(&self, listing: &Listing) -> Analysis {
        let text = listing.analysis_text();
        if text.is_empty() {
            warn!(id = %listing.id, "no descriptive text on listing");
            return Analysis::empty();
        }
        self.engine.analyze(&text)
    }

    fn provider_name(&self) -> &'static str {
        "keyword"
    }
}

// ------------------------------------------------------------
// OpenAI provider (model-backed alternative)
// ------------------------------------------------------------

/// Chat-completions provider. Requires `OPENAI_API_KEY`; any failure
/// (missing key, transport, bad JSON) degrades per-listing.
pub struct OpenAiAnalyzer {
    http: reqwest::Client,
    api_key: String,
    model: String,
    weights: ScoringWeights,
}

impl OpenAiAnalyzer {
    pub fn new(model_override: Option<&str>, weights: ScoringWeights) -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("cre-deal-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        let model = model_override.unwrap_or("gpt-4o-mini").to_string();
        Self {
            http,
            api_key,
            model,
            weights,
        }
    }

    async fn fetch(&self, listing: &Listing) -> anyhow::Result<Analysis> {
        if self.api_key.is_empty() {
            return Err(anyhow!("OPENAI_API_KEY not set"));
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            response_format: serde_json::Value,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let user = format!(
            "Property Type: {}\nPrice: {}\nLocation: {}\n\nListing Description:\n{}",
            listing.property_type,
            listing.price.as_deref().unwrap_or("Unknown"),
            listing.address,
            listing.analysis_text(),
        );
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.2,
            response_format: serde_json::json!({ "type": "json_object" }),
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("openai returned status {}", resp.status()));
        }
        let body: Resp = resp.json().await.context("openai response body")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");

        let mut analysis: Analysis =
            serde_json::from_str(content).context("model output did not match result shape")?;
        analysis.highlight = analysis.total_score >= self.weights.highlight_threshold;
        Ok(analysis)
    }
}

#[async_trait]
impl AnalysisProvider for OpenAiAnalyzer {
    async fn analyze(&self, listing: &Listing) -> Analysis {
        match self.fetch(listing).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(id = %listing.id, error = %e, "model-backed analysis failed; degrading");
                Analysis::empty_with_summary(format!("Analysis provider failed: {e}"))
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

const SYSTEM_PROMPT: &str = "\
You are a commercial real estate investment analyst. Analyze the listing for \
seller motivation, transaction complexity, and property characteristics. Score \
each category 0-10 and compute a weighted total (40/30/30). Respond in JSON \
only, with keys: seller_motivation_score, transaction_complexity_score, \
property_characteristics_score, total_score, seller_motivation_matches, \
transaction_complexity_matches, property_characteristics_matches, summary. \
The *_matches values are arrays of keywords or phrases found in the text.";

// ------------------------------------------------------------
// Mock provider for tests/local runs
// ------------------------------------------------------------

#[derive(Clone)]
pub struct MockAnalyzer {
    pub fixed: Analysis,
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self {
            fixed: Analysis {
                seller_motivation_score: 2.0,
                seller_motivation_matches: vec!["motivated".to_string()],
                total_score: 0.8,
                summary: "Seller: motivated".to_string(),
                ..Analysis::empty()
            },
        }
    }
}

#[async_trait]
impl AnalysisProvider for MockAnalyzer {
    async fn analyze(&self, _listing: &Listing) -> Analysis {
        self.fixed.clone()
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
