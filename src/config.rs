//! Analyzer configuration: provider selection, scoring weights, and the
//! category→keyword lists, loaded from one TOML file.
//!
//! Resolution order: `$ANALYZER_CONFIG_PATH`, then `config/analyzer.toml`,
//! then the built-in defaults. A missing file is not an error (the built-in
//! keyword lists mirror the domain defaults), but a malformed file is.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use crate::scoring::ScoringWeights;

pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer.toml";

pub const ENV_CONFIG_PATH: &str = "ANALYZER_CONFIG_PATH";
pub const ENV_HIGHLIGHT_THRESHOLD: &str = "ANALYZER_HIGHLIGHT_THRESHOLD";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub analyzer: AnalyzerSection,
    #[serde(default)]
    pub scoring: ScoringWeights,
    /// Category key → ordered keyword list. Unknown keys are matched but
    /// carry no weight in the total score.
    #[serde(default)]
    pub keywords: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerSection {
    /// "keyword" | "openai"
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model override for the openai provider.
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for AnalyzerSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
        }
    }
}

fn default_provider() -> String {
    "keyword".to_string()
}

impl AnalyzerConfig {
    /// Parse from a TOML string. Empty keyword table falls back to defaults.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: AnalyzerConfig = toml::from_str(toml_str)?;
        if cfg.keywords.is_empty() {
            cfg.keywords = default_keywords();
        }
        Ok(cfg)
    }

    /// Load using env var + fallbacks, then apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = resolve_config_path();
        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading analyzer config at {}", path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("parsing analyzer config at {}", path.display()))?
        } else {
            tracing::warn!(path = %path.display(), "analyzer config not found; using built-in defaults");
            Self::default_config()
        };

        if let Some(t) = parse_threshold_env(std::env::var(ENV_HIGHLIGHT_THRESHOLD).ok()) {
            cfg.scoring.highlight_threshold = t;
        } else if !cfg.scoring.highlight_threshold.is_finite() {
            cfg.scoring.highlight_threshold = ScoringWeights::default().highlight_threshold;
        }

        Ok(cfg)
    }

    /// Built-in configuration: keyword provider, domain-default weights and
    /// keyword lists.
    pub fn default_config() -> Self {
        Self {
            analyzer: AnalyzerSection::default(),
            scoring: ScoringWeights::default(),
            keywords: default_keywords(),
        }
    }

    pub fn keywords_for(&self, key: &str) -> &[String] {
        self.keywords.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub fn resolve_config_path() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

// parse optional float env and clamp to <0.0..=10.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .map(|v| v.clamp(0.0, 10.0))
}

/// Domain-default keyword lists for the three categories.
pub fn default_keywords() -> BTreeMap<String, Vec<String>> {
    fn owned(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }
    let mut map = BTreeMap::new();
    map.insert(
        "seller_motivation".to_string(),
        owned(&[
            "motivated",
            "must sell",
            "priced to sell",
            "urgent",
            "distressed",
            "liquidation",
            "bankruptcy",
            "foreclosure",
            "below market",
            "quick sale",
            "owner retiring",
            "relocating",
            "estate sale",
        ]),
    );
    map.insert(
        "transaction_complexity".to_string(),
        owned(&[
            "foreclosure",
            "bankruptcy",
            "short sale",
            "legal issues",
            "title issues",
            "tax sale",
            "auction",
            "portfolio",
            "multiple parcels",
            "complex",
            "special purpose",
            "encumbrance",
        ]),
    );
    map.insert(
        "property_characteristics".to_string(),
        owned(&[
            "below market",
            "value add",
            "upside",
            "fixer upper",
            "vacant",
            "deferred maintenance",
            "renovation",
            "redevelopment",
            "reposition",
            "class b",
            "class c",
            "distressed",
            "underperforming",
        ]),
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::TotalScoreMode;

    #[test]
    fn parses_full_config() {
        let cfg = AnalyzerConfig::from_toml_str(
            r#"
[analyzer]
provider = "openai"
model = "gpt-4o-mini"

[scoring]
seller_motivation_weight = 0.5
transaction_complexity_weight = 0.25
property_characteristics_weight = 0.25
highlight_threshold = 6.5
total_score_mode = "normalized_average"

[keywords]
seller_motivation = ["motivated", "must sell"]
transaction_complexity = ["auction"]
property_characteristics = ["vacant"]
"#,
        )
        .expect("parse config");
        assert_eq!(cfg.analyzer.provider, "openai");
        assert_eq!(cfg.analyzer.model.as_deref(), Some("gpt-4o-mini"));
        assert!((cfg.scoring.seller_motivation_weight - 0.5).abs() < f32::EPSILON);
        assert!((cfg.scoring.highlight_threshold - 6.5).abs() < f32::EPSILON);
        assert_eq!(cfg.scoring.total_score_mode, TotalScoreMode::NormalizedAverage);
        assert_eq!(cfg.keywords_for("seller_motivation"), ["motivated", "must sell"]);
        assert!(cfg.keywords_for("unknown_category").is_empty());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg = AnalyzerConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(cfg.analyzer.provider, "keyword");
        assert!((cfg.scoring.seller_motivation_weight - 0.4).abs() < f32::EPSILON);
        assert!((cfg.scoring.highlight_threshold - 7.0).abs() < f32::EPSILON);
        // Empty keyword table means built-in lists.
        assert!(!cfg.keywords_for("seller_motivation").is_empty());
        assert!(!cfg.keywords_for("property_characteristics").is_empty());
    }

    #[test]
    fn threshold_env_parse_clamps() {
        assert_eq!(parse_threshold_env(Some(" 6.5 ".to_string())), Some(6.5));
        assert_eq!(parse_threshold_env(Some("12".to_string())), Some(10.0));
        assert_eq!(parse_threshold_env(Some("-1".to_string())), Some(0.0));
        assert_eq!(parse_threshold_env(Some("abc".to_string())), None);
        assert_eq!(parse_threshold_env(None), None);
    }

    #[serial_test::serial]
    #[test]
    fn load_prefers_env_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("analyzer.toml");
        std::fs::write(
            &path,
            r#"
[scoring]
highlight_threshold = 5.0
"#,
        )
        .unwrap();

        std::env::set_var(ENV_CONFIG_PATH, path.display().to_string());
        std::env::remove_var(ENV_HIGHLIGHT_THRESHOLD);
        let cfg = AnalyzerConfig::load().expect("load from env path");
        assert!((cfg.scoring.highlight_threshold - 5.0).abs() < f32::EPSILON);

        // Env threshold override wins over the file.
        std::env::set_var(ENV_HIGHLIGHT_THRESHOLD, "8");
        let cfg = AnalyzerConfig::load().expect("load with threshold override");
        assert!((cfg.scoring.highlight_threshold - 8.0).abs() < f32::EPSILON);

        std::env::remove_var(ENV_CONFIG_PATH);
        std::env::remove_var(ENV_HIGHLIGHT_THRESHOLD);
    }
}
