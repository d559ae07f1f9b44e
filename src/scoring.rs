//! Scoring: converts per-category match lists into bounded category scores
//! and one combined total.
//!
//! Each matched keyword contributes 2 points, capped at 10, so five or more
//! independent signals saturate a category. The canonical total is a literal
//! weighted sum of the three category scores (weights need not sum to 1);
//! `TotalScoreMode::NormalizedAverage` is the named alternate that ignores
//! weights and averages the raw category scores instead. The two are never
//! mixed implicitly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::report::{Analysis, NO_FACTORS_SUMMARY};

/// How the per-category scores combine into the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalScoreMode {
    #[default]
    WeightedSum,
    NormalizedAverage,
}

/// Category weights, highlight threshold, and total-score mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_seller_weight")]
    pub seller_motivation_weight: f32,
    #[serde(default = "default_transaction_weight")]
    pub transaction_complexity_weight: f32,
    #[serde(default = "default_property_weight")]
    pub property_characteristics_weight: f32,
    #[serde(default = "default_highlight_threshold")]
    pub highlight_threshold: f32,
    #[serde(default)]
    pub total_score_mode: TotalScoreMode,
}

fn default_seller_weight() -> f32 {
    0.4
}
fn default_transaction_weight() -> f32 {
    0.3
}
fn default_property_weight() -> f32 {
    0.3
}
fn default_highlight_threshold() -> f32 {
    7.0
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            seller_motivation_weight: default_seller_weight(),
            transaction_complexity_weight: default_transaction_weight(),
            property_characteristics_weight: default_property_weight(),
            highlight_threshold: default_highlight_threshold(),
            total_score_mode: TotalScoreMode::default(),
        }
    }
}

impl ScoringWeights {
    pub fn weight_for(&self, category: Category) -> f32 {
        match category {
            Category::SellerMotivation => self.seller_motivation_weight,
            Category::TransactionComplexity => self.transaction_complexity_weight,
            Category::PropertyCharacteristics => self.property_characteristics_weight,
        }
    }
}

/// Per-category score: 2 points per match, capped at 10. Monotonic in the
/// match count.
pub fn category_score(match_count: usize) -> f32 {
    ((match_count as f32) * 2.0).min(10.0)
}

/// Round to one decimal place.
pub fn round1(x: f32) -> f32 {
    (x * 10.0).round() / 10.0
}

/// Score a match map into a full `Analysis`. A category absent from `matches`
/// scores 0 with an empty list; unknown keys contribute nothing to the total.
pub fn score_matches(matches: &BTreeMap<String, Vec<String>>, weights: &ScoringWeights) -> Analysis {
    let per_category: [(Category, Vec<String>); 3] = Category::ALL.map(|c| {
        let kws = matches.get(c.key()).cloned().unwrap_or_default();
        (c, kws)
    });

    let scores: BTreeMap<Category, f32> = per_category
        .iter()
        .map(|(c, kws)| (*c, category_score(kws.len())))
        .collect();

    let total = match weights.total_score_mode {
        TotalScoreMode::WeightedSum => round1(
            Category::ALL
                .iter()
                .map(|c| scores[c] * weights.weight_for(*c))
                .sum(),
        ),
        TotalScoreMode::NormalizedAverage => {
            let sum: f32 = Category::ALL.iter().map(|c| scores[c]).sum();
            round1(sum / (Category::ALL.len() as f32)).min(10.0)
        }
    };

    let summary = investment_summary(&per_category);
    let highlight = total >= weights.highlight_threshold;

    let [(_, seller), (_, transaction), (_, property)] = per_category;
    Analysis {
        seller_motivation_score: scores[&Category::SellerMotivation],
        transaction_complexity_score: scores[&Category::TransactionComplexity],
        property_characteristics_score: scores[&Category::PropertyCharacteristics],
        total_score: total,
        seller_motivation_matches: seller,
        transaction_complexity_matches: transaction,
        property_characteristics_matches: property,
        highlight,
        summary,
    }
}

/// Semicolon-joined `"<Label>: kw1, kw2"` parts for non-empty categories.
fn investment_summary(per_category: &[(Category, Vec<String>)]) -> String {
    let parts: Vec<String> = per_category
        .iter()
        .filter(|(_, kws)| !kws.is_empty())
        .map(|(c, kws)| format!("{}: {}", c.label(), kws.join(", ")))
        .collect();
    if parts.is_empty() {
        NO_FACTORS_SUMMARY.to_string()
    } else {
        parts.join("; ")
    }
}
