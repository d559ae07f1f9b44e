//! The analysis result record shared by every provider.
//!
//! Downstream consumers (batch export, console/web display) read only this
//! shape plus listing metadata, so a model-backed provider can replace the
//! keyword engine without any branching downstream.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Summary text emitted when no category matched anything.
pub const NO_FACTORS_SUMMARY: &str = "No specific investment factors identified.";

/// Per-listing analysis output: three category scores in [0,10], a combined
/// total (one decimal place), the matched keywords behind each score, and the
/// derived highlight flag + human-readable summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub seller_motivation_score: f32,
    pub transaction_complexity_score: f32,
    pub property_characteristics_score: f32,
    pub total_score: f32,
    #[serde(default)]
    pub seller_motivation_matches: Vec<String>,
    #[serde(default)]
    pub transaction_complexity_matches: Vec<String>,
    #[serde(default)]
    pub property_characteristics_matches: Vec<String>,
    #[serde(default)]
    pub highlight: bool,
    #[serde(default)]
    pub summary: String,
}

impl Analysis {
    /// All-zero result with the canonical "nothing found" summary.
    pub fn empty() -> Self {
        Self::empty_with_summary(NO_FACTORS_SUMMARY)
    }

    /// All-zero result carrying an explanatory summary (provider failures
    /// degrade to this so a batch never halts on one listing).
    pub fn empty_with_summary(summary: impl Into<String>) -> Self {
        Self {
            seller_motivation_score: 0.0,
            transaction_complexity_score: 0.0,
            property_characteristics_score: 0.0,
            total_score: 0.0,
            seller_motivation_matches: Vec::new(),
            transaction_complexity_matches: Vec::new(),
            property_characteristics_matches: Vec::new(),
            highlight: false,
            summary: summary.into(),
        }
    }

    pub fn score_for(&self, category: Category) -> f32 {
        match category {
            Category::SellerMotivation => self.seller_motivation_score,
            Category::TransactionComplexity => self.transaction_complexity_score,
            Category::PropertyCharacteristics => self.property_characteristics_score,
        }
    }

    pub fn matches_for(&self, category: Category) -> &[String] {
        match category {
            Category::SellerMotivation => &self.seller_motivation_matches,
            Category::TransactionComplexity => &self.transaction_complexity_matches,
            Category::PropertyCharacteristics => &self.property_characteristics_matches,
        }
    }
}
