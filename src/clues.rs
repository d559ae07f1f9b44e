//! Heuristic clue layer: fixed regex rules for listing idioms that literal
//! keyword lists keep missing (price-reduction phrasing, urgency phrasing,
//! redevelopment phrasing, undervaluation phrasing).
//!
//! Each rule targets one category and appends one synthetic label at most
//! once per call, and only when the label is not already present. The rule
//! table is built in, not user-configurable.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::category::Category;

pub struct ClueRule {
    pub category: Category,
    pub label: &'static str,
    pattern: Regex,
}

impl ClueRule {
    fn new(category: Category, label: &'static str, pattern: &str) -> Self {
        Self {
            category,
            label,
            pattern: Regex::new(pattern).expect("clue rule regex"),
        }
    }

    pub fn triggers(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Byte range of the first triggering phrase, for context extraction.
    pub fn find_range(&self, text: &str) -> Option<(usize, usize)> {
        self.pattern.find(text).map(|m| (m.start(), m.end()))
    }
}

pub static CLUE_RULES: Lazy<Vec<ClueRule>> = Lazy::new(|| {
    vec![
        ClueRule::new(
            Category::SellerMotivation,
            "price reduced",
            r"(?i)price reduced|reduced price|price cut|discount|below market",
        ),
        ClueRule::new(
            Category::SellerMotivation,
            "urgency",
            r"(?i)won'?t last|selling (?:fast|quickly)|immediate|limited time|act (?:fast|quickly|now)",
        ),
        ClueRule::new(
            Category::PropertyCharacteristics,
            "redevelopment potential",
            r"(?i)potential (?:for|to) (?:develop|redevelop|build)|development opportunity|zoned for|build to suit|highest and best use",
        ),
        ClueRule::new(
            Category::PropertyCharacteristics,
            "below market",
            r"(?i)below market|undervalued|good deal|bargain|priced to sell|competitive price|great price|favorable (?:terms|pricing)",
        ),
    ]
});
