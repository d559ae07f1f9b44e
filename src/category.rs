//! The three fixed investment-signal categories.
//!
//! Keyword configuration maps arbitrary string keys to keyword lists; only
//! these three are known to the scorer's weight table. Unknown keys are
//! tolerated by the matcher and simply carry no weight.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SellerMotivation,
    TransactionComplexity,
    PropertyCharacteristics,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::SellerMotivation,
        Category::TransactionComplexity,
        Category::PropertyCharacteristics,
    ];

    /// Config/map key, e.g. `"seller_motivation"`.
    pub fn key(self) -> &'static str {
        match self {
            Category::SellerMotivation => "seller_motivation",
            Category::TransactionComplexity => "transaction_complexity",
            Category::PropertyCharacteristics => "property_characteristics",
        }
    }

    /// Short label used in the investment summary.
    pub fn label(self) -> &'static str {
        match self {
            Category::SellerMotivation => "Seller",
            Category::TransactionComplexity => "Transaction",
            Category::PropertyCharacteristics => "Property",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }
}
