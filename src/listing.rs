// src/listing.rs
//! Listing records as received from upstream acquisition, plus the text
//! extraction the analyzer runs on. The engine itself never touches listing
//! metadata; it only sees the concatenated descriptive text.

use serde::{Deserialize, Serialize};

use crate::report::Analysis;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "propertyType")]
    pub property_type: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "brokerDescription")]
    pub broker_description: Option<String>,
    #[serde(default)]
    pub highlighted_features: Vec<String>,
}

impl Listing {
    /// Concatenate the descriptive fields into one analysis text, decoding
    /// HTML entities left over from scraping. May be empty.
    pub fn analysis_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.description.is_empty() {
            parts.push(&self.description);
        }
        if let Some(broker) = self.broker_description.as_deref() {
            if !broker.is_empty() {
                parts.push(broker);
            }
        }
        if !self.title.is_empty() {
            parts.push(&self.title);
        }
        for feature in &self.highlighted_features {
            if !feature.is_empty() {
                parts.push(feature);
            }
        }
        let joined = parts.join(" ");
        html_escape::decode_html_entities(&joined).trim().to_string()
    }
}

/// A listing plus its analysis, the record downstream consumers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub analysis: Analysis,
}
