// src/pipeline.rs
//! Batch orchestration: filter, analyze each listing through the configured
//! provider, then rank by total score descending.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::filtering::{filter_by_property_types, filter_by_states};
use crate::listing::{AnalyzedListing, Listing};
use crate::provider::DynProvider;

/// Optional pre-analysis filters for a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchFilters {
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub property_types: Vec<String>,
}

/// Run a batch end to end. Listings that fail analysis still come back with
/// an all-zero result; the batch itself never fails on a single listing.
pub async fn run_batch(
    provider: &DynProvider,
    listings: Vec<Listing>,
    filters: &BatchFilters,
) -> Vec<AnalyzedListing> {
    let received = listings.len();
    let listings = filter_by_states(listings, &filters.states);
    let listings = filter_by_property_types(listings, &filters.property_types);

    let mut analyzed = Vec::with_capacity(listings.len());
    for listing in listings {
        let analysis = provider.analyze(&listing).await;
        analyzed.push(AnalyzedListing { listing, analysis });
    }

    // Highest-scoring deals first. Scores are finite by construction.
    analyzed.sort_by(|a, b| {
        b.analysis
            .total_score
            .partial_cmp(&a.analysis.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    info!(
        received,
        analyzed = analyzed.len(),
        provider = provider.provider_name(),
        "batch complete"
    );
    analyzed
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::EngineHandle;
    use crate::provider::KeywordAnalyzer;

    fn listing(id: &str, state: &str, description: &str) -> Listing {
        Listing {
            id: id.into(),
            state: Some(state.into()),
            description: description.into(),
            ..Listing::default()
        }
    }

    #[tokio::test]
    async fn batch_filters_then_ranks_by_total_score() {
        let provider: DynProvider =
            Arc::new(KeywordAnalyzer::new(EngineHandle::with_defaults()));
        let listings = vec![
            listing("mild", "WI", "Vacant space available."),
            listing("hot", "WI", "Motivated seller, foreclosure auction, vacant."),
            listing("dropped", "TX", "Motivated seller."),
        ];
        let filters = BatchFilters {
            states: vec!["WI".into()],
            ..BatchFilters::default()
        };
        let out = run_batch(&provider, listings, &filters).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].listing.id, "hot");
        assert_eq!(out[1].listing.id, "mild");
        assert!(out[0].analysis.total_score > out[1].analysis.total_score);
    }

    #[tokio::test]
    async fn empty_batch_is_fine() {
        let provider: DynProvider =
            Arc::new(KeywordAnalyzer::new(EngineHandle::with_defaults()));
        let out = run_batch(&provider, Vec::new(), &BatchFilters::default()).await;
        assert!(out.is_empty());
    }
}
