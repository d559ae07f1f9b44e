// src/filtering.rs
//! Geographic and property-type filters applied before analysis.
//!
//! State matching prefers the explicit `state` field; when it is absent the
//! filter falls back to extracting a two-letter abbreviation from the address
//! (second-to-last whitespace token, which in US addresses sits before the
//! zip code). Matching is case-insensitive in both directions.

use tracing::info;

use crate::listing::Listing;

/// Keep only listings located in one of `target_states` (two-letter
/// abbreviations, any case). An empty target list disables the filter.
pub fn filter_by_states(listings: Vec<Listing>, target_states: &[String]) -> Vec<Listing> {
    if target_states.is_empty() {
        return listings;
    }
    let targets: Vec<String> = target_states.iter().map(|s| s.to_uppercase()).collect();
    let before = listings.len();
    let kept: Vec<Listing> = listings
        .into_iter()
        .filter(|l| {
            listing_state(l)
                .map(|s| targets.contains(&s))
                .unwrap_or(false)
        })
        .collect();
    info!(before, after = kept.len(), states = ?targets, "filtered by state");
    kept
}

/// Keep only listings whose property type is in `property_types` (any case).
/// Listings without a property type pass through untouched, as upstream data
/// frequently omits the field. An empty target list disables the filter.
pub fn filter_by_property_types(listings: Vec<Listing>, property_types: &[String]) -> Vec<Listing> {
    if property_types.is_empty() {
        return listings;
    }
    let targets: Vec<String> = property_types.iter().map(|t| t.to_lowercase()).collect();
    let before = listings.len();
    let kept: Vec<Listing> = listings
        .into_iter()
        .filter(|l| {
            l.property_type.is_empty() || targets.contains(&l.property_type.to_lowercase())
        })
        .collect();
    info!(before, after = kept.len(), types = ?targets, "filtered by property type");
    kept
}

/// Upper-cased state for a listing: the `state` field when present, otherwise
/// extracted from the address tail.
fn listing_state(listing: &Listing) -> Option<String> {
    if let Some(state) = listing.state.as_deref() {
        if !state.is_empty() {
            return Some(state.to_uppercase());
        }
    }
    extract_state_from_address(&listing.address)
}

fn extract_state_from_address(address: &str) -> Option<String> {
    let parts: Vec<&str> = address.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let candidate = parts[parts.len() - 2].trim_end_matches(',').to_uppercase();
    if candidate.len() == 2 && candidate.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(candidate)
    } else {
        None
    }
}
