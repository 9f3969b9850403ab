//! Resolves free-text location strings to canonical campus venues.
//!
//! Matching is a case-insensitive whole-word search over a fixed keyword
//! table, tried in table order so specific keywords win over generic ones.

use rand::Rng;
use regex::Regex;
use tracing::warn;

use crate::config::{default_location_buckets, LocationBucket};

/// Canonical name used when no venue keyword matches.
pub const UNMATCHED_LOCATION: &str = "Other";

/// Maximum offset, in degrees per axis, applied to de-overlap map markers.
pub const JITTER_RANGE_DEGREES: f64 = 0.00015;

/// Result of resolving a location string. Coordinates are the table's fixed
/// point for the venue; jitter is a separate, explicitly randomized step.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ResolvedLocation {
    fn unmatched() -> Self {
        Self {
            name: UNMATCHED_LOCATION.to_string(),
            latitude: None,
            longitude: None,
        }
    }
}

pub struct LocationResolver {
    entries: Vec<(Regex, LocationBucket)>,
}

impl LocationResolver {
    /// Build a resolver over `buckets`, compiling one whole-word pattern per
    /// keyword. Table order is preserved and significant.
    pub fn new(buckets: Vec<LocationBucket>) -> Self {
        let entries = buckets
            .into_iter()
            .map(|bucket| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(&bucket.keyword));
                // Escaped literal keywords always compile.
                (Regex::new(&pattern).expect("keyword pattern"), bucket)
            })
            .collect();
        Self { entries }
    }

    pub fn with_default_table() -> Self {
        Self::new(default_location_buckets())
    }

    /// Map `location` to a canonical venue. First keyword match wins; no
    /// match yields the `"Other"` sentinel with null coordinates.
    pub fn resolve(&self, location: &str) -> ResolvedLocation {
        for (pattern, bucket) in &self.entries {
            if pattern.is_match(location) {
                return ResolvedLocation {
                    name: bucket.name.clone(),
                    latitude: Some(bucket.latitude),
                    longitude: Some(bucket.longitude),
                };
            }
        }
        if !location.trim().is_empty() {
            warn!(location, "no venue keyword matched");
        }
        ResolvedLocation::unmatched()
    }

    /// Apply a small uniform random offset to each axis independently so
    /// markers at the same venue do not stack on the map. Deliberately not
    /// deterministic across calls; tests inject a seeded generator.
    pub fn jitter<R: Rng>(&self, latitude: f64, longitude: f64, rng: &mut R) -> (f64, f64) {
        (
            latitude + rng.gen_range(-JITTER_RANGE_DEGREES..=JITTER_RANGE_DEGREES),
            longitude + rng.gen_range(-JITTER_RANGE_DEGREES..=JITTER_RANGE_DEGREES),
        )
    }
}
