//! Decides whether an incoming raw record duplicates an already-stored
//! event.
//!
//! Two strategies coexist because the two ingestion lanes were tuned
//! separately: calendar records use TF-IDF bigram title similarity after an
//! exact start-time match, email records use plain edit distance after
//! matching both start and end times. They are selected per source, never
//! merged.

use async_trait::async_trait;
use std::cmp::Ordering;
use tracing::{info, warn};

use crate::common::error::Result;
use crate::domain::RawEventRecord;
use crate::pipeline::datetime::normalize_datetime;
use crate::pipeline::similarity::{preprocess, similarity, VectorizerConfig};
use crate::pipeline::storage::EventStore;

/// Minimum TF-IDF cosine score for a calendar title to count as a duplicate.
/// Tuned empirically; see DESIGN.md before changing.
pub const TFIDF_TITLE_THRESHOLD: f64 = 0.57;

/// Minimum normalized edit-distance ratio for an email title match.
pub const EDIT_DISTANCE_THRESHOLD: f64 = 0.8;

/// A named duplicate-detection strategy, selected explicitly per source.
#[async_trait]
pub trait DeduplicationPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// True if `candidate` duplicates an event already in `store`. Errors
    /// from the store propagate; unparseable candidate fields conservatively
    /// yield false (prefer keeping a record over silently dropping it).
    async fn is_duplicate(
        &self,
        candidate: &RawEventRecord,
        store: &dyn EventStore,
    ) -> Result<bool>;
}

/// Calendar lane: exact start-time match, then TF-IDF title similarity over
/// unigrams and bigrams.
pub struct TfidfTitlePolicy;

#[async_trait]
impl DeduplicationPolicy for TfidfTitlePolicy {
    fn name(&self) -> &'static str {
        "tfidf_title"
    }

    async fn is_duplicate(
        &self,
        candidate: &RawEventRecord,
        store: &dyn EventStore,
    ) -> Result<bool> {
        let Some(title) = candidate
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            warn!("duplicate check skipped: record has no title");
            return Ok(false);
        };

        let reference = candidate.pub_date.as_deref();
        let Some(start_time) = candidate
            .start_time
            .as_deref()
            .and_then(|s| normalize_datetime(s, reference))
        else {
            warn!(title, "duplicate check skipped: no parseable start time");
            return Ok(false);
        };

        let existing = store.get_events_by_start_time(start_time).await?;
        if existing.is_empty() {
            return Ok(false);
        }

        let query = preprocess(title);
        let corpus: Vec<String> = existing.iter().map(|e| preprocess(&e.title)).collect();
        let scores = similarity(&query, &corpus, &VectorizerConfig::title_dedup());

        let best = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal));
        if let Some((index, score)) = best {
            if *score > TFIDF_TITLE_THRESHOLD {
                info!(
                    candidate = title,
                    matched = %existing[index].title,
                    score = *score,
                    "similar event found"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Email lane: exact match on start and end time (when present), then plain
/// edit-distance title similarity.
pub struct EditDistancePolicy;

#[async_trait]
impl DeduplicationPolicy for EditDistancePolicy {
    fn name(&self) -> &'static str {
        "edit_distance"
    }

    async fn is_duplicate(
        &self,
        candidate: &RawEventRecord,
        store: &dyn EventStore,
    ) -> Result<bool> {
        let reference = candidate.pub_date.as_deref();
        let start_time = candidate
            .start_time
            .as_deref()
            .and_then(|s| normalize_datetime(s, reference));
        let end_time = candidate
            .end_time
            .as_deref()
            .and_then(|s| normalize_datetime(s, reference));

        let candidate_title = candidate
            .title
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let matches = store.get_events_by_times(start_time, end_time).await?;
        for event in matches {
            let ratio =
                strsim::normalized_levenshtein(&candidate_title, &event.title.to_lowercase());
            if ratio > EDIT_DISTANCE_THRESHOLD {
                info!(
                    candidate = %candidate_title,
                    matched = %event.title,
                    score = ratio,
                    "similar event found"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }
}
