//! Assigns topical categories by comparing event text against fixed
//! category prototype documents.

use tracing::{info, warn};

use crate::config::{default_category_prototypes, CategoryPrototype};
use crate::domain::RawEventRecord;
use crate::pipeline::similarity::{similarity, VectorizerConfig};

/// Label used when no category clears the threshold.
pub const UNMATCHED_CATEGORY: &str = "Other";

/// Minimum cosine score for a prototype to win. Tuned empirically; see
/// DESIGN.md before changing.
pub const CATEGORY_SCORE_THRESHOLD: f64 = 0.02;

pub struct CategoryClassifier {
    prototypes: Vec<CategoryPrototype>,
}

impl CategoryClassifier {
    pub fn new(prototypes: Vec<CategoryPrototype>) -> Self {
        Self { prototypes }
    }

    pub fn with_default_categories() -> Self {
        Self::new(default_category_prototypes())
    }

    /// Classify `record` into at least one label. The best-scoring prototype
    /// wins if it clears the threshold; otherwise the `"Other"` sentinel is
    /// returned. Deterministic for a fixed prototype table.
    pub fn classify(&self, record: &RawEventRecord) -> Vec<String> {
        let blob = [
            record.title.as_deref(),
            record.event_description.as_deref(),
            record.host.as_deref(),
            record.location.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

        if blob.trim().is_empty() {
            warn!("empty event text, returning default category");
            return vec![UNMATCHED_CATEGORY.to_string()];
        }

        let corpus: Vec<String> = self
            .prototypes
            .iter()
            .map(|p| p.description.clone())
            .collect();
        let scores = similarity(&blob, &corpus, &VectorizerConfig::categorization());

        let best = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some((index, score)) = best {
            if *score > CATEGORY_SCORE_THRESHOLD {
                let label = &self.prototypes[index].label;
                info!(category = %label, score = *score, "assigned category");
                return vec![label.clone()];
            }
        }

        info!("no category met similarity threshold");
        vec![UNMATCHED_CATEGORY.to_string()]
    }
}
