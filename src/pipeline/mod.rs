//! The event processing pipeline.
//!
//! Control flow per record: duplicate check against the store, then field
//! normalization (datetimes, location, categories), then upsert. One bad
//! record never aborts the batch; it is logged and counted.

pub mod catalog;
pub mod classify;
pub mod datetime;
pub mod dedup;
pub mod location;
pub mod similarity;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{error, info};

use crate::common::error::Result;
use crate::domain::{EventSource, NormalizedEvent, RawEventRecord};
use crate::pipeline::catalog::{derive_event_id, RecordUpserter, DEFAULT_EVENT_LINK};
use crate::pipeline::classify::CategoryClassifier;
use crate::pipeline::datetime::normalize_datetime;
use crate::pipeline::dedup::{DeduplicationPolicy, EditDistancePolicy, TfidfTitlePolicy};
use crate::pipeline::location::LocationResolver;
use crate::pipeline::storage::EventStore;

/// Per-batch outcome counts, for operational logging.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub saved: usize,
    pub duplicates: usize,
    pub failed: usize,
}

enum RecordOutcome {
    Saved,
    Duplicate,
}

/// Batch processor for one ingestion lane.
pub struct EventPipeline {
    store: Arc<dyn EventStore>,
    resolver: LocationResolver,
    classifier: CategoryClassifier,
    policy: Box<dyn DeduplicationPolicy>,
    upserter: RecordUpserter,
    source: EventSource,
}

impl EventPipeline {
    /// Pipeline with the default venue/category tables and the dedup policy
    /// that matches the source lane.
    pub fn new(store: Arc<dyn EventStore>, source: EventSource) -> Self {
        let policy: Box<dyn DeduplicationPolicy> = match source {
            EventSource::Calendar => Box::new(TfidfTitlePolicy),
            EventSource::Email => Box::new(EditDistancePolicy),
        };
        Self::with_components(
            store,
            source,
            LocationResolver::with_default_table(),
            CategoryClassifier::with_default_categories(),
            policy,
        )
    }

    /// Pipeline with injected components, for tests and callers with
    /// non-default tables.
    pub fn with_components(
        store: Arc<dyn EventStore>,
        source: EventSource,
        resolver: LocationResolver,
        classifier: CategoryClassifier,
        policy: Box<dyn DeduplicationPolicy>,
    ) -> Self {
        let upserter = RecordUpserter::new(store.clone());
        Self {
            store,
            resolver,
            classifier,
            policy,
            upserter,
            source,
        }
    }

    /// Process a finite batch of raw records sequentially. Failures abort
    /// only the record that caused them.
    pub async fn process_batch(&self, records: &[RawEventRecord]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for record in records {
            let title = record.title.as_deref().unwrap_or("Unknown");
            match self.process_record(record).await {
                Ok(RecordOutcome::Saved) => summary.saved += 1,
                Ok(RecordOutcome::Duplicate) => {
                    info!(title, "skipping similar event");
                    summary.duplicates += 1;
                }
                Err(e) => {
                    error!(title, error = %e, "error processing event");
                    summary.failed += 1;
                }
            }
        }
        info!(
            source = self.source.name(),
            policy = self.policy.name(),
            saved = summary.saved,
            duplicates = summary.duplicates,
            failed = summary.failed,
            "batch complete"
        );
        summary
    }

    async fn process_record(&self, record: &RawEventRecord) -> Result<RecordOutcome> {
        if self
            .policy
            .is_duplicate(record, self.store.as_ref())
            .await?
        {
            return Ok(RecordOutcome::Duplicate);
        }
        let event = self.build_event(record, &mut rand::thread_rng())?;
        self.upserter.upsert(event).await?;
        Ok(RecordOutcome::Saved)
    }

    /// Normalize one raw record into the canonical event shape. Only a
    /// missing title is fatal; every other bad field degrades to a default.
    fn build_event<R: Rng>(
        &self,
        record: &RawEventRecord,
        rng: &mut R,
    ) -> Result<NormalizedEvent> {
        let title = record
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                crate::common::error::PipelineError::Validation(
                    "event must have a non-empty title".to_string(),
                )
            })?;

        let location = record.location.clone().unwrap_or_default();
        let resolved = self.resolver.resolve(&location);
        let (latitude, longitude) = match (resolved.latitude, resolved.longitude) {
            (Some(lat), Some(lng)) => {
                let (lat, lng) = self.resolver.jitter(lat, lng, rng);
                (Some(lat), Some(lng))
            }
            _ => (None, None),
        };

        let reference = record.pub_date.as_deref();
        let pub_date = reference
            .and_then(|s| normalize_datetime(s, None))
            .unwrap_or_else(Utc::now);
        let start_time = record
            .start_time
            .as_deref()
            .and_then(|s| normalize_datetime(s, reference));
        let end_time = record
            .end_time
            .as_deref()
            .and_then(|s| normalize_datetime(s, reference));

        // Source-supplied categories, unioned with the classifier's pick.
        let mut categories: Vec<String> = Vec::new();
        for label in record.categories.iter().cloned() {
            if !categories.contains(&label) {
                categories.push(label);
            }
        }
        for label in self.classifier.classify(record) {
            if !categories.contains(&label) {
                categories.push(label);
            }
        }

        Ok(NormalizedEvent {
            id: derive_event_id(title, self.source),
            title: title.to_string(),
            author_name: record.author_name.clone().unwrap_or_default(),
            pub_date,
            host: record.host.clone().unwrap_or_default(),
            link: record
                .link
                .clone()
                .unwrap_or_else(|| DEFAULT_EVENT_LINK.to_string()),
            picture_link: record.picture_link.clone().unwrap_or_default(),
            event_description: record.event_description.clone().unwrap_or_default(),
            start_time,
            end_time,
            location,
            map_location: resolved.name,
            latitude,
            longitude,
            categories,
        })
    }
}

/// Load a batch of raw records from a JSON array file, as produced by the
/// scrapers upstream of this pipeline.
pub fn load_batch(path: &Path) -> Result<Vec<RawEventRecord>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
