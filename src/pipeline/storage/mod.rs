use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::error::Result;
use crate::domain::NormalizedEvent;

pub mod in_memory;

pub use in_memory::InMemoryEventStore;

/// Storage trait for persisting canonical events.
///
/// The physical engine is external to this pipeline; anything that can
/// upsert by id and answer these queries can back it.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Write-through upsert keyed by `event.id`.
    async fn upsert_event(&self, event: &NormalizedEvent) -> Result<()>;

    async fn get_event(&self, id: &str) -> Result<Option<NormalizedEvent>>;

    async fn get_all_events(&self) -> Result<Vec<NormalizedEvent>>;

    /// Events whose start time exactly equals `start` (not windowed).
    async fn get_events_by_start_time(&self, start: DateTime<Utc>)
        -> Result<Vec<NormalizedEvent>>;

    /// Events matching the given start and end times exactly. An absent
    /// bound is unconstrained; with both absent this returns all events.
    async fn get_events_by_times(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<NormalizedEvent>>;

    /// Case-insensitive substring scan over titles.
    async fn search_titles(&self, query: &str) -> Result<Vec<NormalizedEvent>>;

    /// Events whose category list contains `label` as a whole word.
    async fn get_events_by_category(&self, label: &str) -> Result<Vec<NormalizedEvent>>;

    /// Retention sweep: remove events that started before `cutoff`.
    /// Returns the number of events deleted.
    async fn delete_events_starting_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}
