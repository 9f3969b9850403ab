use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::EventStore;
use crate::common::error::{PipelineError, Result};
use crate::domain::NormalizedEvent;

/// In-memory store implementation for development/testing.
pub struct InMemoryEventStore {
    events: Arc<Mutex<HashMap<String, NormalizedEvent>>>,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn sorted(mut events: Vec<NormalizedEvent>) -> Vec<NormalizedEvent> {
        events.sort_by(|a, b| a.id.cmp(&b.id));
        events
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn upsert_event(&self, event: &NormalizedEvent) -> Result<()> {
        let mut events = self.events.lock().unwrap();
        let replaced = events.insert(event.id.clone(), event.clone()).is_some();
        debug!(
            id = %event.id,
            title = %event.title,
            replaced,
            "upserted event"
        );
        Ok(())
    }

    async fn get_event(&self, id: &str) -> Result<Option<NormalizedEvent>> {
        let events = self.events.lock().unwrap();
        Ok(events.get(id).cloned())
    }

    async fn get_all_events(&self) -> Result<Vec<NormalizedEvent>> {
        let events = self.events.lock().unwrap();
        Ok(Self::sorted(events.values().cloned().collect()))
    }

    async fn get_events_by_start_time(
        &self,
        start: DateTime<Utc>,
    ) -> Result<Vec<NormalizedEvent>> {
        let events = self.events.lock().unwrap();
        Ok(Self::sorted(
            events
                .values()
                .filter(|e| e.start_time == Some(start))
                .cloned()
                .collect(),
        ))
    }

    async fn get_events_by_times(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<NormalizedEvent>> {
        let events = self.events.lock().unwrap();
        Ok(Self::sorted(
            events
                .values()
                .filter(|e| start.is_none() || e.start_time == start)
                .filter(|e| end.is_none() || e.end_time == end)
                .cloned()
                .collect(),
        ))
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<NormalizedEvent>> {
        let query_lower = query.to_lowercase();
        let events = self.events.lock().unwrap();
        Ok(Self::sorted(
            events
                .values()
                .filter(|e| e.title.to_lowercase().contains(&query_lower))
                .cloned()
                .collect(),
        ))
    }

    async fn get_events_by_category(&self, label: &str) -> Result<Vec<NormalizedEvent>> {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(label));
        let matcher = Regex::new(&pattern).map_err(|e| PipelineError::Store {
            message: format!("bad category pattern: {e}"),
        })?;
        let events = self.events.lock().unwrap();
        Ok(Self::sorted(
            events
                .values()
                .filter(|e| {
                    let serialized =
                        serde_json::to_string(&e.categories).unwrap_or_default();
                    matcher.is_match(&serialized)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn delete_events_starting_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut events = self.events.lock().unwrap();
        let stale: Vec<String> = events
            .values()
            .filter(|e| matches!(e.start_time, Some(start) if start < cutoff))
            .map(|e| e.id.clone())
            .collect();
        for id in &stale {
            if let Some(event) = events.remove(id) {
                info!(
                    id = %event.id,
                    title = %event.title,
                    start_time = ?event.start_time,
                    "deleted stale event"
                );
            }
        }
        Ok(stale.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, title: &str, start_hour: Option<u32>) -> NormalizedEvent {
        NormalizedEvent {
            id: id.to_string(),
            title: title.to_string(),
            author_name: String::new(),
            pub_date: Utc.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap(),
            host: String::new(),
            link: String::new(),
            picture_link: String::new(),
            event_description: String::new(),
            start_time: start_hour
                .map(|h| Utc.with_ymd_and_hms(2024, 11, 10, h, 0, 0).unwrap()),
            end_time: None,
            location: String::new(),
            map_location: "Other".to_string(),
            latitude: None,
            longitude: None,
            categories: vec!["Other".to_string()],
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = InMemoryEventStore::new();
        store.upsert_event(&event("1", "First", Some(18))).await.unwrap();
        store.upsert_event(&event("1", "Second", Some(18))).await.unwrap();

        let all = store.get_all_events().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Second");
    }

    #[tokio::test]
    async fn test_start_time_filter_is_exact() {
        let store = InMemoryEventStore::new();
        store.upsert_event(&event("1", "Early", Some(18))).await.unwrap();
        store.upsert_event(&event("2", "Late", Some(20))).await.unwrap();
        store.upsert_event(&event("3", "Untimed", None)).await.unwrap();

        let at_18 = Utc.with_ymd_and_hms(2024, 11, 10, 18, 0, 0).unwrap();
        let found = store.get_events_by_start_time(at_18).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Early");
    }

    #[tokio::test]
    async fn test_times_filter_ignores_absent_bounds() {
        let store = InMemoryEventStore::new();
        store.upsert_event(&event("1", "A", Some(18))).await.unwrap();
        store.upsert_event(&event("2", "B", Some(20))).await.unwrap();

        // Neither bound given: everything matches.
        let all = store.get_events_by_times(None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let at_20 = Utc.with_ymd_and_hms(2024, 11, 10, 20, 0, 0).unwrap();
        let found = store.get_events_by_times(Some(at_20), None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "B");
    }

    #[tokio::test]
    async fn test_title_search_is_case_insensitive_substring() {
        let store = InMemoryEventStore::new();
        store
            .upsert_event(&event("1", "Guest Lecture: AI & Future", Some(18)))
            .await
            .unwrap();

        let found = store.search_titles("lecture").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(store.search_titles("karaoke").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_category_filter_matches_whole_words() {
        let store = InMemoryEventStore::new();
        let mut crafts = event("1", "Pottery", Some(18));
        crafts.categories = vec!["Arts and Craft".to_string()];
        store.upsert_event(&crafts).await.unwrap();

        // "Arts" appears as a whole word inside "Arts and Craft"; a prefix
        // like "Art" does not.
        assert_eq!(store.get_events_by_category("Arts").await.unwrap().len(), 1);
        assert!(store.get_events_by_category("Art").await.unwrap().is_empty());
        assert_eq!(
            store
                .get_events_by_category("arts and craft")
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_retention_sweep_removes_only_stale_timed_events() {
        let store = InMemoryEventStore::new();
        store.upsert_event(&event("1", "Old", Some(10))).await.unwrap();
        store.upsert_event(&event("2", "Recent", Some(20))).await.unwrap();
        store.upsert_event(&event("3", "Untimed", None)).await.unwrap();

        let cutoff = Utc.with_ymd_and_hms(2024, 11, 10, 15, 0, 0).unwrap();
        let deleted = store.delete_events_starting_before(cutoff).await.unwrap();
        assert_eq!(deleted, 1);

        let remaining = store.get_all_events().await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|e| e.title != "Old"));
    }
}
