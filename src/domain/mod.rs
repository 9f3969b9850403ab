use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which ingestion lane a raw record arrived through.
///
/// The lane selects the deduplication policy and the synthetic id band, so
/// calendar-scraped and email-digest renditions of the same listing do not
/// overwrite each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    Calendar,
    Email,
}

impl EventSource {
    /// Base offset for synthetic event ids from this lane.
    pub fn id_band(&self) -> u64 {
        match self {
            EventSource::Calendar => 700_000_000,
            EventSource::Email => 600_000_000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventSource::Calendar => "calendar",
            EventSource::Email => "email",
        }
    }
}

/// An event record as decoded from a scraper's output, before any
/// normalization. Every field is optional; malformed or missing values are
/// common and must be tolerated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEventRecord {
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub pub_date: Option<String>,
    pub host: Option<String>,
    pub link: Option<String>,
    pub picture_link: Option<String>,
    pub event_description: Option<String>,
    /// Start time as an ISO datetime, date, or bare `HH:MM:SS` string.
    /// The email digest scraper spells this field `starttime`.
    #[serde(alias = "starttime")]
    pub start_time: Option<String>,
    #[serde(alias = "endtime")]
    pub end_time: Option<String>,
    pub location: Option<String>,
    /// Categories already attached by the source feed, if any.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// The canonical event shape written to the store.
///
/// Invariants: `id` is a pure function of `title` and the source lane;
/// `categories` is never empty; `start_time`/`end_time` are UTC when
/// present; `map_location` is always set even when coordinates are not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: String,
    pub title: String,
    pub author_name: String,
    pub pub_date: DateTime<Utc>,
    pub host: String,
    pub link: String,
    pub picture_link: String,
    pub event_description: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Source location text, preserved verbatim.
    pub location: String,
    /// Canonical venue name, or `"Other"` when unresolved.
    pub map_location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub categories: Vec<String>,
}
