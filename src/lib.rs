//! Campus event normalization, deduplication, and categorization pipeline.
//!
//! Raw event records arrive from heterogeneous scrapers (calendar pages,
//! email digests) as loosely-shaped key/value data. This crate turns them
//! into a consistent set of non-duplicate, categorized, geolocated events
//! and upserts them into an [`pipeline::storage::EventStore`].

pub mod common;
pub mod config;
pub mod domain;
pub mod observability;
pub mod pipeline;
