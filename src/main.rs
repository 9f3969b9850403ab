use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use campus_events_pipeline::domain::EventSource;
use campus_events_pipeline::observability::logging::init_logging;
use campus_events_pipeline::pipeline::storage::{EventStore, InMemoryEventStore};
use campus_events_pipeline::pipeline::{load_batch, EventPipeline};

#[derive(Parser)]
#[command(name = "campus-events-pipeline")]
#[command(about = "Normalize, deduplicate, and categorize scraped campus events")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one batch of raw event records from a JSON file
    Process {
        /// Ingestion lane the batch came from: calendar or email
        #[arg(long)]
        source: String,
        /// Path to the JSON array of raw records
        #[arg(long)]
        input: PathBuf,
    },
    /// Delete events whose start time is older than the retention window
    Prune {
        /// Retention window in hours
        #[arg(long, default_value_t = 2)]
        hours: i64,
    },
}

fn parse_source(source: &str) -> Result<EventSource> {
    match source {
        "calendar" => Ok(EventSource::Calendar),
        "email" => Ok(EventSource::Email),
        other => bail!("unknown source '{other}' (expected 'calendar' or 'email')"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    // The persistent store is wired in by the deployment; the in-memory
    // implementation backs standalone runs and development.
    let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());

    match cli.command {
        Commands::Process { source, input } => {
            let source = parse_source(&source)?;
            let records = load_batch(&input)?;
            info!(
                source = source.name(),
                records = records.len(),
                "processing batch"
            );
            let pipeline = EventPipeline::new(store, source);
            let summary = pipeline.process_batch(&records).await;
            info!(
                saved = summary.saved,
                duplicates = summary.duplicates,
                failed = summary.failed,
                "run finished"
            );
        }
        Commands::Prune { hours } => {
            warn!(
                "standalone runs use an ephemeral in-memory store; this sweep \
                 only covers events written by this process"
            );
            let cutoff = Utc::now() - Duration::hours(hours);
            let deleted = store.delete_events_starting_before(cutoff).await?;
            info!(deleted, hours, "pruned stale events");
        }
    }

    Ok(())
}
