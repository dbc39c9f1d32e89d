//! CSV rollup for archiving stock events.
//!
//! Moves events from the live JSONL audit log into the CSV archive
//! atomically, so the log stays small without losing history.

use crate::audit::{StockAction, StockEvent};
use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    resource_id: String,
    resource_name: String,
    actor: String,
    recorded_at: String,
    action: String,
    amount: String,
    ingested_after: String,
    used_after: String,
}

impl From<&StockEvent> for CsvRow {
    fn from(event: &StockEvent) -> Self {
        let action = match event.action {
            StockAction::Added => "added",
            StockAction::Consumed => "consumed",
        };
        CsvRow {
            id: event.id.to_string(),
            resource_id: event.resource_id.to_string(),
            resource_name: event.resource_name.clone(),
            actor: event.actor.clone(),
            recorded_at: event.recorded_at.to_rfc3339(),
            action: action.to_string(),
            amount: event.amount.to_string(),
            ingested_after: event.ingested_after.to_string(),
            used_after: event.used_after.to_string(),
        }
    }
}

/// Roll up audit events into CSV and archive the log atomically.
///
/// 1. Reads all events from the JSONL log
/// 2. Appends them to the CSV archive (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the log to .processed
/// 5. Returns the number of events processed
///
/// The CSV is fsynced before the log is renamed, and the log is renamed
/// rather than deleted so manual recovery stays possible.
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let events = crate::audit::read_events(wal_path)?;

    if events.is_empty() {
        tracing::info!("No events in audit log to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Write headers only when the file is new
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for event in &events {
        let row = CsvRow::from(event);
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} events to CSV", events.len());

    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived audit log to {:?}", processed_path);

    Ok(events.len())
}

/// Remove all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed audit log: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed audit logs", count);
    }

    Ok(count)
}
