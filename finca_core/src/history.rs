//! Recent stock-event history.
//!
//! Merges the live JSONL audit log with the CSV archive to answer "what
//! happened to the stock in the last N days", deduplicating events that
//! appear in both.

use crate::audit::{StockAction, StockEvent};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// CSV row format for reading archived events
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    resource_id: String,
    resource_name: String,
    actor: String,
    recorded_at: String,
    action: String,
    amount: Decimal,
    ingested_after: Decimal,
    used_after: Decimal,
}

impl TryFrom<CsvRow> for StockEvent {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Store(format!("invalid event UUID: {}", e)))?;
        let resource_id = Uuid::parse_str(&row.resource_id)
            .map_err(|e| crate::Error::Store(format!("invalid resource UUID: {}", e)))?;

        let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)
            .map_err(|e| crate::Error::Store(format!("invalid date: {}", e)))?
            .with_timezone(&Utc);

        let action = match row.action.as_str() {
            "added" => StockAction::Added,
            "consumed" => StockAction::Consumed,
            other => {
                return Err(crate::Error::Store(format!("invalid action '{}'", other)));
            }
        };

        Ok(StockEvent {
            id,
            resource_id,
            resource_name: row.resource_name,
            actor: row.actor,
            recorded_at,
            action,
            amount: row.amount,
            ingested_after: row.ingested_after,
            used_after: row.used_after,
        })
    }
}

/// Load events from the last N days from both the JSONL log and the CSV
/// archive.
///
/// Returns events sorted by recorded_at (newest first), deduplicated by
/// event id across the two sources.
pub fn load_recent_events(wal_path: &Path, csv_path: &Path, days: i64) -> Result<Vec<StockEvent>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut events = Vec::new();
    let mut seen_ids = HashSet::new();

    // Live log first (most recent)
    if wal_path.exists() {
        let live = crate::audit::read_events(wal_path)?;
        for event in live {
            if event.recorded_at >= cutoff {
                seen_ids.insert(event.id);
                events.push(event);
            }
        }
        tracing::debug!("Loaded {} events from audit log", events.len());
    }

    // Archived events
    if csv_path.exists() {
        let archived = load_events_from_csv(csv_path)?;
        let mut csv_count = 0;
        for event in archived {
            if event.recorded_at >= cutoff && !seen_ids.contains(&event.id) {
                seen_ids.insert(event.id);
                events.push(event);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} events from CSV archive", csv_count);
    }

    events.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

    tracing::info!(
        "Loaded {} stock events from last {} days",
        events.len(),
        days
    );
    Ok(events)
}

fn load_events_from_csv(path: &Path) -> Result<Vec<StockEvent>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut events = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match StockEvent::try_from(row) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                    // Continue processing other rows
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(events)
}
