//! Append-only audit log for stock mutations.
//!
//! Every successful `add_stock` / `consume` is recorded as a [`StockEvent`]
//! in a JSONL file with file locking, so the history subsystem can report
//! who changed which resource and by how much.

use crate::Result;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What a ledger mutation did to the resource
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockAction {
    Added,
    Consumed,
}

/// One auditable ledger mutation: actor, timestamp, delta and the totals
/// the resource was left with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockEvent {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub resource_name: String,
    pub actor: String,
    pub recorded_at: DateTime<Utc>,
    pub action: StockAction,
    pub amount: Decimal,
    pub ingested_after: Decimal,
    pub used_after: Decimal,
}

/// Sink trait for persisting audit events
pub trait HistorySink {
    fn append(&mut self, event: &StockEvent) -> Result<()>;
}

/// JSONL-based audit sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl HistorySink for JsonlSink {
    fn append(&mut self, event: &StockEvent) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Exclusive lock while appending
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(event)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended stock event {} to audit log", event.id);
        Ok(())
    }
}

/// Read all events from an audit log file
pub fn read_events(path: &Path) -> Result<Vec<StockEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut events = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<StockEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!("Failed to parse event at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} events from audit log", events.len());
    Ok(events)
}
