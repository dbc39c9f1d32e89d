#![forbid(unsafe_code)]

//! Core domain model and business logic for the Finca inventory system.
//!
//! This crate provides:
//! - Domain types (consumable resources, livestock, workers, obligations)
//! - Stock ledger (ingested/used/remaining bookkeeping)
//! - Livestock lifecycle state machine and treatment history
//! - Reminder window selection
//! - Persistence (JSON store, JSONL audit log, CSV archive)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod audit;
pub mod ledger;
pub mod lifecycle;
pub mod reminders;
pub mod history;
pub mod csv_rollup;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::InventoryStore;
pub use audit::{HistorySink, JsonlSink, StockAction, StockEvent};
pub use ledger::{add_stock, consume, remaining, AddReceipt, ConsumeReceipt};
pub use lifecycle::{
    age, record_medication, record_vaccination, register_animal, transition, TransitionPayload,
};
pub use reminders::{build_reminder_report, ReminderReport};
pub use history::load_recent_events;
