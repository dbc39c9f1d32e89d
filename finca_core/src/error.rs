//! Error types for the finca_core library.

use crate::types::AnimalStatus;
use rust_decimal::Decimal;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for finca_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inventory store error
    #[error("Store error: {0}")]
    Store(String),

    /// Non-positive or malformed amount
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Consume exceeds remaining stock
    #[error("insufficient stock: requested {requested}, remaining {remaining}")]
    InsufficientStock {
        requested: Decimal,
        remaining: Decimal,
    },

    /// Unknown resource, animal or record id
    #[error("not found: {0}")]
    NotFound(String),

    /// Registration collides with an existing unique identifier
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Incomplete conditional payload on a status transition
    #[error("missing required field '{0}'")]
    MissingRequiredField(&'static str),

    /// Reserved for a future re-entry rule; currently every status is
    /// reachable from every other.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: AnimalStatus,
        to: AnimalStatus,
    },
}
