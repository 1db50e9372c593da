//! Error types for the Toll Engine.
//!
//! Every fallible library operation returns [`Result`], whose error
//! side is the [`TollError`] enum.  The HTTP layer maps each variant
//! to a status code (see `api.rs`); the binary wraps them in
//! `anyhow` at startup.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the fee engine, its configuration and the vehicle
/// repository.
#[derive(Debug, Error)]
pub enum TollError {
    /// A single daily calculation was handed passages from more than
    /// one calendar day.
    #[error("passages span multiple days ({first} to {last})")]
    PassagesSpanMultipleDays { first: NaiveDate, last: NaiveDate },

    /// No vehicle is registered under the given registration number.
    #[error("vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error("vehicle already registered: {0}")]
    VehicleAlreadyExists(String),

    /// The rate table overlaps, is out of order or leaves the day.
    #[error("invalid rate table: {0}")]
    InvalidRateTable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TollError>;
