//! Shared types for the stock ledger workspace.
//!
//! Domain models, output records, error types, parsing helpers, distribution
//! statistics, bucket models and CLI settings.

pub mod classify;
pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod reports;
pub mod settings;
pub mod stats;

pub use error::{LedgerError, Result};
