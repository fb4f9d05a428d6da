//! Runtime layer for stock-ledger.
//!
//! Owns the current inventory engine and keeps it in step with the ledger
//! file on disk.

pub mod engine_handle;
pub mod watcher;

pub use engine_handle::EngineHandle;
pub use stock_core as core;
pub use stock_data as data;
