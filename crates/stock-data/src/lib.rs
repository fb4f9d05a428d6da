//! Data layer for stock-ledger.
//!
//! Discovers and reads ledger exports, aggregates them into inventory
//! positions and answers the inventory queries over the result.

pub mod aggregator;
pub mod analysis;
pub mod analyzer;
pub mod bottlenecks;
pub mod reader;
pub mod recommendations;

pub use analysis::{load_engine, BuildMetadata, LoadedEngine};
pub use analyzer::InventoryEngine;
pub use stock_core as core;
