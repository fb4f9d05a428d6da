//! Load-and-build pipeline.
//!
//! Reads a ledger file and builds the [`InventoryEngine`] over it, returning
//! timing and size metadata alongside the engine.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use stock_core::Result;
use tracing::info;

use crate::analyzer::InventoryEngine;
use crate::reader::load_ledger;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside a freshly built engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildMetadata {
    /// ISO-8601 timestamp when the build finished.
    pub generated_at: String,
    /// Ledger file the engine was built from.
    pub source: String,
    /// Number of ledger rows read.
    pub transactions_loaded: usize,
    /// Number of inventory positions produced.
    pub positions_built: usize,
    /// Wall-clock seconds spent reading and parsing the ledger.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent aggregating positions.
    pub build_time_seconds: f64,
}

/// The output of [`load_engine`].
#[derive(Debug, Clone)]
pub struct LoadedEngine {
    pub engine: InventoryEngine,
    pub metadata: BuildMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Read the ledger at `path` and build an engine over it.
pub fn load_engine(path: &Path) -> Result<LoadedEngine> {
    let load_start = Instant::now();
    let transactions = load_ledger(path)?;
    let load_time = load_start.elapsed().as_secs_f64();
    let transactions_loaded = transactions.len();

    let build_start = Instant::now();
    let engine = InventoryEngine::build(transactions)?;
    let build_time = build_start.elapsed().as_secs_f64();

    let metadata = BuildMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source: path.display().to_string(),
        transactions_loaded,
        positions_built: engine.positions().len(),
        load_time_seconds: load_time,
        build_time_seconds: build_time,
    };

    info!(
        source = %metadata.source,
        transactions = metadata.transactions_loaded,
        positions = metadata.positions_built,
        "Inventory engine built in {:.3}s",
        load_time + build_time
    );

    Ok(LoadedEngine { engine, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use stock_core::LedgerError;
    use tempfile::TempDir;

    const HEADER: &str = "Plant,Storage Location,Material,Material Description,Quantity,Amt.in Loc.Cur.,Unit of Entry,Movement Type,Document Date,Posting Date,Text";

    fn write_ledger(dir: &TempDir, rows: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("ledger.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for r in rows {
            writeln!(file, "{r}").unwrap();
        }
        path
    }

    #[test]
    fn test_load_engine_metadata() {
        let dir = TempDir::new().unwrap();
        let path = write_ledger(
            &dir,
            &[
                "A,1,M,Widget,50,500,EA,101,2025-07-01,2025-07-01,",
                "A,1,M,Widget,-70,-700,EA,261,2025-07-02,2025-07-02,",
                "B,1,M,Widget,10,100,EA,101,2025-07-03,2025-07-03,",
            ],
        );
        let loaded = load_engine(&path).unwrap();
        assert_eq!(loaded.metadata.transactions_loaded, 3);
        assert_eq!(loaded.metadata.positions_built, 2);
        assert!(loaded.metadata.load_time_seconds >= 0.0);
        assert!(loaded.metadata.source.ends_with("ledger.csv"));

        let shortages = loaded.engine.shortage_items(None);
        assert_eq!(shortages.len(), 1);
        assert_eq!(shortages[0].position.current_quantity, -20.0);
        assert_eq!(shortages[0].position.total_value, -200.0);
    }

    #[test]
    fn test_load_engine_header_only() {
        let dir = TempDir::new().unwrap();
        let path = write_ledger(&dir, &[]);
        let loaded = load_engine(&path).unwrap();
        assert!(loaded.engine.positions().is_empty());
        assert_eq!(loaded.metadata.positions_built, 0);
    }

    #[test]
    fn test_metadata_serialises() {
        let dir = TempDir::new().unwrap();
        let path = write_ledger(&dir, &["A,1,M,Widget,5,5,EA,101,,,"]);
        let meta = load_engine(&path).unwrap().metadata;
        let json = serde_json::to_string(&meta).unwrap();
        let back: BuildMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source, meta.source);
        assert_eq!(back.generated_at, meta.generated_at);
        assert_eq!(back.positions_built, 1);
    }

    #[test]
    fn test_load_engine_missing_file() {
        let err = load_engine(Path::new("/tmp/no-such-stock-ledger.csv")).unwrap_err();
        assert!(matches!(err, LedgerError::FileRead { .. }));
    }
}
