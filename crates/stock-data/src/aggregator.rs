//! Position aggregation over the raw ledger.
//!
//! Folds every transaction into its (site, storage location, material,
//! description) position in one pass. Positions are emitted in the order
//! their key first appears in the ledger, and sums are accumulated in ledger
//! order, so rebuilding from the same file always yields identical output.

use std::collections::HashMap;

use chrono::NaiveDate;
use stock_core::models::{InventoryPosition, PositionKey, ThresholdStats, Transaction, DEFAULT_UNIT};
use stock_core::{LedgerError, Result};
use tracing::debug;

// ── PositionTotals ────────────────────────────────────────────────────────────

/// Running totals for one position while the ledger is folded.
#[derive(Debug, Clone, Default)]
pub struct PositionTotals {
    pub quantity: f64,
    pub value: f64,
    pub last_active: Option<NaiveDate>,
}

impl PositionTotals {
    pub fn add_transaction(&mut self, tx: &Transaction) {
        self.quantity += tx.quantity;
        self.value += tx.amount;
        if let Some(posted) = tx.posting_date.map(|dt| dt.date()) {
            self.last_active = Some(match self.last_active {
                Some(current) => current.max(posted),
                None => posted,
            });
        }
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Output of [`aggregate_positions`].
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub positions: Vec<InventoryPosition>,
    pub stats: ThresholdStats,
}

/// Fold `transactions` into inventory positions and compute the threshold
/// statistics over their quantities.
///
/// The unit of a position is the unit of entry on the first ledger row of
/// its material (any site), or `"EA"` when that row has none.
///
/// Fails only when an accumulated total is not finite.
pub fn aggregate_positions(transactions: &[Transaction]) -> Result<Aggregation> {
    let mut index: HashMap<PositionKey, usize> = HashMap::new();
    let mut keys: Vec<PositionKey> = Vec::new();
    let mut totals: Vec<PositionTotals> = Vec::new();
    let mut units: HashMap<&str, &str> = HashMap::new();

    for tx in transactions {
        units
            .entry(tx.material.as_str())
            .or_insert_with(|| tx.unit_of_entry.as_deref().unwrap_or(DEFAULT_UNIT));

        let key = PositionKey::of(tx);
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                let i = keys.len();
                index.insert(key.clone(), i);
                keys.push(key);
                totals.push(PositionTotals::default());
                i
            }
        };
        totals[slot].add_transaction(tx);
    }

    let mut positions = Vec::with_capacity(keys.len());
    for (key, total) in keys.into_iter().zip(totals) {
        if !total.quantity.is_finite() || !total.value.is_finite() {
            return Err(LedgerError::Build(format!(
                "non-finite total for material {} at {}/{}",
                key.material, key.site, key.storage_location
            )));
        }
        let unit = units
            .get(key.material.as_str())
            .copied()
            .unwrap_or(DEFAULT_UNIT)
            .to_string();
        positions.push(InventoryPosition {
            site: key.site,
            storage_location: key.storage_location,
            material: key.material,
            material_description: key.material_description,
            current_quantity: total.quantity,
            total_value: total.value,
            last_active: total.last_active,
            unit,
        });
    }

    let stats = ThresholdStats::from_quantities(positions.iter().map(|p| p.current_quantity));
    debug!(
        "Aggregated {} transactions into {} positions (median {:.2}, mean {:.2}, std {:.2})",
        transactions.len(),
        positions.len(),
        stats.median,
        stats.mean,
        stats.std_dev
    );

    Ok(Aggregation { positions, stats })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
