//! Stock transfer recommendations.
//!
//! For every material held at two or more positions, each surplus position
//! (quantity above the median) is paired with each shortage position
//! (negative quantity) and a transfer of
//! `min(surplus - median, |shortage|)` is suggested when that is positive.

use std::cmp::Ordering;
use std::collections::HashMap;

use stock_core::formatting::round2;
use stock_core::models::{InventoryPosition, Priority};
use stock_core::reports::{MovementRecommendation, ShippingRecommendation};

use crate::analyzer::InventoryEngine;

/// A surplus/shortage pairing with a positive transfer quantity.
struct TransferPair<'a> {
    surplus: &'a InventoryPosition,
    shortage: &'a InventoryPosition,
    quantity: f64,
}

/// Positions grouped by material, in order of first appearance.
fn group_by_material(positions: &[InventoryPosition]) -> Vec<Vec<&InventoryPosition>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&InventoryPosition>> = Vec::new();
    for pos in positions {
        let slot = *index.entry(pos.material.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(pos);
    }
    groups
}

fn transfer_pairs(positions: &[InventoryPosition], median: f64) -> Vec<TransferPair<'_>> {
    let mut pairs = Vec::new();
    for group in group_by_material(positions) {
        if group.len() < 2 {
            continue;
        }
        let surplus: Vec<&InventoryPosition> = group
            .iter()
            .copied()
            .filter(|p| p.current_quantity > median)
            .collect();
        let shortage: Vec<&InventoryPosition> =
            group.iter().copied().filter(|p| p.is_shortage()).collect();

        for &s in &surplus {
            for &d in &shortage {
                let quantity = (s.current_quantity - median)
                    .abs()
                    .min(d.current_quantity.abs());
                if quantity > 0.0 {
                    pairs.push(TransferPair {
                        surplus: s,
                        shortage: d,
                        quantity,
                    });
                }
            }
        }
    }
    pairs
}

fn urgency(score: f64) -> Priority {
    if score > 2.0 {
        Priority::Critical
    } else if score > 1.0 {
        Priority::High
    } else {
        Priority::Medium
    }
}

impl InventoryEngine {
    /// Site-to-site transfers. `High` priority when the receiving position
    /// is below `-mean`; `High` first, then larger quantities first.
    pub fn shipping_recommendations(&self) -> Vec<ShippingRecommendation> {
        let stats = self.stats();
        let mut recs: Vec<ShippingRecommendation> = transfer_pairs(self.positions(), stats.median)
            .into_iter()
            .map(|pair| ShippingRecommendation {
                material: pair.surplus.material.clone(),
                material_description: pair.surplus.material_description.clone(),
                from_site: pair.surplus.site.clone(),
                to_site: pair.shortage.site.clone(),
                recommended_quantity: round2(pair.quantity),
                priority: if pair.shortage.current_quantity < -stats.mean {
                    Priority::High
                } else {
                    Priority::Medium
                },
            })
            .collect();

        recs.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.recommended_quantity.total_cmp(&a.recommended_quantity))
        });
        recs
    }

    /// Location-level transfers with a value estimate and an urgency score
    /// of `|shortage| / |mean|`. Ordered `Critical`, `High`, `Medium`, then
    /// by estimated value, largest first.
    pub fn movement_recommendations(&self) -> Vec<MovementRecommendation> {
        let stats = self.stats();
        let mut recs: Vec<MovementRecommendation> = transfer_pairs(self.positions(), stats.median)
            .into_iter()
            .map(|pair| {
                let surplus = pair.surplus;
                let shortage = pair.shortage;
                let unit_value = if surplus.current_quantity != 0.0 {
                    surplus.total_value.abs() / surplus.current_quantity.abs()
                } else {
                    0.0
                };
                let transfer_value = pair.quantity * unit_value;
                let score = if stats.mean != 0.0 {
                    shortage.current_quantity.abs() / stats.mean.abs()
                } else {
                    0.0
                };
                let impact = if transfer_value > (stats.mean * unit_value).abs() {
                    Priority::High
                } else {
                    Priority::Medium
                };

                MovementRecommendation {
                    material: surplus.material.clone(),
                    material_description: surplus.material_description.clone(),
                    from_site: surplus.site.clone(),
                    from_storage_location: surplus.storage_location.clone(),
                    to_site: shortage.site.clone(),
                    to_storage_location: shortage.storage_location.clone(),
                    available_quantity: round2(surplus.current_quantity),
                    required_quantity: round2(shortage.current_quantity.abs()),
                    recommended_quantity: round2(pair.quantity),
                    estimated_value: round2(transfer_value),
                    priority: urgency(score),
                    impact,
                }
            })
            .collect();

        recs.sort_by(|a, b| match b.priority.cmp(&a.priority) {
            Ordering::Equal => b.estimated_value.total_cmp(&a.estimated_value),
            other => other,
        });
        recs
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
