//! The inventory engine and its position-level queries.
//!
//! [`InventoryEngine`] owns the raw ledger, the aggregated positions and the
//! threshold statistics. Every query is a pure read; none of them fail on
//! an empty ledger.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Duration, Local, NaiveDate};
use stock_core::classify::{AbundanceBands, ShortageBands};
use stock_core::formatting::{format_date, round2};
use stock_core::models::{InventoryPosition, ThresholdStats, Transaction};
use stock_core::reports::{
    AbundantItem, DashboardStats, LocationBreakdown, MaterialDetails, ShortageItem, SiteSummary,
    TransactionView, ValueImpactItem,
};
use stock_core::stats::percentile_of;
use stock_core::Result;
use tracing::debug;

use crate::aggregator::aggregate_positions;

/// Rows shown in a material's recent history.
pub const RECENT_TRANSACTIONS: usize = 10;

// ── InventoryEngine ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InventoryEngine {
    transactions: Vec<Transaction>,
    positions: Vec<InventoryPosition>,
    stats: ThresholdStats,
}

impl InventoryEngine {
    /// Aggregate `transactions` into positions and statistics.
    pub fn build(transactions: Vec<Transaction>) -> Result<Self> {
        let aggregation = aggregate_positions(&transactions)?;
        Ok(Self {
            transactions,
            positions: aggregation.positions,
            stats: aggregation.stats,
        })
    }

    /// Positions in order of first appearance in the ledger.
    pub fn positions(&self) -> &[InventoryPosition] {
        &self.positions
    }

    pub fn stats(&self) -> ThresholdStats {
        self.stats
    }

    fn signed_percentile(&self, p: f64) -> Option<f64> {
        percentile_of(self.positions.iter().map(|pos| pos.current_quantity), p)
    }

    // ── Site summary ─────────────────────────────────────────────────────────

    /// Totals per site, sorted by site.
    pub fn site_summary(&self) -> Vec<SiteSummary> {
        #[derive(Default)]
        struct SiteTotals<'a> {
            quantity: f64,
            value: f64,
            materials: HashSet<&'a str>,
        }

        let mut sites: BTreeMap<&str, SiteTotals<'_>> = BTreeMap::new();
        for pos in &self.positions {
            let totals = sites.entry(pos.site.as_str()).or_default();
            totals.quantity += pos.current_quantity;
            totals.value += pos.total_value;
            totals.materials.insert(pos.material.as_str());
        }

        sites
            .into_iter()
            .map(|(site, totals)| SiteSummary {
                site: site.to_string(),
                total_quantity: round2(totals.quantity),
                total_value: round2(totals.value),
                unique_materials: totals.materials.len(),
            })
            .collect()
    }

    // ── Shortage / critical / abundant ───────────────────────────────────────

    /// Negative positions, optionally restricted to those below the given
    /// percentile of signed quantities, most negative first.
    pub fn shortage_items(&self, percentile: Option<f64>) -> Vec<ShortageItem> {
        let threshold = match percentile {
            Some(p) => match self.signed_percentile(p) {
                Some(t) => Some(t),
                None => return Vec::new(),
            },
            None => None,
        };

        let mut shortages: Vec<&InventoryPosition> = self
            .positions
            .iter()
            .filter(|pos| pos.is_shortage())
            .filter(|pos| threshold.map_or(true, |t| pos.current_quantity < t))
            .collect();
        shortages.sort_by(|a, b| a.current_quantity.total_cmp(&b.current_quantity));

        let bands = ShortageBands::from_stats(&self.stats);
        if matches!(bands, ShortageBands::Unclassifiable) && !shortages.is_empty() {
            debug!(
                "Shortage bands not ascending (median {}, mean {}); labelling all High",
                self.stats.median, self.stats.mean
            );
        }

        shortages
            .into_iter()
            .map(|pos| ShortageItem {
                level: bands.classify(pos.current_quantity),
                position: pos.clone(),
            })
            .collect()
    }

    /// Positions at or below `-|mean| * multiplier`, most negative first.
    pub fn critical_items(&self, multiplier: f64) -> Vec<InventoryPosition> {
        let threshold = -self.stats.mean.abs() * multiplier;
        let mut critical: Vec<InventoryPosition> = self
            .positions
            .iter()
            .filter(|pos| pos.current_quantity <= threshold)
            .cloned()
            .collect();
        critical.sort_by(|a, b| a.current_quantity.total_cmp(&b.current_quantity));
        critical
    }

    /// Positions strictly above the `percentile`-th percentile of signed
    /// quantities, largest first. Only positive quantities qualify, so a
    /// low percentile never reports a shortage as abundant.
    pub fn abundant_items(&self, percentile: f64) -> Vec<AbundantItem> {
        let Some(threshold) = self.signed_percentile(percentile) else {
            return Vec::new();
        };

        let mut abundant: Vec<&InventoryPosition> = self
            .positions
            .iter()
            .filter(|pos| pos.current_quantity > threshold && pos.current_quantity > 0.0)
            .collect();
        if abundant.is_empty() {
            return Vec::new();
        }
        abundant.sort_by(|a, b| b.current_quantity.total_cmp(&a.current_quantity));

        let max_quantity = abundant[0].current_quantity;
        let bands = AbundanceBands::new(threshold, max_quantity, &self.stats);
        debug!("Abundance threshold {:.2}, bands {:?}", threshold, bands);

        abundant
            .into_iter()
            .map(|pos| AbundantItem {
                level: bands.classify(pos.current_quantity),
                position: pos.clone(),
            })
            .collect()
    }

    // ── Filters ──────────────────────────────────────────────────────────────

    /// Positions of one material, or every position when `material` is `None`.
    pub fn material_analysis(&self, material: Option<&str>) -> Vec<InventoryPosition> {
        self.positions
            .iter()
            .filter(|pos| material.map_or(true, |m| pos.material == m))
            .cloned()
            .collect()
    }

    /// Positions at one site, or every position when `site` is `None`.
    pub fn site_inventory(&self, site: Option<&str>) -> Vec<InventoryPosition> {
        self.positions
            .iter()
            .filter(|pos| site.map_or(true, |s| pos.site == s))
            .cloned()
            .collect()
    }

    /// Per-location breakdown and recent history of one material, computed
    /// from the raw ledger.
    pub fn material_details(&self, material: &str) -> MaterialDetails {
        let rows: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.material == material)
            .collect();

        let mut by_location: BTreeMap<(&str, &str), (f64, f64)> = BTreeMap::new();
        for tx in &rows {
            let entry = by_location
                .entry((tx.site.as_str(), tx.storage_location.as_str()))
                .or_default();
            entry.0 += tx.quantity;
            entry.1 += tx.amount;
        }
        let locations = by_location
            .into_iter()
            .map(|((site, loc), (quantity, value))| LocationBreakdown {
                site: site.to_string(),
                storage_location: loc.to_string(),
                quantity,
                value,
            })
            .collect();

        // Newest first; undated rows go last.
        let mut recent = rows;
        recent.sort_by(|a, b| match (a.posting_date, b.posting_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        let transactions = recent
            .into_iter()
            .take(RECENT_TRANSACTIONS)
            .map(|tx| TransactionView {
                date: format_date(tx.posting_date.map(|dt| dt.date())),
                movement_type: tx.movement_type.clone(),
                quantity: tx.quantity,
                site: tx.site.clone(),
                storage_location: tx.storage_location.clone(),
                text: tx.text.clone().unwrap_or_default(),
            })
            .collect();

        MaterialDetails {
            locations,
            transactions,
        }
    }

    // ── Top shortages / inactive stock ───────────────────────────────────────

    /// The `limit` shortages with the most negative value.
    pub fn top_shortages_by_value(&self, limit: usize) -> Vec<ValueImpactItem> {
        let mut shortages: Vec<&InventoryPosition> =
            self.positions.iter().filter(|pos| pos.is_shortage()).collect();
        shortages.sort_by(|a, b| a.total_value.total_cmp(&b.total_value));
        shortages
            .into_iter()
            .take(limit)
            .map(|pos| ValueImpactItem {
                value_impact: pos.total_value,
                position: pos.clone(),
            })
            .collect()
    }

    /// Positions with no movement in the last `days` days, relative to today.
    pub fn inactive_stock(&self, days: u32, limit: usize) -> Vec<InventoryPosition> {
        self.inactive_stock_as_of(Local::now().date_naive(), days, limit)
    }

    /// Positions whose last activity is unknown or on or before
    /// `today - days`. Unknown dates come first, then oldest.
    pub fn inactive_stock_as_of(
        &self,
        today: NaiveDate,
        days: u32,
        limit: usize,
    ) -> Vec<InventoryPosition> {
        let cutoff = today
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MIN);

        let mut inactive: Vec<&InventoryPosition> = self
            .positions
            .iter()
            .filter(|pos| pos.last_active.map_or(true, |d| d <= cutoff))
            .collect();
        // `None < Some(_)` puts undated positions first.
        inactive.sort_by_key(|pos| pos.last_active);
        inactive.into_iter().take(limit).cloned().collect()
    }

    // ── Dashboard ────────────────────────────────────────────────────────────

    pub fn dashboard_stats(&self) -> DashboardStats {
        let sites: BTreeSet<&str> = self.positions.iter().map(|p| p.site.as_str()).collect();
        let materials: BTreeSet<&str> =
            self.positions.iter().map(|p| p.material.as_str()).collect();

        DashboardStats {
            total_items: self.positions.len(),
            total_sites: sites.len(),
            total_materials: materials.len(),
            negative_items: self
                .positions
                .iter()
                .filter(|p| p.current_quantity < 0.0)
                .count(),
            positive_items: self
                .positions
                .iter()
                .filter(|p| p.current_quantity > 0.0)
                .count(),
            total_quantity: round2(self.positions.iter().map(|p| p.current_quantity).sum()),
            total_value: round2(self.positions.iter().map(|p| p.total_value).sum()),
            avg_quantity: round2(self.stats.mean),
            median_quantity: round2(self.stats.median),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use stock_core::models::{AbundanceLevel, ShortageLevel};

    pub(crate) fn at(date: &str) -> Option<NaiveDateTime> {
        Some(
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    pub(crate) fn row(site: &str, loc: &str, material: &str, qty: f64, amount: f64) -> Transaction {
        Transaction {
            site: site.to_string(),
            storage_location: loc.to_string(),
            material: material.to_string(),
            material_description: format!("Desc {material}"),
            quantity: qty,
            amount,
            unit_of_entry: Some("EA".to_string()),
            movement_type: "101".to_string(),
            document_date: None,
            posting_date: None,
            text: None,
        }
    }

    pub(crate) fn engine(rows: Vec<Transaction>) -> InventoryEngine {
        InventoryEngine::build(rows).unwrap()
    }

    fn quantities(positions: &[InventoryPosition]) -> Vec<f64> {
        positions.iter().map(|p| p.current_quantity).collect()
    }

    // ── build ────────────────────────────────────────────────────────────────

    #[test]
    fn test_receipt_and_issue_net_to_shortage() {
        let e = engine(vec![
            row("A", "1", "M", 50.0, 500.0),
            row("A", "1", "M", -70.0, -700.0),
        ]);
        assert_eq!(e.positions().len(), 1);
        assert_eq!(e.positions()[0].current_quantity, -20.0);
        assert_eq!(e.positions()[0].total_value, -200.0);

        let shortages = e.shortage_items(None);
        assert_eq!(shortages.len(), 1);
        assert_eq!(shortages[0].position.material, "M");
    }

    #[test]
    fn test_position_sums_match_raw_rows() {
        let rows: Vec<Transaction> = (0..40)
            .map(|i| {
                row(
                    ["A", "B"][i % 2],
                    ["1", "2", "3"][i % 3],
                    ["M1", "M2"][i % 2],
                    (i as f64 - 17.0) * 1.25,
                    (i as f64) * 3.5,
                )
            })
            .collect();
        let e = engine(rows.clone());
        for pos in e.positions() {
            let expected: f64 = rows
                .iter()
                .filter(|r| {
                    r.site == pos.site
                        && r.storage_location == pos.storage_location
                        && r.material == pos.material
                        && r.material_description == pos.material_description
                })
                .fold(0.0, |acc, r| acc + r.quantity);
            assert_eq!(pos.current_quantity, expected);
        }
    }

    #[test]
    fn test_rebuild_is_bit_identical() {
        let rows = vec![
            row("A", "1", "M", 0.1, 0.7),
            row("A", "1", "M", 0.2, 0.3),
            row("B", "1", "M", -0.3, 1.1),
        ];
        let a = engine(rows.clone());
        let b = engine(rows);
        for (x, y) in a.positions().iter().zip(b.positions()) {
            assert_eq!(x.current_quantity.to_bits(), y.current_quantity.to_bits());
            assert_eq!(x.total_value.to_bits(), y.total_value.to_bits());
        }
    }

    // ── empty ledger ─────────────────────────────────────────────────────────

    #[test]
    fn test_empty_ledger_queries_are_empty() {
        let e = engine(Vec::new());
        assert!(e.positions().is_empty());
        assert_eq!(e.dashboard_stats(), DashboardStats::default());
        assert!(e.site_summary().is_empty());
        assert!(e.shortage_items(None).is_empty());
        assert!(e.shortage_items(Some(25.0)).is_empty());
        assert!(e.critical_items(2.0).is_empty());
        assert!(e.abundant_items(90.0).is_empty());
        assert!(e.material_analysis(None).is_empty());
        assert!(e.site_inventory(None).is_empty());
        let details = e.material_details("M");
        assert!(details.locations.is_empty());
        assert!(details.transactions.is_empty());
        assert!(e.top_shortages_by_value(10).is_empty());
        assert!(e.inactive_stock(90, 20).is_empty());
    }

    // ── site summary ─────────────────────────────────────────────────────────

    #[test]
    fn test_site_summary_sorted_and_rounded() {
        let e = engine(vec![
            row("B", "1", "M1", 1.005, 10.0),
            row("A", "1", "M1", 2.0, 3.333),
            row("A", "2", "M2", 3.0, 1.0),
            row("A", "3", "M2", 1.0, 1.0),
        ]);
        let summary = e.site_summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].site, "A");
        assert_eq!(summary[0].total_quantity, 6.0);
        assert_eq!(summary[0].total_value, 5.33);
        assert_eq!(summary[0].unique_materials, 2);
        assert_eq!(summary[1].site, "B");
        assert_eq!(summary[1].unique_materials, 1);
    }

    // ── shortages ────────────────────────────────────────────────────────────

    #[test]
    fn test_shortage_items_sorted_ascending() {
        let e = engine(vec![
            row("A", "1", "M1", -5.0, 0.0),
            row("A", "1", "M2", -50.0, 0.0),
            row("A", "1", "M3", 10.0, 0.0),
            row("A", "1", "M4", -1.0, 0.0),
        ]);
        let q: Vec<f64> = e
            .shortage_items(None)
            .iter()
            .map(|s| s.position.current_quantity)
            .collect();
        assert_eq!(q, vec![-50.0, -5.0, -1.0]);
    }

    #[test]
    fn test_shortage_items_levels() {
        // |q| = 100, 10, 4, 2, 1 → median 4, mean 23.4
        let e = engine(vec![
            row("A", "1", "M1", -100.0, 0.0),
            row("A", "1", "M2", -10.0, 0.0),
            row("A", "1", "M3", -4.0, 0.0),
            row("A", "1", "M4", -2.0, 0.0),
            row("A", "1", "M5", 1.0, 0.0),
        ]);
        let levels: Vec<ShortageLevel> = e.shortage_items(None).iter().map(|s| s.level).collect();
        assert_eq!(
            levels,
            vec![
                ShortageLevel::Critical,
                ShortageLevel::High,
                ShortageLevel::High,
                ShortageLevel::Moderate
            ]
        );
    }

    #[test]
    fn test_shortage_items_with_percentile() {
        // signed: -40, -20, -10, 5, 30 → p25 = -20 → strictly below: -40 only
        let e = engine(vec![
            row("A", "1", "M1", -40.0, 0.0),
            row("A", "1", "M2", -20.0, 0.0),
            row("A", "1", "M3", -10.0, 0.0),
            row("A", "1", "M4", 5.0, 0.0),
            row("A", "1", "M5", 30.0, 0.0),
        ]);
        let items = e.shortage_items(Some(25.0));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].position.current_quantity, -40.0);
        // A high percentile never admits non-negative positions.
        assert!(e
            .shortage_items(Some(100.0))
            .iter()
            .all(|s| s.position.current_quantity < 0.0));
    }

    #[test]
    fn test_shortage_labels_monotonic_over_ledger() {
        let rows: Vec<Transaction> = (1..=30)
            .map(|i| row("A", "1", &format!("M{i}"), -(i as f64).powi(2) / 3.0, 0.0))
            .chain((1..=10).map(|i| row("B", "1", &format!("P{i}"), i as f64, 0.0)))
            .collect();
        let items = engine(rows).shortage_items(None);
        for pair in items.windows(2) {
            assert!(pair[0].position.current_quantity <= pair[1].position.current_quantity);
            assert!(pair[0].level >= pair[1].level);
        }
    }

    // ── critical ─────────────────────────────────────────────────────────────

    #[test]
    fn test_critical_items_threshold_inclusive() {
        // |q| = 40, 10, 10 → mean 20 → threshold -40
        let e = engine(vec![
            row("A", "1", "M1", -40.0, 0.0),
            row("A", "1", "M2", -10.0, 0.0),
            row("A", "1", "M3", 10.0, 0.0),
        ]);
        assert_eq!(quantities(&e.critical_items(2.0)), vec![-40.0]);
        assert_eq!(quantities(&e.critical_items(1.0)), vec![-40.0]);
        assert_eq!(quantities(&e.critical_items(0.5)), vec![-40.0, -10.0]);
    }

    // ── abundant ─────────────────────────────────────────────────────────────

    #[test]
    fn test_abundant_items_strictly_above_threshold() {
        // Ten equal quantities: p90 equals the max, so nothing is strictly above.
        let rows: Vec<Transaction> = (0..10)
            .map(|i| row("A", "1", &format!("M{i}"), 5.0, 0.0))
            .collect();
        assert!(engine(rows).abundant_items(90.0).is_empty());
    }

    #[test]
    fn test_abundant_items_sorted_descending_with_levels() {
        let mut rows: Vec<Transaction> = (1..=18)
            .map(|i| row("A", "1", &format!("M{i}"), i as f64, 0.0))
            .collect();
        rows.push(row("A", "1", "BIG1", 60.0, 0.0));
        rows.push(row("A", "1", "BIG2", 500.0, 0.0));
        let e = engine(rows);
        let items = e.abundant_items(90.0);
        let q: Vec<f64> = items.iter().map(|a| a.position.current_quantity).collect();
        assert_eq!(q, vec![500.0, 60.0]);
        // threshold 22.2 = 2 * median capped up to it, so the direct rule
        // applies: 3 * mean = 109.65, 2 * median = 21.
        assert_eq!(items[0].level, AbundanceLevel::VeryHigh);
        assert_eq!(items[1].level, AbundanceLevel::High);
    }

    #[test]
    fn test_abundant_items_equal_breakpoints_use_direct_rule() {
        // median 10, mean 72 / 11, p90 = 10: 2 * median and 3 * mean
        // both resolve to 20.
        let mut rows: Vec<Transaction> = Vec::new();
        for i in 0..5 {
            rows.push(row("A", "1", &format!("Z{i}"), 0.0, 0.0));
            rows.push(row("A", "1", &format!("T{i}"), 10.0, 0.0));
        }
        rows.push(row("A", "1", "BIG", 22.0, 0.0));
        let items = engine(rows).abundant_items(90.0);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].position.current_quantity, 22.0);
        assert_eq!(items[0].level, AbundanceLevel::VeryHigh);
    }

    #[test]
    fn test_shortage_and_abundant_disjoint() {
        let rows: Vec<Transaction> = (-10..=10)
            .map(|i| row("A", "1", &format!("M{i}"), (i * 7) as f64, 0.0))
            .collect();
        let e = engine(rows);
        let shortages: HashSet<String> = e
            .shortage_items(None)
            .into_iter()
            .map(|s| s.position.material)
            .collect();
        for p in [0.0, 50.0, 90.0] {
            for item in e.abundant_items(p) {
                assert!(!shortages.contains(&item.position.material));
            }
        }
        for item in e.critical_items(1.0) {
            assert!(shortages.contains(&item.material));
        }
    }

    // ── filters and details ──────────────────────────────────────────────────

    #[test]
    fn test_material_and_site_filters() {
        let e = engine(vec![
            row("A", "1", "M1", 1.0, 0.0),
            row("B", "1", "M1", 2.0, 0.0),
            row("A", "1", "M2", 3.0, 0.0),
        ]);
        assert_eq!(e.material_analysis(Some("M1")).len(), 2);
        assert_eq!(e.material_analysis(None).len(), 3);
        assert_eq!(e.site_inventory(Some("A")).len(), 2);
        assert!(e.site_inventory(Some("Z")).is_empty());
    }

    #[test]
    fn test_material_details_breakdown_and_history() {
        let mut rows = Vec::new();
        for day in 1..=12 {
            let mut r = row("B", "2", "M", 1.0, 2.0);
            r.posting_date = at(&format!("2025-07-{day:02}"));
            r.text = (day == 12).then(|| "latest".to_string());
            rows.push(r);
        }
        let mut undated = row("A", "1", "M", -3.0, -6.0);
        undated.movement_type = "261".to_string();
        rows.insert(0, undated);
        rows.push(row("A", "1", "OTHER", 99.0, 99.0));

        let details = engine(rows).material_details("M");
        assert_eq!(details.locations.len(), 2);
        assert_eq!(details.locations[0].site, "A");
        assert_eq!(details.locations[0].quantity, -3.0);
        assert_eq!(details.locations[1].site, "B");
        assert_eq!(details.locations[1].quantity, 12.0);
        assert_eq!(details.locations[1].value, 24.0);

        assert_eq!(details.transactions.len(), RECENT_TRANSACTIONS);
        assert_eq!(details.transactions[0].date, "2025-07-12");
        assert_eq!(details.transactions[0].text, "latest");
        assert_eq!(details.transactions[1].text, "");
        assert_eq!(details.transactions[9].date, "2025-07-03");
    }

    #[test]
    fn test_material_details_undated_rows_last() {
        let mut dated = row("A", "1", "M", 1.0, 1.0);
        dated.posting_date = at("2024-01-01");
        let details = engine(vec![row("A", "1", "M", 2.0, 2.0), dated]).material_details("M");
        assert_eq!(details.transactions[0].date, "2024-01-01");
        assert_eq!(details.transactions[1].date, "N/A");
    }

    // ── top shortages / inactive ─────────────────────────────────────────────

    #[test]
    fn test_top_shortages_by_value() {
        let e = engine(vec![
            row("A", "1", "M1", -1.0, -10.0),
            row("A", "1", "M2", -1.0, -500.0),
            row("A", "1", "M3", 5.0, -900.0),
            row("A", "1", "M4", -1.0, -50.0),
        ]);
        let top = e.top_shortages_by_value(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].position.material, "M2");
        assert_eq!(top[0].value_impact, -500.0);
        assert_eq!(top[1].position.material, "M4");
    }

    #[test]
    fn test_inactive_stock_as_of() {
        let mut old = row("A", "1", "OLD", 1.0, 1.0);
        old.posting_date = at("2025-01-01");
        let mut older = row("A", "1", "OLDER", 1.0, 1.0);
        older.posting_date = at("2024-06-01");
        let mut edge = row("A", "1", "EDGE", 1.0, 1.0);
        edge.posting_date = at("2025-04-02");
        let mut recent = row("A", "1", "RECENT", 1.0, 1.0);
        recent.posting_date = at("2025-04-03");
        let mut fresh = row("A", "1", "FRESH", 1.0, 1.0);
        fresh.posting_date = at("2025-06-30");
        let undated = row("A", "1", "NODATE", 1.0, 1.0);

        let e = engine(vec![old, fresh, edge, recent, undated, older]);
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        // cutoff = 2025-04-02: EDGE falls on it, RECENT is one day after.
        let materials: Vec<String> = e
            .inactive_stock_as_of(today, 90, 20)
            .into_iter()
            .map(|p| p.material)
            .collect();
        assert_eq!(materials, vec!["NODATE", "OLDER", "OLD", "EDGE"]);
        assert_eq!(e.inactive_stock_as_of(today, 90, 1).len(), 1);
    }

    // ── dashboard ────────────────────────────────────────────────────────────

    #[test]
    fn test_dashboard_stats_counts() {
        let e = engine(vec![
            row("A", "1", "M1", -10.0, -100.0),
            row("A", "1", "M2", 0.0, 0.0),
            row("B", "1", "M1", 10.0, 100.456),
            row("B", "2", "M3", 40.0, 0.0),
        ]);
        let s = e.dashboard_stats();
        assert_eq!(s.total_items, 4);
        assert_eq!(s.total_sites, 2);
        assert_eq!(s.total_materials, 3);
        assert_eq!(s.negative_items, 1);
        assert_eq!(s.positive_items, 2);
        assert!(s.negative_items + s.positive_items <= s.total_items);
        assert_eq!(s.total_quantity, 40.0);
        assert_eq!(s.total_value, 0.46);
        assert_eq!(s.avg_quantity, 15.0);
        assert_eq!(s.median_quantity, 10.0);
    }
}
