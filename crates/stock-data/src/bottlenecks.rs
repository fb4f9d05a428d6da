//! Bottleneck and focus-area views over the shortage positions.

use std::collections::BTreeMap;

use stock_core::models::{InventoryPosition, Priority};
use stock_core::reports::{
    BottleneckReport, FocusAreas, FocusItem, LocationBottleneck, LocationIssue,
    MaterialBottleneck, SiteBottleneck, SiteIssue,
};

use crate::analyzer::InventoryEngine;

/// Cap applied to the focus views that are truncated.
pub const FOCUS_LIMIT: usize = 20;

/// Share of the portfolio value above which a site bottleneck is critical.
const SITE_CRITICAL_SHARE: f64 = 0.10;
/// Same for storage-location and material bottlenecks.
const LOCATION_CRITICAL_SHARE: f64 = 0.05;

// ── ShortageGroup ─────────────────────────────────────────────────────────────

/// Sums over the shortage positions of one group.
#[derive(Debug, Clone, Default)]
struct ShortageGroup<'a> {
    quantity: f64,
    value: f64,
    count: usize,
    description: Option<&'a str>,
    sites: Vec<&'a str>,
}

impl<'a> ShortageGroup<'a> {
    fn add_position(&mut self, pos: &'a InventoryPosition) {
        self.quantity += pos.current_quantity;
        self.value += pos.total_value;
        self.count += 1;
        self.description.get_or_insert(pos.material_description.as_str());
        if !self.sites.contains(&pos.site.as_str()) {
            self.sites.push(pos.site.as_str());
        }
    }
}

/// Group shortage positions by `key`; groups come out sorted by key.
fn group_shortages<'a, K, F>(positions: &'a [InventoryPosition], key: F) -> Vec<(K, ShortageGroup<'a>)>
where
    K: Ord,
    F: Fn(&'a InventoryPosition) -> K,
{
    let mut groups: BTreeMap<K, ShortageGroup<'a>> = BTreeMap::new();
    for pos in positions.iter().filter(|p| p.is_shortage()) {
        groups.entry(key(pos)).or_default().add_position(pos);
    }
    groups.into_iter().collect()
}

fn by_value_impact<K>(groups: &mut [(K, ShortageGroup<'_>)]) {
    groups.sort_by(|a, b| a.1.value.total_cmp(&b.1.value));
}

fn by_count_desc<K>(groups: &mut [(K, ShortageGroup<'_>)]) {
    groups.sort_by(|a, b| b.1.count.cmp(&a.1.count));
}

fn bottleneck_priority(impact: f64, portfolio_value: f64, share: f64) -> Priority {
    if impact.abs() > (portfolio_value * share).abs() {
        Priority::Critical
    } else {
        Priority::High
    }
}

fn focus_item(pos: &InventoryPosition, reason: &'static str, action: &'static str) -> FocusItem {
    FocusItem {
        position: pos.clone(),
        reason,
        action,
    }
}

impl InventoryEngine {
    /// Shortages grouped by site, by storage location and by material,
    /// each sorted by value impact (most negative first).
    pub fn bottleneck_analysis(&self) -> BottleneckReport {
        let positions = self.positions();
        let portfolio_value: f64 = positions.iter().map(|p| p.total_value).sum();

        let mut sites = group_shortages(positions, |p| p.site.as_str());
        by_value_impact(&mut sites);
        let sites = sites
            .into_iter()
            .map(|(site, g)| SiteBottleneck {
                site: site.to_string(),
                total_shortage_quantity: g.quantity,
                item_count: g.count,
                total_value_impact: g.value,
                bottleneck_type: "Site",
                priority: bottleneck_priority(g.value, portfolio_value, SITE_CRITICAL_SHARE),
            })
            .collect();

        let mut locations =
            group_shortages(positions, |p| (p.site.as_str(), p.storage_location.as_str()));
        by_value_impact(&mut locations);
        let locations = locations
            .into_iter()
            .map(|((site, loc), g)| LocationBottleneck {
                site: site.to_string(),
                storage_location: loc.to_string(),
                total_shortage_quantity: g.quantity,
                item_count: g.count,
                total_value_impact: g.value,
                bottleneck_type: "Storage Location",
                priority: bottleneck_priority(g.value, portfolio_value, LOCATION_CRITICAL_SHARE),
            })
            .collect();

        let mut materials = group_shortages(positions, |p| p.material.as_str());
        by_value_impact(&mut materials);
        let materials = materials
            .into_iter()
            .map(|(material, g)| MaterialBottleneck {
                material: material.to_string(),
                material_description: g.description.unwrap_or_default().to_string(),
                total_shortage_quantity: g.quantity,
                item_count: g.count,
                total_value_impact: g.value,
                affected_sites: g.sites.join(", "),
                bottleneck_type: "Material",
                priority: bottleneck_priority(g.value, portfolio_value, LOCATION_CRITICAL_SHARE),
            })
            .collect();

        BottleneckReport {
            sites,
            locations,
            materials,
        }
    }

    /// Four views of where attention is needed first.
    pub fn focus_areas(&self) -> FocusAreas {
        let positions = self.positions();

        let mut high_value: Vec<&InventoryPosition> = positions
            .iter()
            .filter(|p| p.is_shortage() && p.total_value < 0.0)
            .collect();
        high_value.sort_by(|a, b| a.total_value.total_cmp(&b.total_value));
        let high_value = high_value
            .into_iter()
            .take(FOCUS_LIMIT)
            .map(|p| focus_item(p, "High Value Impact", "Urgent Replenishment Required"))
            .collect();

        let gap = -self.stats().mean.abs();
        let mut critical: Vec<&InventoryPosition> = positions
            .iter()
            .filter(|p| p.current_quantity < gap)
            .collect();
        critical.sort_by(|a, b| a.current_quantity.total_cmp(&b.current_quantity));
        let critical_quantity = critical
            .into_iter()
            .take(FOCUS_LIMIT)
            .map(|p| focus_item(p, "Critical Quantity Gap", "Immediate Stock Transfer"))
            .collect();

        // Site issues are not truncated.
        let mut sites = group_shortages(positions, |p| p.site.as_str());
        by_count_desc(&mut sites);
        let site_issues = sites
            .into_iter()
            .map(|(site, g)| SiteIssue {
                site: site.to_string(),
                shortage_count: g.count,
                total_shortage_quantity: g.quantity,
                total_value_impact: g.value,
                reason: "Multiple Shortages",
                action: "Site-Level Review Required",
            })
            .collect();

        let mut locations =
            group_shortages(positions, |p| (p.site.as_str(), p.storage_location.as_str()));
        by_count_desc(&mut locations);
        let location_issues = locations
            .into_iter()
            .take(FOCUS_LIMIT)
            .map(|((site, loc), g)| LocationIssue {
                site: site.to_string(),
                storage_location: loc.to_string(),
                shortage_count: g.count,
                total_shortage_quantity: g.quantity,
                total_value_impact: g.value,
                reason: "Location Issues",
                action: "Storage Location Audit",
            })
            .collect();

        FocusAreas {
            high_value,
            critical_quantity,
            site_issues,
            location_issues,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
