//! Flat output records returned by the inventory queries.
//!
//! Field names serialise to the column labels the presentation layer
//! consumes, so a `Vec` of any record here maps directly to a JSON table.

use serde::Serialize;

use crate::models::{AbundanceLevel, InventoryPosition, Priority, ShortageLevel};

/// Per-site totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSummary {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Total Quantity")]
    pub total_quantity: f64,
    #[serde(rename = "Total Value")]
    pub total_value: f64,
    #[serde(rename = "Unique Materials")]
    pub unique_materials: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortageItem {
    #[serde(flatten)]
    pub position: InventoryPosition,
    #[serde(rename = "Shortage Level")]
    pub level: ShortageLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbundantItem {
    #[serde(flatten)]
    pub position: InventoryPosition,
    #[serde(rename = "Abundance Level")]
    pub level: AbundanceLevel,
}

/// A shortage ranked by its monetary impact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueImpactItem {
    #[serde(flatten)]
    pub position: InventoryPosition,
    #[serde(rename = "Value Impact")]
    pub value_impact: f64,
}

/// Site-to-site transfer suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingRecommendation {
    #[serde(rename = "Material")]
    pub material: String,
    #[serde(rename = "Material Description")]
    pub material_description: String,
    #[serde(rename = "From Site")]
    pub from_site: String,
    #[serde(rename = "To Site")]
    pub to_site: String,
    #[serde(rename = "Recommended Quantity")]
    pub recommended_quantity: f64,
    #[serde(rename = "Priority")]
    pub priority: Priority,
}

/// Transfer suggestion at storage-location granularity with value estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementRecommendation {
    #[serde(rename = "Material")]
    pub material: String,
    #[serde(rename = "Material Description")]
    pub material_description: String,
    #[serde(rename = "From Site")]
    pub from_site: String,
    #[serde(rename = "From Storage Location")]
    pub from_storage_location: String,
    #[serde(rename = "To Site")]
    pub to_site: String,
    #[serde(rename = "To Storage Location")]
    pub to_storage_location: String,
    #[serde(rename = "Available Qty")]
    pub available_quantity: f64,
    #[serde(rename = "Required Qty")]
    pub required_quantity: f64,
    #[serde(rename = "Recommended Quantity")]
    pub recommended_quantity: f64,
    #[serde(rename = "Estimated Value")]
    pub estimated_value: f64,
    #[serde(rename = "Priority")]
    pub priority: Priority,
    #[serde(rename = "Impact")]
    pub impact: Priority,
}

/// Raw-ledger totals of one material at one storage location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationBreakdown {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Storage Location")]
    pub storage_location: String,
    #[serde(rename = "Quantity")]
    pub quantity: f64,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// One ledger row as shown in a material's recent history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    /// `YYYY-MM-DD` or `"N/A"`.
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Type")]
    pub movement_type: String,
    #[serde(rename = "Qty")]
    pub quantity: f64,
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Storage")]
    pub storage_location: String,
    #[serde(rename = "Text")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialDetails {
    pub locations: Vec<LocationBreakdown>,
    pub transactions: Vec<TransactionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteBottleneck {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Total Shortage Qty")]
    pub total_shortage_quantity: f64,
    #[serde(rename = "Item Count")]
    pub item_count: usize,
    #[serde(rename = "Total Value Impact")]
    pub total_value_impact: f64,
    #[serde(rename = "Bottleneck Type")]
    pub bottleneck_type: &'static str,
    #[serde(rename = "Priority")]
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationBottleneck {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Storage Location")]
    pub storage_location: String,
    #[serde(rename = "Total Shortage Qty")]
    pub total_shortage_quantity: f64,
    #[serde(rename = "Item Count")]
    pub item_count: usize,
    #[serde(rename = "Total Value Impact")]
    pub total_value_impact: f64,
    #[serde(rename = "Bottleneck Type")]
    pub bottleneck_type: &'static str,
    #[serde(rename = "Priority")]
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialBottleneck {
    #[serde(rename = "Material")]
    pub material: String,
    #[serde(rename = "Material Description")]
    pub material_description: String,
    #[serde(rename = "Total Shortage Qty")]
    pub total_shortage_quantity: f64,
    #[serde(rename = "Item Count")]
    pub item_count: usize,
    #[serde(rename = "Total Value Impact")]
    pub total_value_impact: f64,
    /// Comma-separated sites, in order of first appearance.
    #[serde(rename = "Affected Sites")]
    pub affected_sites: String,
    #[serde(rename = "Bottleneck Type")]
    pub bottleneck_type: &'static str,
    #[serde(rename = "Priority")]
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BottleneckReport {
    pub sites: Vec<SiteBottleneck>,
    pub locations: Vec<LocationBottleneck>,
    pub materials: Vec<MaterialBottleneck>,
}

/// A position flagged for attention, with the reason and suggested action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusItem {
    #[serde(flatten)]
    pub position: InventoryPosition,
    #[serde(rename = "Focus Reason")]
    pub reason: &'static str,
    #[serde(rename = "Action")]
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteIssue {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Shortage Count")]
    pub shortage_count: usize,
    #[serde(rename = "Total Shortage Qty")]
    pub total_shortage_quantity: f64,
    #[serde(rename = "Total Value Impact")]
    pub total_value_impact: f64,
    #[serde(rename = "Focus Reason")]
    pub reason: &'static str,
    #[serde(rename = "Action")]
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationIssue {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Storage Location")]
    pub storage_location: String,
    #[serde(rename = "Shortage Count")]
    pub shortage_count: usize,
    #[serde(rename = "Total Shortage Qty")]
    pub total_shortage_quantity: f64,
    #[serde(rename = "Total Value Impact")]
    pub total_value_impact: f64,
    #[serde(rename = "Focus Reason")]
    pub reason: &'static str,
    #[serde(rename = "Action")]
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusAreas {
    pub high_value: Vec<FocusItem>,
    pub critical_quantity: Vec<FocusItem>,
    pub site_issues: Vec<SiteIssue>,
    pub location_issues: Vec<LocationIssue>,
}

/// Headline figures for the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_items: usize,
    pub total_sites: usize,
    pub total_materials: usize,
    pub negative_items: usize,
    pub positive_items: usize,
    pub total_quantity: f64,
    pub total_value: f64,
    pub avg_quantity: f64,
    pub median_quantity: f64,
}
