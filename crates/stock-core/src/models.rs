use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::formatting::serialize_date_or_na;

/// Sentinel site for rows whose `Plant` cell is blank.
pub const UNKNOWN_SITE: &str = "Unknown";
/// Sentinel storage location for rows whose `Storage Location` cell is blank.
pub const UNKNOWN_STORAGE_LOCATION: &str = "N/A";
/// Sentinel material code for rows whose `Material` cell is blank.
pub const UNKNOWN_MATERIAL: &str = "Unknown";
/// Unit reported when a material's first ledger row carries no unit.
pub const DEFAULT_UNIT: &str = "EA";

/// A single stock movement read from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Plant code, canonicalised.
    pub site: String,
    /// Storage location code, canonicalised.
    pub storage_location: String,
    /// Material number, canonicalised.
    pub material: String,
    /// Free-text material description (part of the position key).
    pub material_description: String,
    /// Signed quantity moved; receipts are positive, issues negative.
    pub quantity: f64,
    /// Signed amount in local currency.
    pub amount: f64,
    /// Unit of entry as written on the row.
    #[serde(default)]
    pub unit_of_entry: Option<String>,
    /// Movement type code (e.g. `"101"`, `"261"`).
    #[serde(default)]
    pub movement_type: String,
    #[serde(default)]
    pub document_date: Option<NaiveDateTime>,
    /// Posting date; `None` when the cell was blank or unparseable.
    #[serde(default)]
    pub posting_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Identity of an inventory position.
///
/// The description is part of the key: the same material code written with
/// two different descriptions yields two positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey {
    pub site: String,
    pub storage_location: String,
    pub material: String,
    pub material_description: String,
}

impl PositionKey {
    /// Build the key a transaction aggregates into.
    pub fn of(tx: &Transaction) -> Self {
        Self {
            site: tx.site.clone(),
            storage_location: tx.storage_location.clone(),
            material: tx.material.clone(),
            material_description: tx.material_description.clone(),
        }
    }
}

/// Aggregated current inventory for one
/// (site, storage location, material, description) combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryPosition {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Storage Location")]
    pub storage_location: String,
    #[serde(rename = "Material")]
    pub material: String,
    #[serde(rename = "Material Description")]
    pub material_description: String,
    /// Signed sum of all member transaction quantities.
    #[serde(rename = "Current Quantity")]
    pub current_quantity: f64,
    /// Signed sum of all member transaction amounts.
    #[serde(rename = "Total Value")]
    pub total_value: f64,
    /// Latest posting date seen for the key; serialised as `"N/A"` when none.
    #[serde(rename = "Last Active", serialize_with = "serialize_date_or_na")]
    pub last_active: Option<NaiveDate>,
    #[serde(rename = "Unit")]
    pub unit: String,
}

impl InventoryPosition {
    pub fn is_shortage(&self) -> bool {
        self.current_quantity < 0.0
    }
}

/// Distribution of `|current quantity|` across all positions, used as the
/// classification breakpoints of every downstream query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStats {
    pub median: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
}

/// Severity bucket attached to a shortage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShortageLevel {
    Moderate,
    High,
    Critical,
}

/// Size bucket attached to an abundant position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbundanceLevel {
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

/// Priority label shared by recommendations and bottlenecks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Medium,
    High,
    Critical,
}
