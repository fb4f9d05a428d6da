//! Ledger discovery and loading.
//!
//! Reads the stock movement ledger (a CSV export of the ERP movement list)
//! and converts every row into a normalised [`Transaction`].

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use csv::StringRecord;
use stock_core::data_processors::{optional_text, DateParser, IdentifierNormalizer, NumberParser};
use stock_core::models::{
    Transaction, UNKNOWN_MATERIAL, UNKNOWN_SITE, UNKNOWN_STORAGE_LOCATION,
};
use stock_core::{LedgerError, Result};
use tracing::{debug, info, warn};

// ── Columns ───────────────────────────────────────────────────────────────────

pub const COL_PLANT: &str = "Plant";
pub const COL_STORAGE_LOCATION: &str = "Storage Location";
pub const COL_MATERIAL: &str = "Material";
pub const COL_MATERIAL_DESCRIPTION: &str = "Material Description";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_AMOUNT: &str = "Amt.in Loc.Cur.";
pub const COL_UNIT_OF_ENTRY: &str = "Unit of Entry";
pub const COL_MOVEMENT_TYPE: &str = "Movement Type";
pub const COL_DOCUMENT_DATE: &str = "Document Date";
pub const COL_POSTING_DATE: &str = "Posting Date";
pub const COL_TEXT: &str = "Text";

/// Every column the ledger must carry, in export order.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    COL_PLANT,
    COL_STORAGE_LOCATION,
    COL_MATERIAL,
    COL_MATERIAL_DESCRIPTION,
    COL_QUANTITY,
    COL_AMOUNT,
    COL_UNIT_OF_ENTRY,
    COL_MOVEMENT_TYPE,
    COL_DOCUMENT_DATE,
    COL_POSTING_DATE,
    COL_TEXT,
];

/// Header positions of the required columns.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    plant: usize,
    storage_location: usize,
    material: usize,
    material_description: usize,
    quantity: usize,
    amount: usize,
    unit_of_entry: usize,
    movement_type: usize,
    document_date: usize,
    posting_date: usize,
    text: usize,
}

impl ColumnMap {
    /// Locate every required column, reporting all missing ones at once.
    fn from_headers(headers: &StringRecord, source: &Path) -> Result<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |column: &str| names.iter().position(|n| *n == column);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| find(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::MissingColumns {
                path: source.to_path_buf(),
                columns: missing,
            });
        }

        let idx = |column: &str| find(column).unwrap_or_default();
        Ok(Self {
            plant: idx(COL_PLANT),
            storage_location: idx(COL_STORAGE_LOCATION),
            material: idx(COL_MATERIAL),
            material_description: idx(COL_MATERIAL_DESCRIPTION),
            quantity: idx(COL_QUANTITY),
            amount: idx(COL_AMOUNT),
            unit_of_entry: idx(COL_UNIT_OF_ENTRY),
            movement_type: idx(COL_MOVEMENT_TYPE),
            document_date: idx(COL_DOCUMENT_DATE),
            posting_date: idx(COL_POSTING_DATE),
            text: idx(COL_TEXT),
        })
    }

    fn to_transaction(self, record: &StringRecord) -> Transaction {
        let cell = |i: usize| record.get(i);
        Transaction {
            site: IdentifierNormalizer::normalize(cell(self.plant), UNKNOWN_SITE),
            storage_location: IdentifierNormalizer::normalize(
                cell(self.storage_location),
                UNKNOWN_STORAGE_LOCATION,
            ),
            material: IdentifierNormalizer::normalize(cell(self.material), UNKNOWN_MATERIAL),
            material_description: optional_text(cell(self.material_description))
                .unwrap_or_default(),
            quantity: NumberParser::parse_or_zero(cell(self.quantity)),
            amount: NumberParser::parse_or_zero(cell(self.amount)),
            unit_of_entry: optional_text(cell(self.unit_of_entry)),
            movement_type: IdentifierNormalizer::normalize(cell(self.movement_type), ""),
            document_date: DateParser::parse(cell(self.document_date)),
            posting_date: DateParser::parse(cell(self.posting_date)),
            text: optional_text(cell(self.text)),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `dir`, sorted by path.
pub fn find_ledger_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Data path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// The most recently modified ledger under `dir`; ties resolve to the
/// last path in sort order.
pub fn latest_ledger_file(dir: &Path) -> Result<PathBuf> {
    find_ledger_files(dir)
        .into_iter()
        .map(|path| {
            let modified = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .max()
        .map(|(_, path)| path)
        .ok_or_else(|| LedgerError::NoLedgerFiles(dir.to_path_buf()))
}

/// Load and normalise every row of the ledger at `path`.
pub fn load_ledger(path: &Path) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path).map_err(|source| LedgerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let transactions = read_ledger(file, path)?;
    info!(
        "Loaded {} transactions from {}",
        transactions.len(),
        path.display()
    );
    Ok(transactions)
}

/// Parse ledger CSV from any reader. `source` is only used in errors.
pub fn read_ledger<R: Read>(reader: R, source: &Path) -> Result<Vec<Transaction>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| malformed(&e, 1))?
        .clone();
    let columns = ColumnMap::from_headers(&headers, source)?;

    let mut transactions = Vec::new();
    let mut undated = 0usize;
    for (row, result) in csv_reader.records().enumerate() {
        // Header is line 1.
        let record = result.map_err(|e| malformed(&e, row as u64 + 2))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let tx = columns.to_transaction(&record);
        if tx.posting_date.is_none() {
            undated += 1;
        }
        transactions.push(tx);
    }

    debug!(
        "{}: {} rows parsed, {} without posting date",
        source.display(),
        transactions.len(),
        undated
    );

    Ok(transactions)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn malformed(err: &csv::Error, fallback_line: u64) -> LedgerError {
    let line = err
        .position()
        .map(|p| p.line())
        .unwrap_or(fallback_line);
    LedgerError::MalformedRecord {
        line,
        message: err.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
