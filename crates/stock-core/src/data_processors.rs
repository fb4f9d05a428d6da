use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{debug, warn};

// ── IdentifierNormalizer ──────────────────────────────────────────────────────

/// Canonicalises site, storage-location and material identifiers.
///
/// Spreadsheet exports frequently render numeric codes as floats
/// (`1000.0`), which would otherwise split one plant into two keys.
pub struct IdentifierNormalizer;

fn integral_float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(-?\d+)\.0+$").expect("valid identifier regex"))
}

impl IdentifierNormalizer {
    /// Normalise `raw`, returning `default` when the cell is blank or a
    /// spreadsheet null marker.
    pub fn normalize(raw: Option<&str>, default: &str) -> String {
        let Some(value) = raw.map(str::trim) else {
            return default.to_string();
        };
        if is_null_marker(value) {
            return default.to_string();
        }
        if let Some(caps) = integral_float_re().captures(value) {
            return caps[1].to_string();
        }
        value.to_string()
    }
}

/// `true` for cells that spreadsheet tooling writes for "no value".
fn is_null_marker(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("nat")
        || value.eq_ignore_ascii_case("null")
        || value.eq_ignore_ascii_case("none")
}

/// Trimmed text, or `None` for blank / null-marker cells.
pub fn optional_text(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if is_null_marker(value) {
        None
    } else {
        Some(value.to_string())
    }
}

// ── NumberParser ──────────────────────────────────────────────────────────────

/// Parses the signed decimal columns (`Quantity`, `Amt.in Loc.Cur.`).
pub struct NumberParser;

impl NumberParser {
    /// Parse a numeric cell; blank, unparseable or non-finite values become 0.
    ///
    /// Accepts thousands separators (`1,250.50`) and the SAP trailing-minus
    /// notation (`70-`).
    pub fn parse_or_zero(raw: Option<&str>) -> f64 {
        let Some(value) = raw.map(str::trim) else {
            return 0.0;
        };
        if is_null_marker(value) {
            return 0.0;
        }
        match Self::parse(value) {
            Some(n) => n,
            None => {
                warn!("NumberParser: could not parse number \"{}\", using 0", value);
                0.0
            }
        }
    }

    fn parse(value: &str) -> Option<f64> {
        let cleaned: String = value.chars().filter(|c| *c != ',' && *c != ' ').collect();
        let (negative, digits) = match cleaned.strip_suffix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };
        let n: f64 = digits.parse().ok()?;
        if !n.is_finite() {
            return None;
        }
        Some(if negative { -n } else { n })
    }
}

// ── DateParser ────────────────────────────────────────────────────────────────

/// Parses ledger date columns. Unparseable values map to `None`; the row is
/// kept.
pub struct DateParser;

/// Day zero of spreadsheet serial dates.
fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

impl DateParser {
    pub fn parse(raw: Option<&str>) -> Option<NaiveDateTime> {
        let value = raw?.trim();
        if is_null_marker(value) {
            return None;
        }

        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%d.%m.%Y %H:%M:%S",
            "%m/%d/%Y %H:%M:%S",
        ];
        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%Y/%m/%d"];

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
                return Some(dt);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }
        if let Some(dt) = Self::parse_serial(value) {
            return Some(dt);
        }

        debug!("DateParser: could not parse date \"{}\"", value);
        None
    }

    /// Spreadsheet serial day numbers (days since 1899-12-30), as left behind
    /// when a date column is exported without formatting.
    fn parse_serial(value: &str) -> Option<NaiveDateTime> {
        let days: f64 = value.parse().ok()?;
        // 1 .. 2958465 covers 1899-12-31 .. 9999-12-31.
        if !(1.0..2_958_466.0).contains(&days) {
            return None;
        }
        let whole = days.trunc() as i64;
        let seconds = ((days - days.trunc()) * 86_400.0).round() as i64;
        let date = serial_epoch().checked_add_signed(Duration::days(whole))?;
        date.and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::seconds(seconds))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
