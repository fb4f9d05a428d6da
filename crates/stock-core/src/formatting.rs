use chrono::NaiveDate;
use serde::Serializer;

/// Literal written wherever a date is unknown.
pub const NOT_AVAILABLE: &str = "N/A";

/// Round `value` to `decimal_places`, half away from zero.
///
/// # Examples
///
/// ```
/// use stock_core::formatting::round_to;
///
/// assert_eq!(round_to(1234.5678, 2), 1234.57);
/// assert_eq!(round_to(-0.125, 1), -0.1);
/// assert_eq!(round_to(7.0, 2), 7.0);
/// ```
pub fn round_to(value: f64, decimal_places: u32) -> f64 {
    let factor = 10_f64.powi(decimal_places as i32);
    let rounded = (value * factor).round() / factor;
    // Normalise -0.0 so serialised output never shows a signed zero.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round to the two decimals used by every summary figure.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Render a date as `YYYY-MM-DD`, or [`NOT_AVAILABLE`] when absent.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use stock_core::formatting::format_date;
///
/// assert_eq!(format_date(NaiveDate::from_ymd_opt(2025, 7, 1)), "2025-07-01");
/// assert_eq!(format_date(None), "N/A");
/// ```
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `serde` adapter for optional dates that must appear as fixed-format
/// strings or the `"N/A"` sentinel.
pub fn serialize_date_or_na<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_date(*date))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
