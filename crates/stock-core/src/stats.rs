//! Distribution helpers shared by the inventory queries.
//!
//! Every threshold in the engine is derived from these functions, so the
//! interpolation rule is pinned here: linear interpolation between order
//! statistics with rank `p / 100 * (n - 1)` (the "type 7" estimator).

use crate::models::ThresholdStats;

// ── Percentile helper ─────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using linear
/// interpolation. `p` is clamped to `0..=100`.
///
/// Returns `None` for an empty slice: no data means no threshold.
pub fn percentile(sorted_data: &[f64], p: f64) -> Option<f64> {
    if sorted_data.is_empty() {
        return None;
    }
    let len = sorted_data.len();
    if len == 1 {
        return Some(sorted_data[0]);
    }
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
    let rank = (p / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted_data[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo]))
}

/// Percentile of an unsorted sample.
pub fn percentile_of(values: impl IntoIterator<Item = f64>, p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    sorted.sort_by(f64::total_cmp);
    percentile(&sorted, p)
}

/// Median (50th percentile) of a sorted slice.
pub fn median(sorted_data: &[f64]) -> Option<f64> {
    percentile(sorted_data, 50.0)
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample standard deviation (n - 1 denominator), `None` below two samples.
pub fn sample_std_dev(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data)?;
    let sum_sq: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    Some((sum_sq / (data.len() as f64 - 1.0)).sqrt())
}

impl ThresholdStats {
    /// Statistics over the absolute values of `quantities`.
    ///
    /// Zero quantities yield all-zero statistics; a single quantity has a
    /// standard deviation of zero.
    pub fn from_quantities(quantities: impl IntoIterator<Item = f64>) -> Self {
        let mut magnitudes: Vec<f64> = quantities.into_iter().map(f64::abs).collect();
        if magnitudes.is_empty() {
            return Self::default();
        }
        magnitudes.sort_by(f64::total_cmp);

        Self {
            median: median(&magnitudes).unwrap_or(0.0),
            mean: mean(&magnitudes).unwrap_or(0.0),
            std_dev: sample_std_dev(&magnitudes).unwrap_or(0.0),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
