//! Bucket models for shortage severity and abundance.
//!
//! Each model is built once per query from the threshold statistics. The
//! constructor validates the breakpoints; when they are not strictly
//! ascending the model switches to its documented fallback instead of
//! guessing.

use crate::models::{AbundanceLevel, ShortageLevel, ThresholdStats};

// ── ShortageBands ─────────────────────────────────────────────────────────────

/// Severity bands for negative quantities.
///
/// Intervals are closed on the right: `(-inf, -mean]` is `Critical`,
/// `(-mean, -median]` is `High`, `(-median, 0]` is `Moderate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShortageBands {
    /// `critical_max < high_max < 0` holds.
    Banded { critical_max: f64, high_max: f64 },
    /// The breakpoints collapse or invert; every shortage is `High`.
    Unclassifiable,
}

impl ShortageBands {
    pub fn from_stats(stats: &ThresholdStats) -> Self {
        let critical_max = -stats.mean;
        let high_max = -stats.median;
        if critical_max < high_max && high_max < 0.0 {
            Self::Banded {
                critical_max,
                high_max,
            }
        } else {
            Self::Unclassifiable
        }
    }

    pub fn classify(&self, quantity: f64) -> ShortageLevel {
        match *self {
            Self::Banded {
                critical_max,
                high_max,
            } => {
                if quantity <= critical_max {
                    ShortageLevel::Critical
                } else if quantity <= high_max {
                    ShortageLevel::High
                } else if quantity <= 0.0 {
                    ShortageLevel::Moderate
                } else {
                    // Not a shortage at all; out of range.
                    ShortageLevel::High
                }
            }
            Self::Unclassifiable => ShortageLevel::High,
        }
    }
}

// ── AbundanceBands ────────────────────────────────────────────────────────────

/// Size bands for quantities above an abundance threshold.
#[derive(Debug, Clone, PartialEq)]
pub enum AbundanceBands {
    /// Upper edges of `Moderate` and `High`; everything above is `Very High`.
    Banded { moderate_max: f64, high_max: f64 },
    /// The breakpoints collapse: compare directly against `3 * mean` and
    /// `2 * median`.
    Direct { very_high_above: f64, high_above: f64 },
}

impl AbundanceBands {
    /// Build the bands for items strictly above `threshold` whose largest
    /// quantity is `max_quantity`.
    ///
    /// The breakpoints are `threshold`, `bin2` and `bin3`. Unless all three
    /// are distinct and `max_quantity + 1` lands on neither upper edge, the
    /// model switches to `Direct`.
    pub fn new(threshold: f64, max_quantity: f64, stats: &ThresholdStats) -> Self {
        let bin2 = if stats.median > 0.0 {
            threshold.max(stats.median * 2.0)
        } else {
            threshold * 2.0
        };
        let bin3 = if stats.mean > 0.0 {
            bin2.max(stats.mean * 3.0)
        } else {
            bin2 * 2.0
        };
        let top = max_quantity + 1.0;

        let distinct = threshold != bin2 && bin2 != bin3 && threshold != bin3;
        let collides = top == bin2 || top == bin3;

        let mut edges: Vec<f64> = [bin2, bin3, top]
            .into_iter()
            .filter(|e| *e > threshold)
            .collect();
        edges.sort_by(f64::total_cmp);
        edges.push(f64::INFINITY);

        if distinct && !collides && edges.len() >= 3 {
            Self::Banded {
                moderate_max: edges[0],
                high_max: edges[1],
            }
        } else {
            Self::Direct {
                very_high_above: stats.mean * 3.0,
                high_above: stats.median * 2.0,
            }
        }
    }

    pub fn classify(&self, quantity: f64) -> AbundanceLevel {
        match *self {
            Self::Banded {
                moderate_max,
                high_max,
            } => {
                if quantity <= moderate_max {
                    AbundanceLevel::Moderate
                } else if quantity <= high_max {
                    AbundanceLevel::High
                } else {
                    AbundanceLevel::VeryHigh
                }
            }
            Self::Direct {
                very_high_above,
                high_above,
            } => {
                if quantity > very_high_above {
                    AbundanceLevel::VeryHigh
                } else if quantity > high_above {
                    AbundanceLevel::High
                } else {
                    AbundanceLevel::Moderate
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
