// crates/groupstat-core/src/stats/descriptive.rs
// ============================================================================
// Module: Descriptive Statistics
// Description: Median, sample variance, skewness, and excess kurtosis.
// Purpose: Summarize a single group sample.
// Dependencies: crate::stats
// ============================================================================

//! ## Overview
//! Skewness is the adjusted Fisher-Pearson coefficient and kurtosis is the
//! bias-adjusted excess kurtosis. Undefined results are NaN: variance needs
//! two observations, skewness three, kurtosis four. A sample with no spread
//! has zero skewness and kurtosis.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use super::count_f64;
use super::mean;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Moment sums below this magnitude are treated as floating-point noise.
const MOMENT_EPSILON: f64 = 1e-14;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Descriptive statistics for one group sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Descriptives {
    /// Number of non-missing observations.
    pub count: usize,
    /// Median.
    pub median: f64,
    /// Sample variance (n - 1 denominator).
    pub variance: f64,
    /// Adjusted Fisher-Pearson skewness.
    pub skewness: f64,
    /// Bias-adjusted excess kurtosis.
    pub kurtosis: f64,
}

// ============================================================================
// SECTION: Functions
// ============================================================================

/// Computes all descriptive statistics for a sample.
#[must_use]
pub fn describe(values: &[f64]) -> Descriptives {
    Descriptives {
        count: values.len(),
        median: median(values),
        variance: variance(values),
        skewness: skewness(values),
        kurtosis: kurtosis(values),
    }
}

/// Median; NaN for an empty sample.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        f64::midpoint(sorted[mid - 1], sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Sample variance with an n - 1 denominator.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let center = mean(values);
    let squares: f64 = values.iter().map(|value| (value - center).powi(2)).sum();
    squares / count_f64(values.len() - 1)
}

/// Adjusted Fisher-Pearson skewness.
#[must_use]
pub fn skewness(values: &[f64]) -> f64 {
    if values.len() < 3 {
        return f64::NAN;
    }
    let n = count_f64(values.len());
    let center = mean(values);
    let m2 = zero_noise(values.iter().map(|value| (value - center).powi(2)).sum());
    let m3 = zero_noise(values.iter().map(|value| (value - center).powi(3)).sum());
    if m2 == 0.0 {
        return 0.0;
    }
    (n * (n - 1.0).sqrt() / (n - 2.0)) * (m3 / m2.powf(1.5))
}

/// Bias-adjusted excess kurtosis.
#[must_use]
pub fn kurtosis(values: &[f64]) -> f64 {
    if values.len() < 4 {
        return f64::NAN;
    }
    let n = count_f64(values.len());
    let center = mean(values);
    let m2: f64 = values.iter().map(|value| (value - center).powi(2)).sum();
    let m4: f64 = values.iter().map(|value| (value - center).powi(4)).sum();
    let adjustment = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    let numerator = zero_noise(n * (n + 1.0) * (n - 1.0) * m4);
    let denominator = zero_noise((n - 2.0) * (n - 3.0) * m2.powi(2));
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator - adjustment
}

/// Zeroes values indistinguishable from rounding noise.
fn zero_noise(value: f64) -> f64 {
    if value.abs() < MOMENT_EPSILON { 0.0 } else { value }
}
