// crates/groupstat-core/src/stats/mod.rs
// ============================================================================
// Module: Statistics
// Description: Descriptive statistics and hypothesis tests over f64 samples.
// Purpose: Compose statrs distributions into the group comparison battery.
// Dependencies: statrs, thiserror
// ============================================================================

//! ## Overview
//! Sampling distributions (normal, Student t, F, chi-squared) come from
//! `statrs`; this module builds test statistics on top of them with the same
//! conventions as the common scientific stacks (two-sided alternatives,
//! tie corrections, median-centred Levene).
//!
//! Samples passed to these functions must not contain NaN; callers filter
//! missing values first.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod descriptive;
pub mod nonparametric;
pub mod normality;
pub mod parametric;
pub mod rank;

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use statrs::distribution::ChiSquared;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::FisherSnedecor;
use statrs::distribution::Normal;
use statrs::distribution::StudentsT;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Statistic and two-sided p-value produced by a hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestStatistic {
    /// Test statistic.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Errors raised by statistical routines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// Too few observations for the test.
    #[error("{test} needs at least {needed} observations, got {given}")]
    InsufficientData {
        /// Test name.
        test: &'static str,
        /// Minimum observations required.
        needed: usize,
        /// Observations available.
        given: usize,
    },
    /// Input has no spread or otherwise leaves the statistic undefined.
    #[error("{test} is undefined: {reason}")]
    Degenerate {
        /// Test name.
        test: &'static str,
        /// Reason the statistic is undefined.
        reason: &'static str,
    },
    /// Paired samples differ in length.
    #[error("{test} requires paired samples of equal length ({left} != {right})")]
    LengthMismatch {
        /// Test name.
        test: &'static str,
        /// Length of the first sample.
        left: usize,
        /// Length of the other sample.
        right: usize,
    },
    /// Distribution could not be constructed.
    #[error("{test} distribution error: {error}")]
    Distribution {
        /// Test name.
        test: &'static str,
        /// Underlying error text.
        error: String,
    },
}

impl StatsError {
    /// Returns true when the error reflects the data rather than a caller bug.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::Degenerate { .. })
    }
}

// ============================================================================
// SECTION: Distribution Helpers
// ============================================================================

/// Upper-tail probability of a standard normal deviate.
pub(crate) fn normal_sf(test: &'static str, z: f64) -> Result<f64, StatsError> {
    let normal = Normal::new(0.0, 1.0).map_err(|err| distribution_error(test, &err))?;
    Ok(normal.sf(z))
}

/// Two-sided p-value of a standard normal deviate.
pub(crate) fn normal_two_sided(test: &'static str, z: f64) -> Result<f64, StatsError> {
    Ok((2.0 * normal_sf(test, z.abs())?).min(1.0))
}

/// Two-sided p-value of a Student t statistic.
pub(crate) fn students_t_two_sided(
    test: &'static str,
    t: f64,
    freedom: f64,
) -> Result<f64, StatsError> {
    let dist = StudentsT::new(0.0, 1.0, freedom).map_err(|err| distribution_error(test, &err))?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

/// Upper-tail probability of an F statistic.
pub(crate) fn fisher_sf(
    test: &'static str,
    f: f64,
    freedom_1: f64,
    freedom_2: f64,
) -> Result<f64, StatsError> {
    let dist =
        FisherSnedecor::new(freedom_1, freedom_2).map_err(|err| distribution_error(test, &err))?;
    Ok(dist.sf(f))
}

/// Upper-tail probability of a chi-squared statistic.
pub(crate) fn chi_squared_sf(
    test: &'static str,
    x: f64,
    freedom: f64,
) -> Result<f64, StatsError> {
    let dist = ChiSquared::new(freedom).map_err(|err| distribution_error(test, &err))?;
    Ok(dist.sf(x))
}

/// Maps a distribution construction error.
fn distribution_error(test: &'static str, error: &dyn std::fmt::Display) -> StatsError {
    StatsError::Distribution {
        test,
        error: error.to_string(),
    }
}

/// Arithmetic mean; NaN for an empty sample.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / count_f64(values.len())
}

/// Converts a count to f64.
#[allow(clippy::cast_precision_loss, reason = "Sample sizes are far below 2^52.")]
pub(crate) fn count_f64(count: usize) -> f64 {
    count as f64
}

// ============================================================================
// SECTION: Tests
// ============================================================================
