// crates/groupstat-core/src/stats/normality.rs
// ============================================================================
// Module: Normality
// Description: Shapiro-Wilk W test backed by the `normality` crate.
// Purpose: Per-group normality p-values for the result grid.
// Dependencies: normality
// ============================================================================

//! ## Overview
//! Thin adapter over [`normality::shapiro_wilk`], which implements Royston's
//! AS R94 algorithm. Sample-size limits are checked up front so the library
//! only sees inputs it supports; its remaining failures become
//! [`StatsError::Degenerate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use normality::Error as NormalityError;

use super::StatsError;
use super::TestStatistic;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Test name used in errors.
const TEST: &str = "shapiro-wilk";
/// Smallest supported sample.
const MIN_OBSERVATIONS: usize = 3;
/// Largest sample the approximation is valid for.
const MAX_OBSERVATIONS: usize = 5000;

// ============================================================================
// SECTION: Shapiro-Wilk
// ============================================================================

/// Runs the Shapiro-Wilk test; the statistic is W.
///
/// # Errors
///
/// Returns [`StatsError::InsufficientData`] below three observations and
/// [`StatsError::Degenerate`] above 5000 observations, for non-finite input,
/// or when every value is identical.
pub fn shapiro_wilk(values: &[f64]) -> Result<TestStatistic, StatsError> {
    let n = values.len();
    if n < MIN_OBSERVATIONS {
        return Err(StatsError::InsufficientData {
            test: TEST,
            needed: MIN_OBSERVATIONS,
            given: n,
        });
    }
    if n > MAX_OBSERVATIONS {
        return Err(StatsError::Degenerate {
            test: TEST,
            reason: "sample exceeds 5000 observations",
        });
    }
    if values.iter().any(|value| !value.is_finite()) {
        return Err(StatsError::Degenerate {
            test: TEST,
            reason: "sample contains non-finite values",
        });
    }

    let result = normality::shapiro_wilk(values.iter().copied()).map_err(convert_error)?;
    Ok(TestStatistic {
        statistic: result.statistic,
        p_value: result.p_value,
    })
}

/// Maps library failures onto the shared error type.
fn convert_error(error: NormalityError) -> StatsError {
    match error {
        NormalityError::InsufficientSampleSize {
            given,
            needed,
        } => StatsError::InsufficientData {
            test: TEST,
            needed,
            given,
        },
        NormalityError::ZeroRange => StatsError::Degenerate {
            test: TEST,
            reason: "all values are identical",
        },
        _ => StatsError::Degenerate {
            test: TEST,
            reason: "normality computation failed",
        },
    }
}
