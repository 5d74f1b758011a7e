// crates/groupstat-core/src/stats/parametric.rs
// ============================================================================
// Module: Parametric Tests
// Description: Student t-tests, one-way ANOVA, and Levene's test.
// Purpose: Mean and variance comparisons across groups.
// Dependencies: crate::stats
// ============================================================================

//! ## Overview
//! The independent t-test pools variances. Levene's test centres each group
//! on its median (the Brown-Forsythe variant), which is robust to skew.

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::StatsError;
use super::TestStatistic;
use super::count_f64;
use super::descriptive::median;
use super::fisher_sf;
use super::mean;
use super::students_t_two_sided;

// ============================================================================
// SECTION: t-tests
// ============================================================================

/// Two-sample t-test assuming equal variances.
///
/// # Errors
///
/// Returns [`StatsError`] when either sample has fewer than two values or
/// both samples have zero variance.
pub fn ttest_ind(left: &[f64], right: &[f64]) -> Result<TestStatistic, StatsError> {
    const TEST: &str = "independent t-test";
    let smallest = left.len().min(right.len());
    if smallest < 2 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            needed: 2,
            given: smallest,
        });
    }
    let (n1, n2) = (count_f64(left.len()), count_f64(right.len()));
    let freedom = n1 + n2 - 2.0;
    let pooled = (sum_of_squares(left) + sum_of_squares(right)) / freedom;
    let denominator = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    if denominator == 0.0 {
        return Err(StatsError::Degenerate {
            test: TEST,
            reason: "both samples have zero variance",
        });
    }
    let statistic = (mean(left) - mean(right)) / denominator;
    Ok(TestStatistic {
        statistic,
        p_value: students_t_two_sided(TEST, statistic, freedom)?,
    })
}

/// Paired t-test on `left - right`.
///
/// # Errors
///
/// Returns [`StatsError::LengthMismatch`] for unpaired input, otherwise
/// [`StatsError`] when fewer than two pairs exist or every difference is equal.
pub fn ttest_rel(left: &[f64], right: &[f64]) -> Result<TestStatistic, StatsError> {
    const TEST: &str = "paired t-test";
    if left.len() != right.len() {
        return Err(StatsError::LengthMismatch {
            test: TEST,
            left: left.len(),
            right: right.len(),
        });
    }
    if left.len() < 2 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            needed: 2,
            given: left.len(),
        });
    }
    let differences: Vec<f64> = left.iter().zip(right).map(|(a, b)| a - b).collect();
    let n = count_f64(differences.len());
    let variance = sum_of_squares(&differences) / (n - 1.0);
    let denominator = (variance / n).sqrt();
    if denominator == 0.0 {
        return Err(StatsError::Degenerate {
            test: TEST,
            reason: "paired differences have zero variance",
        });
    }
    let statistic = mean(&differences) / denominator;
    Ok(TestStatistic {
        statistic,
        p_value: students_t_two_sided(TEST, statistic, n - 1.0)?,
    })
}

// ============================================================================
// SECTION: Variance Analysis
// ============================================================================

/// One-way analysis of variance; the statistic is F.
///
/// # Errors
///
/// Returns [`StatsError`] for fewer than two groups, an empty group, no
/// residual degrees of freedom, or zero within-group variance.
pub fn f_oneway(groups: &[Vec<f64>]) -> Result<TestStatistic, StatsError> {
    const TEST: &str = "one-way anova";
    let total = check_groups(TEST, groups)?;
    let grand = mean(&groups.concat());
    let between: f64 = groups
        .iter()
        .map(|group| count_f64(group.len()) * (mean(group) - grand).powi(2))
        .sum();
    let within: f64 = groups.iter().map(|group| sum_of_squares(group)).sum();
    if within == 0.0 {
        return Err(StatsError::Degenerate {
            test: TEST,
            reason: "within-group variance is zero",
        });
    }
    let freedom_between = count_f64(groups.len() - 1);
    let freedom_within = count_f64(total - groups.len());
    let statistic = (between / freedom_between) / (within / freedom_within);
    Ok(TestStatistic {
        statistic,
        p_value: fisher_sf(TEST, statistic, freedom_between, freedom_within)?,
    })
}

/// Levene's test for equal variances, centred on group medians.
///
/// # Errors
///
/// Returns [`StatsError`] under the same conditions as [`f_oneway`], or when
/// every deviation from the median is identical within its group.
pub fn levene(groups: &[Vec<f64>]) -> Result<TestStatistic, StatsError> {
    const TEST: &str = "levene";
    let total = check_groups(TEST, groups)?;
    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|group| {
            let center = median(group);
            group.iter().map(|value| (value - center).abs()).collect()
        })
        .collect();
    let group_means: Vec<f64> = deviations.iter().map(|group| mean(group)).collect();
    let grand = deviations
        .iter()
        .zip(&group_means)
        .map(|(group, group_mean)| count_f64(group.len()) * group_mean)
        .sum::<f64>()
        / count_f64(total);
    let numerator: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(group, group_mean)| count_f64(group.len()) * (group_mean - grand).powi(2))
        .sum();
    let denominator: f64 = deviations.iter().map(|group| sum_of_squares(group)).sum();
    if denominator == 0.0 {
        return Err(StatsError::Degenerate {
            test: TEST,
            reason: "absolute deviations have zero variance",
        });
    }
    let k = count_f64(groups.len());
    let n = count_f64(total);
    let statistic = (n - k) / (k - 1.0) * numerator / denominator;
    Ok(TestStatistic {
        statistic,
        p_value: fisher_sf(TEST, statistic, k - 1.0, n - k)?,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Sum of squared deviations from the sample mean.
fn sum_of_squares(values: &[f64]) -> f64 {
    let center = mean(values);
    values.iter().map(|value| (value - center).powi(2)).sum()
}

/// Validates a k-sample layout and returns the total observation count.
fn check_groups(test: &'static str, groups: &[Vec<f64>]) -> Result<usize, StatsError> {
    if groups.len() < 2 {
        return Err(StatsError::InsufficientData {
            test,
            needed: 2,
            given: groups.len(),
        });
    }
    if let Some(empty) = groups.iter().find(|group| group.is_empty()) {
        return Err(StatsError::InsufficientData {
            test,
            needed: 1,
            given: empty.len(),
        });
    }
    let total: usize = groups.iter().map(Vec::len).sum();
    if total <= groups.len() {
        return Err(StatsError::InsufficientData {
            test,
            needed: groups.len() + 1,
            given: total,
        });
    }
    Ok(total)
}
