// crates/groupstat-core/src/stats/nonparametric.rs
// ============================================================================
// Module: Nonparametric Tests
// Description: Mann-Whitney U, Wilcoxon signed-rank, Kruskal-Wallis, Friedman.
// Purpose: Rank-based group comparisons.
// Dependencies: crate::stats
// ============================================================================

//! ## Overview
//! All tests are two-sided. Small untied samples use exact null
//! distributions; everything else uses tie-corrected large-sample
//! approximations.
//!
//! - Mann-Whitney: exact when either sample has at most eight values and no
//!   ties exist, otherwise normal with continuity correction. The statistic
//!   is U of the first sample.
//! - Wilcoxon: zero differences are dropped. Exact for at most fifty pairs
//!   without ties or zeros, otherwise normal without continuity correction.
//!   The statistic is `min(R+, R-)`.
//! - Kruskal-Wallis and Friedman: chi-squared with `k - 1` degrees of freedom.

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::StatsError;
use super::TestStatistic;
use super::chi_squared_sf;
use super::count_f64;
use super::normal_sf;
use super::normal_two_sided;
use super::rank::average_ranks;
use super::rank::has_ties;
use super::rank::tie_sizes;
use super::rank::tie_term;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Largest smaller-sample size that uses the exact Mann-Whitney distribution.
const MANN_WHITNEY_EXACT_LIMIT: usize = 8;
/// Largest pair count that uses the exact Wilcoxon distribution.
const WILCOXON_EXACT_LIMIT: usize = 50;

// ============================================================================
// SECTION: Mann-Whitney U
// ============================================================================

/// Mann-Whitney U test for two independent samples.
///
/// # Errors
///
/// Returns [`StatsError`] when a sample is empty or every value is tied.
pub fn mann_whitney_u(left: &[f64], right: &[f64]) -> Result<TestStatistic, StatsError> {
    const TEST: &str = "mann-whitney u";
    let smallest = left.len().min(right.len());
    if smallest == 0 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            needed: 1,
            given: 0,
        });
    }
    let combined = [left, right].concat();
    let ranks = average_ranks(&combined);
    let (n1, n2) = (count_f64(left.len()), count_f64(right.len()));
    let rank_sum: f64 = ranks[.. left.len()].iter().sum();
    let u1 = rank_sum - n1 * (n1 + 1.0) / 2.0;
    let u2 = n1 * n2 - u1;

    let p_value = if smallest <= MANN_WHITNEY_EXACT_LIMIT && !has_ties(&combined) {
        let pairs = left.len() * right.len();
        let greater = left
            .iter()
            .map(|value| right.iter().filter(|other| value > *other).count())
            .sum::<usize>();
        let upper = greater.max(pairs - greater);
        let distribution = mann_whitney_distribution(left.len(), right.len());
        (2.0 * distribution[upper ..].iter().sum::<f64>()).min(1.0)
    } else {
        let n = n1 + n2;
        let spread =
            (n1 * n2 / 12.0 * ((n + 1.0) - tie_term(&combined) / (n * (n - 1.0)))).sqrt();
        if spread == 0.0 || spread.is_nan() {
            return Err(StatsError::Degenerate {
                test: TEST,
                reason: "all observations are tied",
            });
        }
        let z = (u1.max(u2) - n1 * n2 / 2.0 - 0.5) / spread;
        (2.0 * normal_sf(TEST, z)?).min(1.0)
    };
    Ok(TestStatistic {
        statistic: u1,
        p_value,
    })
}

/// Null probability of every U value for untied samples of the given sizes.
fn mann_whitney_distribution(first: usize, second: usize) -> Vec<f64> {
    let (small, large) = if first <= second { (first, second) } else { (second, first) };
    // counts[j][u]: arrangements of j small-sample values among the values
    // seen so far whose U equals u.
    let mut counts: Vec<Vec<f64>> = vec![vec![1.0]; small + 1];
    for seen in 1 ..= large {
        let mut next: Vec<Vec<f64>> = Vec::with_capacity(small + 1);
        next.push(vec![1.0]);
        for j in 1 ..= small {
            let mut row = vec![0.0; j * seen + 1];
            for (u, count) in counts[j].iter().enumerate() {
                row[u] += count;
            }
            for (u, count) in next[j - 1].iter().enumerate() {
                row[u + seen] += count;
            }
            next.push(row);
        }
        counts = next;
    }
    let mut distribution = counts.pop().unwrap_or_default();
    let total: f64 = distribution.iter().sum();
    for value in &mut distribution {
        *value /= total;
    }
    distribution
}

// ============================================================================
// SECTION: Wilcoxon Signed-Rank
// ============================================================================

/// Wilcoxon signed-rank test on paired samples.
///
/// # Errors
///
/// Returns [`StatsError::LengthMismatch`] for unpaired input and
/// [`StatsError::Degenerate`] when every difference is zero.
pub fn wilcoxon(left: &[f64], right: &[f64]) -> Result<TestStatistic, StatsError> {
    const TEST: &str = "wilcoxon signed-rank";
    if left.len() != right.len() {
        return Err(StatsError::LengthMismatch {
            test: TEST,
            left: left.len(),
            right: right.len(),
        });
    }
    let all: Vec<f64> = left.iter().zip(right).map(|(a, b)| a - b).collect();
    let differences: Vec<f64> = all.iter().copied().filter(|value| *value != 0.0).collect();
    let count = differences.len();
    if count == 0 {
        return Err(StatsError::Degenerate {
            test: TEST,
            reason: "every paired difference is zero",
        });
    }
    let magnitudes: Vec<f64> = differences.iter().map(|value| value.abs()).collect();
    let ranks = average_ranks(&magnitudes);
    let (mut r_plus, mut r_minus) = (0.0, 0.0);
    for (difference, rank) in differences.iter().zip(&ranks) {
        if *difference > 0.0 {
            r_plus += rank;
        } else {
            r_minus += rank;
        }
    }
    let statistic = f64::min(r_plus, r_minus);

    let zeros = all.len() - count;
    let p_value = if count <= WILCOXON_EXACT_LIMIT && zeros == 0 && !has_ties(&magnitudes) {
        // Untied ranks are the integers 1..=count.
        let mut order: Vec<usize> = (0 .. count).collect();
        order.sort_by(|a, b| magnitudes[*a].total_cmp(&magnitudes[*b]));
        let positive: usize = order
            .iter()
            .enumerate()
            .filter(|(_, index)| differences[**index] > 0.0)
            .map(|(position, _)| position + 1)
            .sum();
        let total = count * (count + 1) / 2;
        let smaller = positive.min(total - positive);
        let distribution = signed_rank_distribution(count);
        (2.0 * distribution[..= smaller].iter().sum::<f64>()).min(1.0)
    } else {
        let n = count_f64(count);
        let center = n * (n + 1.0) / 4.0;
        let ties: f64 = tie_sizes(&magnitudes)
            .into_iter()
            .map(|size| {
                let t = count_f64(size);
                t * (t * t - 1.0)
            })
            .sum();
        let spread = ((n * (n + 1.0) * (2.0 * n + 1.0) - 0.5 * ties) / 24.0).sqrt();
        if spread == 0.0 || spread.is_nan() {
            return Err(StatsError::Degenerate {
                test: TEST,
                reason: "signed-rank variance is zero",
            });
        }
        normal_two_sided(TEST, (statistic - center) / spread)?
    };
    Ok(TestStatistic {
        statistic,
        p_value,
    })
}

/// Null probability of every signed-rank sum for `count` untied pairs.
fn signed_rank_distribution(count: usize) -> Vec<f64> {
    let total = count * (count + 1) / 2;
    let mut ways = vec![0.0; total + 1];
    ways[0] = 1.0;
    let mut reachable = 0;
    for rank in 1 ..= count {
        reachable += rank;
        for sum in (rank ..= reachable).rev() {
            ways[sum] += ways[sum - rank];
        }
    }
    let outcomes: f64 = ways.iter().sum();
    for value in &mut ways {
        *value /= outcomes;
    }
    ways
}

// ============================================================================
// SECTION: k-Sample Tests
// ============================================================================

/// Kruskal-Wallis H test for two or more independent samples.
///
/// # Errors
///
/// Returns [`StatsError`] for fewer than two groups, an empty group, or
/// input where every value is tied.
pub fn kruskal(groups: &[Vec<f64>]) -> Result<TestStatistic, StatsError> {
    const TEST: &str = "kruskal-wallis";
    if groups.len() < 2 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            needed: 2,
            given: groups.len(),
        });
    }
    if groups.iter().any(Vec::is_empty) {
        return Err(StatsError::InsufficientData {
            test: TEST,
            needed: 1,
            given: 0,
        });
    }
    let combined = groups.concat();
    let ranks = average_ranks(&combined);
    let n = count_f64(combined.len());
    let correction = 1.0 - tie_term(&combined) / (n.powi(3) - n);
    if correction <= 0.0 {
        return Err(StatsError::Degenerate {
            test: TEST,
            reason: "all observations are tied",
        });
    }
    let mut offset = 0;
    let mut weighted = 0.0;
    for group in groups {
        let rank_sum: f64 = ranks[offset .. offset + group.len()].iter().sum();
        weighted += rank_sum * rank_sum / count_f64(group.len());
        offset += group.len();
    }
    let statistic = (12.0 / (n * (n + 1.0)) * weighted - 3.0 * (n + 1.0)) / correction;
    Ok(TestStatistic {
        statistic,
        p_value: chi_squared_sf(TEST, statistic, count_f64(groups.len() - 1))?,
    })
}

/// Friedman test for three or more matched samples.
///
/// Row `i` pairs the `i`-th value of every group.
///
/// # Errors
///
/// Returns [`StatsError`] for fewer than three groups, groups of different
/// lengths, empty groups, or rows that are entirely tied.
pub fn friedman(groups: &[Vec<f64>]) -> Result<TestStatistic, StatsError> {
    const TEST: &str = "friedman";
    if groups.len() < 3 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            needed: 3,
            given: groups.len(),
        });
    }
    let rows = groups[0].len();
    if let Some(group) = groups.iter().find(|group| group.len() != rows) {
        return Err(StatsError::LengthMismatch {
            test: TEST,
            left: rows,
            right: group.len(),
        });
    }
    if rows == 0 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            needed: 1,
            given: 0,
        });
    }
    let mut column_sums = vec![0.0; groups.len()];
    let mut ties = 0.0;
    for row in 0 .. rows {
        let values: Vec<f64> = groups.iter().map(|group| group[row]).collect();
        for (sum, rank) in column_sums.iter_mut().zip(average_ranks(&values)) {
            *sum += rank;
        }
        ties += tie_term(&values);
    }
    let k = count_f64(groups.len());
    let n = count_f64(rows);
    let correction = 1.0 - ties / (k * (k * k - 1.0) * n);
    if correction <= 0.0 {
        return Err(StatsError::Degenerate {
            test: TEST,
            reason: "every row is fully tied",
        });
    }
    let squares: f64 = column_sums.iter().map(|sum| sum * sum).sum();
    let statistic = (12.0 / (k * n * (k + 1.0)) * squares - 3.0 * n * (k + 1.0)) / correction;
    Ok(TestStatistic {
        statistic,
        p_value: chi_squared_sf(TEST, statistic, k - 1.0)?,
    })
}
