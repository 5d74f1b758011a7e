// crates/groupstat-core/src/stats/rank.rs
// ============================================================================
// Module: Ranking
// Description: Average ranks and tie terms for rank-based tests.
// Purpose: Shared ranking primitives for the nonparametric tests.
// Dependencies: crate::stats
// ============================================================================

//! ## Overview
//! Ranks are one-based; tied values share the mean of the ranks they span.
//! The tie term is the sum of `t^3 - t` over every tie block of size `t`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use super::count_f64;

// ============================================================================
// SECTION: Functions
// ============================================================================

/// Assigns one-based average ranks, preserving input order.
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0 .. values.len()).collect();
    order.sort_by(|left, right| values[*left].total_cmp(&values[*right]));
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let end = tie_block_end(values, &order, start);
        // Positions start..end hold ranks start+1..=end.
        let rank = f64::midpoint(count_f64(start + 1), count_f64(end));
        for index in &order[start .. end] {
            ranks[*index] = rank;
        }
        start = end;
    }
    ranks
}

/// Sums `t^3 - t` over tie blocks.
#[must_use]
pub fn tie_term(values: &[f64]) -> f64 {
    tie_sizes(values).into_iter().map(|size| count_f64(size).powi(3) - count_f64(size)).sum()
}

/// Returns the size of every tie block with more than one member.
#[must_use]
pub fn tie_sizes(values: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let order: Vec<usize> = (0 .. sorted.len()).collect();
    let mut sizes = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let end = tie_block_end(&sorted, &order, start);
        if end - start > 1 {
            sizes.push(end - start);
        }
        start = end;
    }
    sizes
}

/// Returns true when any two values are equal.
#[must_use]
pub fn has_ties(values: &[f64]) -> bool {
    !tie_sizes(values).is_empty()
}

/// Finds the exclusive end of the tie block beginning at `start`.
fn tie_block_end(values: &[f64], order: &[usize], start: usize) -> usize {
    let anchor = values[order[start]];
    let mut end = start + 1;
    while end < order.len()
        && values[order[end]].partial_cmp(&anchor) == Some(Ordering::Equal)
    {
        end += 1;
    }
    end
}
