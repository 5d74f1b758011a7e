//! Statistics property-based tests.
//!
//! ## What is covered
//! - Group partitions cover every subject exactly once.
//! - Average ranks always sum to `n (n + 1) / 2`.
//! - Every computed p-value lies in `[0, 1]`.
// crates/groupstat-core/tests/proptest_stats.rs
// ============================================================================
// Module: Statistics Property-Based Tests
// Description: Randomized checks for partitions, ranks, and test outputs.
// Purpose: Ensure statistics stay within their domains without panics.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::cast_precision_loss,
    reason = "Test-only assertions and helpers are permitted."
)]

use groupstat_core::GroupPartition;
use groupstat_core::TestStatistic;
use groupstat_core::stats::nonparametric::kruskal;
use groupstat_core::stats::nonparametric::mann_whitney_u;
use groupstat_core::stats::nonparametric::wilcoxon;
use groupstat_core::stats::normality::shapiro_wilk;
use groupstat_core::stats::parametric::f_oneway;
use groupstat_core::stats::parametric::ttest_ind;
use groupstat_core::stats::rank::average_ranks;
use proptest::prelude::*;

/// Small-integer samples so ties occur often.
fn sample(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((-20_i32 .. 20).prop_map(f64::from), min ..= max)
}

fn p_value_in_range(result: Result<TestStatistic, groupstat_core::StatsError>) -> bool {
    result.map_or(true, |statistic| (0.0 ..= 1.0).contains(&statistic.p_value))
}

proptest! {
    #[test]
    fn partition_covers_every_subject(labels in prop::collection::vec("[a-d]", 1 .. 40)) {
        let partition = GroupPartition::from_labels(&labels);
        let mut members: Vec<usize> =
            partition.groups().iter().flat_map(|group| group.members().to_vec()).collect();
        members.sort_unstable();
        prop_assert_eq!(members, (0 .. labels.len()).collect::<Vec<_>>());
        let sizes = partition.sizes();
        prop_assert_eq!(partition.equal_size(), sizes.iter().all(|size| *size == sizes[0]));
    }

    #[test]
    fn ranks_sum_to_triangular_number(values in sample(1, 60)) {
        let n = values.len() as f64;
        let total: f64 = average_ranks(&values).iter().sum();
        prop_assert!((total - n * (n + 1.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn two_sample_p_values_are_probabilities(left in sample(1, 25), right in sample(1, 25)) {
        prop_assert!(p_value_in_range(mann_whitney_u(&left, &right)));
        prop_assert!(p_value_in_range(ttest_ind(&left, &right)));
        let paired = left.len().min(right.len());
        prop_assert!(p_value_in_range(wilcoxon(&left[.. paired], &right[.. paired])));
    }

    #[test]
    fn k_sample_p_values_are_probabilities(
        groups in prop::collection::vec(sample(1, 12), 2 .. 5)
    ) {
        prop_assert!(p_value_in_range(kruskal(&groups)));
        prop_assert!(p_value_in_range(f_oneway(&groups)));
    }

    #[test]
    fn shapiro_wilk_stays_in_unit_interval(values in sample(3, 60)) {
        if let Ok(result) = shapiro_wilk(&values) {
            prop_assert!((0.0 ..= 1.0).contains(&result.statistic));
            prop_assert!((0.0 ..= 1.0).contains(&result.p_value));
        }
    }
}
