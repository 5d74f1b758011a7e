// crates/groupstat-core/tests/pipeline.rs
// ============================================================================
// Module: Pipeline Integration Tests
// Description: End-to-end runs from CSV input to dated result files.
// Purpose: Ensure written results agree with direct statistic calls.
// Dependencies: groupstat-core, tempfile
// ============================================================================

//! ## Overview
//! Runs the batch pipeline against fixture files in scratch directories and
//! reads the written grids back.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use groupstat_core::MemoryEventSink;
use groupstat_core::NoopEventSink;
use groupstat_core::PipelineError;
use groupstat_core::PipelineEvent;
use groupstat_core::pipeline::analyze_file;
use groupstat_core::pipeline::run_independent;
use groupstat_core::pipeline::run_timeseries;
use groupstat_core::stats::nonparametric::mann_whitney_u;
use groupstat_core::stats::nonparametric::wilcoxon;

use crate::common::THREE_UNEQUAL_GROUPS;
use crate::common::TWO_EQUAL_GROUPS;
use crate::common::WITH_MISSING;
use crate::common::column;
use crate::common::options;
use crate::common::read_rows;
use crate::common::row;
use crate::common::write_input;

// ============================================================================
// SECTION: Independent Mode
// ============================================================================

#[test]
fn two_equal_groups_match_direct_test_calls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path(), "trial.csv", TWO_EQUAL_GROUPS);
    let output = analyze_file(&input, &options(dir.path()), &NoopEventSink).expect("analyze");
    assert_eq!(output, dir.path().join("trial_results_15-01-2024.csv"));

    let rows = read_rows(&output);
    let response = row(&rows, "response");
    let control = [4.1, 5.3, 3.8, 6.2, 4.9];
    let treated = [7.4, 8.1, 6.9, 9.3, 7.7];

    let expected_mw = mann_whitney_u(&control, &treated).expect("mwu").p_value;
    let written_mw: f64 = response[column(&rows, "Mann-Whitney P-value")].parse().expect("number");
    assert!((written_mw - expected_mw).abs() < 1e-9);

    let expected_w = wilcoxon(&control, &treated).expect("wilcoxon").p_value;
    let written_w: f64 = response[column(&rows, "Wilcoxon P-value")].parse().expect("number");
    assert!((written_w - expected_w).abs() < 1e-9);

    assert_eq!(response[column(&rows, "Median - control")], "4.9");
    assert_eq!(response[column(&rows, "Median - treated")], "7.7");
    assert_eq!(response[column(&rows, "Friedman P-value")], "not applicable");
}

#[test]
fn three_unequal_groups_skip_friedman_and_compute_kruskal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path(), "sizes.csv", THREE_UNEQUAL_GROUPS);
    let output = analyze_file(&input, &options(dir.path()), &NoopEventSink).expect("analyze");
    let rows = read_rows(&output);
    let friedman = column(&rows, "Friedman P-value");
    let kruskal = column(&rows, "Kruskal P-value");
    let mann_whitney = column(&rows, "Mann-Whitney P-value");
    for name in ["weight", "height", "score"] {
        let variable = row(&rows, name);
        assert_eq!(variable[friedman], "not applicable");
        assert_eq!(variable[mann_whitney], "not applicable");
        let p: f64 = variable[kruskal].parse().expect("kruskal p-value");
        assert!((0.0 ..= 1.0).contains(&p));
    }
    // Group, Percentage, Criteria Count, Total Count, then one row per variable.
    assert_eq!(rows.len(), 1 + 4 + 3);
}

#[test]
fn missing_values_skip_tests_and_emit_event() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path(), "gaps.csv", WITH_MISSING);
    let sink = MemoryEventSink::new();
    let output = analyze_file(&input, &options(dir.path()), &sink).expect("analyze");
    let rows = read_rows(&output);
    let gappy = row(&rows, "gappy");
    assert_eq!(gappy[column(&rows, "Mann-Whitney P-value")], "skipped due to missing data");
    assert_eq!(gappy[column(&rows, "Median - x")], "2");
    assert_eq!(gappy[column(&rows, "NaNs")], "1");
    let clean = row(&rows, "clean");
    assert_ne!(clean[column(&rows, "Mann-Whitney P-value")], "skipped due to missing data");
    assert!(sink.events().iter().any(|event| matches!(
        event,
        PipelineEvent::MissingDataSkipped { variable, missing: 1, .. } if variable == "gappy"
    )));
}

#[test]
fn original_cells_round_trip_through_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(dir.path(), "gaps.csv", WITH_MISSING);
    let output = analyze_file(&input, &options(dir.path()), &NoopEventSink).expect("analyze");
    let rows = read_rows(&output);
    let first_subject = column(&rows, "p1");
    assert_eq!(&rows[0][first_subject ..], ["p1", "p2", "p3", "p4", "p5", "p6"]);
    assert_eq!(&row(&rows, "gappy")[first_subject ..], ["1", "NA", "3", "4", "5", "6"]);
    assert_eq!(&row(&rows, "Group")[first_subject ..], ["x", "x", "x", "y", "y", "y"]);
}

#[test]
fn batch_continues_past_malformed_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = write_input(dir.path(), "good.csv", TWO_EQUAL_GROUPS);
    let bad = write_input(dir.path(), "bad.csv", "Person,p1\nvalue,oops\n");
    let sink = MemoryEventSink::new();
    let report = run_independent(&[bad.clone(), good], &options(dir.path()), &sink);
    assert!(!report.is_success());
    assert_eq!(report.outputs.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], PipelineError::Table { .. }));
    assert!(!dir.path().join("bad_results_15-01-2024.csv").exists());
    assert!(sink.events().iter().any(|event| matches!(
        event,
        PipelineEvent::FileFailed { path, .. } if path == &bad.display().to_string()
    )));
}

// ============================================================================
// SECTION: Time-Series Mode
// ============================================================================

#[test]
fn timeseries_writes_one_combined_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = write_input(dir.path(), "t1.csv", WITH_MISSING);
    let second = write_input(dir.path(), "t2.csv", WITH_MISSING);
    let batch = run_timeseries(&[first, second], &options(dir.path()), &NoopEventSink);
    assert!(batch.report.is_success());
    assert_eq!(batch.tables.len(), 2);
    assert_eq!(batch.report.outputs, vec![dir.path().join("results-15-01-2024.csv")]);
    let rows = read_rows(&batch.report.outputs[0]);
    assert_eq!(rows[0][1], "Median - t1-x");
    assert_eq!(row(&rows, "clean")[column(&rows, "Median - t2-y")], "5");
}

#[test]
fn timeseries_without_tables_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.csv");
    let batch = run_timeseries(&[missing], &options(dir.path()), &NoopEventSink);
    assert!(batch.tables.is_empty());
    assert!(matches!(batch.report.failures.last(), Some(PipelineError::NoTables)));
    assert!(batch.report.outputs.is_empty());
}
