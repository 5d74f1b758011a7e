// crates/groupstat-core/src/report/tests.rs
// ============================================================================
// Module: Result Assembler Unit Tests
// Description: Layout, summary rows, and number formatting.
// Purpose: Pin the output grid shape consumers depend on.
// Dependencies: groupstat-core report
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::NOT_APPLICABLE;
use super::OutputGrid;
use super::SKIPPED;
use super::SKIPPED_MISSING_DATA;
use super::assemble_report;
use super::format_number;
use crate::events::NoopEventSink;
use crate::partition::GroupPartition;
use crate::runner::AnalysisOptions;
use crate::runner::analyze_table;
use crate::table::LoadOptions;
use crate::table::SubjectTable;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const FIXTURE: &str = "\
Person,s1,s2,s3,s4,s5,s6
Group,ctl,ctl,ctl,trt,trt,trt
alpha,1,2,3,10,11,12
beta,0,2,,4,5,6
gamma,1.5,2.5,3.5,1.5,2.5,3.5
";

fn report(options: &AnalysisOptions) -> OutputGrid {
    let table = SubjectTable::from_bytes(FIXTURE.as_bytes(), "fixture", &LoadOptions::default())
        .expect("fixture table");
    let partition = GroupPartition::from_table(&table);
    let results = analyze_table(&table, &partition, options, &NoopEventSink).expect("analysis");
    assemble_report(&table, &partition, &results, options)
}

// ============================================================================
// SECTION: Layout
// ============================================================================

#[test]
fn header_orders_results_before_subjects() {
    let grid = report(&AnalysisOptions::default());
    let header = grid.header();
    assert_eq!(header[0], "Person");
    assert_eq!(header[1], "Zeroes");
    assert_eq!(header[2], "NaNs");
    assert_eq!(header[3], "Median - ctl");
    assert_eq!(header[4], "Median - trt");
    assert_eq!(header[5], "Kurtosis - ctl");
    assert!(grid.column("Shapiro Norm - trt").is_some());
    assert!(grid.column("Variance - ctl").unwrap() > grid.column("Shapiro Norm - trt").unwrap());
    assert!(grid.column("Mann-Whitney U").unwrap() < grid.column("Mann-Whitney P-value").unwrap());
    assert_eq!(&header[header.len() - 6 ..], ["s1", "s2", "s3", "s4", "s5", "s6"]);
    assert!(grid.rows().iter().all(|row| row.len() == header.len()));
}

#[test]
fn rows_start_with_group_and_summaries() {
    let grid = report(&AnalysisOptions::default());
    let labels: Vec<&str> = grid.rows().iter().map(|row| row[0].as_str()).collect();
    assert_eq!(labels, [
        "Group",
        "Percentage",
        "Criteria Count",
        "Total Count",
        "alpha",
        "beta",
        "gamma"
    ]);
    assert_eq!(grid.cell("Group", "s4"), Some("trt"));
    assert_eq!(grid.cell("Group", "Zeroes"), Some("Possible errors"));
    assert_eq!(grid.cell("Group", "Kurtosis - ctl"), Some("Not normal when <-3 or >3"));
}

#[test]
fn variable_rows_keep_original_cells() {
    let grid = report(&AnalysisOptions::default());
    assert_eq!(grid.cell("beta", "s3"), Some(""));
    assert_eq!(grid.cell("gamma", "s1"), Some("1.5"));
    assert_eq!(grid.cell("alpha", "Median - trt"), Some("11"));
    assert_eq!(grid.cell("beta", "Zeroes"), Some("1"));
    assert_eq!(grid.cell("beta", "NaNs"), Some("1"));
}

#[test]
fn summary_rows_count_criteria() {
    let grid = report(&AnalysisOptions::default());
    assert_eq!(grid.cell("Criteria Count", "Zeroes"), Some("1"));
    assert_eq!(grid.cell("Total Count", "Zeroes"), Some("3"));
    assert_eq!(grid.cell("Percentage", "NaNs"), Some("33%"));
    assert_eq!(grid.cell("Criteria Count", "Median - ctl"), Some(""));
    assert_eq!(grid.cell("Total Count", "s1"), Some(""));
    // alpha separates the groups perfectly: t-test p < 0.05.
    assert_eq!(grid.cell("Criteria Count", "T-Test Ind. P-value"), Some("1"));
}

#[test]
fn markers_replace_uncomputed_tests() {
    let grid = report(&AnalysisOptions::default());
    assert_eq!(grid.cell("alpha", "Friedman P-value"), Some(NOT_APPLICABLE));
    assert_eq!(grid.cell("alpha", "ANOVA One-Way F"), Some(NOT_APPLICABLE));
    assert_eq!(grid.cell("beta", "Mann-Whitney P-value"), Some(SKIPPED_MISSING_DATA));
    assert_eq!(grid.cell("gamma", "Mann-Whitney P-value"), Some("1"));

    let options = AnalysisOptions {
        normality: false,
        ..AnalysisOptions::default()
    };
    let grid = report(&options);
    assert_eq!(grid.cell("alpha", "Shapiro Norm - ctl"), Some(SKIPPED));
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

#[test]
fn numbers_use_shortest_round_trip_text() {
    assert_eq!(format_number(2.5), "2.5");
    assert_eq!(format_number(3.0), "3");
    assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(format_number(1e-99), "1e-99");
    assert_eq!(format_number(f64::NAN), "NaN");
    let value = 0.063_711_249_151_842_14;
    assert_eq!(format_number(value).parse::<f64>().ok(), Some(value));
}
