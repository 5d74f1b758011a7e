// crates/groupstat-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures for groupstat-core integration tests.
// Purpose: Write input tables to scratch directories and read results back.
// Dependencies: groupstat-core, tempfile, time
// ============================================================================

//! ## Overview
//! Provides fixture tables and helpers for pipeline integration tests.

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
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::Path;
use std::path::PathBuf;

use groupstat_core::PipelineOptions;
use time::Date;
use time::Month;

/// Two equal groups of five subjects with one clean variable.
pub const TWO_EQUAL_GROUPS: &str = "\
Person,p1,p2,p3,p4,p5,p6,p7,p8,p9,p10
Group,control,control,control,control,control,treated,treated,treated,treated,treated
response,4.1,5.3,3.8,6.2,4.9,7.4,8.1,6.9,9.3,7.7
";

/// Three groups of unequal size.
pub const THREE_UNEQUAL_GROUPS: &str = "\
Person,a1,a2,a3,b1,b2,b3,b4,c1,c2
Group,A,A,A,B,B,B,B,C,C
weight,10,12,11,20,22,19,21,30,31
height,1.1,1.3,1.2,1.8,1.7,1.9,1.6,2.2,2.0
score,5,3,4,2,8,6,7,9,1
";

/// Two groups where one variable has a missing cell.
pub const WITH_MISSING: &str = "\
Person,p1,p2,p3,p4,p5,p6
Group,x,x,x,y,y,y
clean,1,2,3,4,5,6
gappy,1,NA,3,4,5,6
";

/// Fixed output date.
pub fn fixed_date() -> Date {
    Date::from_calendar_date(2024, Month::January, 15).expect("valid date")
}

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

/// Pipeline options writing into `dir` with a fixed date.
pub fn options(dir: &Path) -> PipelineOptions {
    PipelineOptions {
        output_dir: Some(dir.to_path_buf()),
        date: fixed_date(),
        ..PipelineOptions::default()
    }
}

/// Reads a CSV file into rows of fields.
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("open output");
    reader
        .records()
        .map(|record| record.expect("record").iter().map(ToString::to_string).collect())
        .collect()
}

/// Finds a column index by header name.
pub fn column(rows: &[Vec<String>], name: &str) -> usize {
    rows[0].iter().position(|cell| cell == name).unwrap_or_else(|| panic!("missing column {name}"))
}

/// Finds a row by its first cell.
pub fn row<'a>(rows: &'a [Vec<String>], label: &str) -> &'a [String] {
    rows.iter()
        .find(|row| row[0] == label)
        .unwrap_or_else(|| panic!("missing row {label}"))
}
