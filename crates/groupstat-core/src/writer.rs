// crates/groupstat-core/src/writer.rs
// ============================================================================
// Module: Result Writer
// Description: Serializes output grids as delimited text.
// Purpose: Name and write dated result files without partial output.
// Dependencies: csv, time, thiserror
// ============================================================================

//! ## Overview
//! A grid is rendered to memory in full and only then written with a single
//! call, so a failure while rendering never leaves a truncated file behind.
//! Same-day reruns overwrite the previous output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use time::Date;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::report::OutputGrid;
use crate::table::source_label;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while writing output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Grid could not be rendered.
    #[error("failed to render results: {0}")]
    Render(String),
    /// Output date could not be formatted.
    #[error("failed to format output date: {0}")]
    Date(String),
    /// Output could not be written.
    #[error("failed to write {path}: {error}")]
    Io {
        /// Output path.
        path: String,
        /// Underlying I/O error text.
        error: String,
    },
}

// ============================================================================
// SECTION: File Names
// ============================================================================

/// Day-first date used in output file names.
const FILE_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]-[month]-[year]");

/// Formats a date as `dd-mm-YYYY`.
///
/// # Errors
///
/// Returns [`OutputError::Date`] when the date cannot be formatted.
pub fn format_date(date: Date) -> Result<String, OutputError> {
    date.format(FILE_DATE_FORMAT).map_err(|err| OutputError::Date(err.to_string()))
}

/// Returns today's local date, or the UTC date when the local offset is unknown.
#[must_use]
pub fn today() -> Date {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()).date()
}

/// Builds `<stem>_results_<date>.csv` in `output_dir`, or next to the input.
///
/// # Errors
///
/// Returns [`OutputError::Date`] when the date cannot be formatted.
pub fn results_file_name(
    input: &Path,
    output_dir: Option<&Path>,
    date: Date,
) -> Result<PathBuf, OutputError> {
    let name = format!("{}_results_{}.csv", source_label(input), format_date(date)?);
    let directory = output_dir.map_or_else(
        || input.parent().map(Path::to_path_buf).unwrap_or_default(),
        Path::to_path_buf,
    );
    Ok(directory.join(name))
}

/// Builds `results-<date>.csv` in `output_dir`, or the working directory.
///
/// # Errors
///
/// Returns [`OutputError::Date`] when the date cannot be formatted.
pub fn timeseries_file_name(
    output_dir: Option<&Path>,
    date: Date,
) -> Result<PathBuf, OutputError> {
    let name = format!("results-{}.csv", format_date(date)?);
    Ok(output_dir.map_or_else(|| PathBuf::from(&name), |directory| directory.join(&name)))
}

// ============================================================================
// SECTION: Writing
// ============================================================================

/// Renders a grid as delimited text.
///
/// # Errors
///
/// Returns [`OutputError::Render`] when the CSV writer fails.
pub fn render_grid(grid: &OutputGrid, delimiter: u8) -> Result<Vec<u8>, OutputError> {
    let render_error = |err: csv::Error| OutputError::Render(err.to_string());
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(Vec::new());
    writer.write_record(grid.header()).map_err(render_error)?;
    for row in grid.rows() {
        writer.write_record(row).map_err(render_error)?;
    }
    writer.into_inner().map_err(|err| OutputError::Render(err.to_string()))
}

/// Renders and writes a grid, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`OutputError`] when rendering or writing fails.
pub fn write_grid(grid: &OutputGrid, path: &Path, delimiter: u8) -> Result<(), OutputError> {
    let bytes = render_grid(grid, delimiter)?;
    let io_error = |err: std::io::Error| OutputError::Io {
        path: path.display().to_string(),
        error: err.to_string(),
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, bytes).map_err(io_error)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
