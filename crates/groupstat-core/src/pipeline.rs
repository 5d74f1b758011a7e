// crates/groupstat-core/src/pipeline.rs
// ============================================================================
// Module: Batch Pipeline
// Description: Orchestrates load, analysis, assembly, and writing per file.
// Purpose: Run a batch of inputs with per-file all-or-nothing semantics.
// Dependencies: crate::{table, partition, runner, report, writer, timeseries}
// ============================================================================

//! ## Overview
//! Independent mode analyzes each file on its own and writes one result file
//! per input. Time-series mode treats the inputs as consecutive points in
//! time and writes one combined median file.
//!
//! A failing file is reported through the event sink and recorded in the
//! [`BatchReport`]; the remaining files are still processed. A failed file
//! never leaves an output file behind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::events::PipelineEvent;
use crate::events::PipelineEventSink;
use crate::partition::GroupPartition;
use crate::report::assemble_report;
use crate::runner::AnalysisOptions;
use crate::runner::RunError;
use crate::runner::analyze_table;
use crate::table::LoadOptions;
use crate::table::SubjectTable;
use crate::table::TableError;
use crate::timeseries::TimeSeries;
use crate::writer::OutputError;
use crate::writer::results_file_name;
use crate::writer::timeseries_file_name;
use crate::writer::today;
use crate::writer::write_grid;

// ============================================================================
// SECTION: Types
// ============================================================================

/// How a batch of inputs is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Each file is analyzed on its own.
    #[default]
    Independent,
    /// Files are consecutive measurements of the same subjects.
    TimeSeries,
}

/// Options shared by every file in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Input parsing options.
    pub load: LoadOptions,
    /// Analysis thresholds and switches.
    pub analysis: AnalysisOptions,
    /// Output directory; `None` writes next to each input.
    pub output_dir: Option<PathBuf>,
    /// Date stamped into output names.
    pub date: Date,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            analysis: AnalysisOptions::default(),
            output_dir: None,
            date: today(),
        }
    }
}

/// Errors that fail one input file or a whole batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input table could not be loaded.
    #[error("{path}: {source}")]
    Table {
        /// Input path.
        path: String,
        /// Underlying table error.
        #[source]
        source: TableError,
    },
    /// Analysis aborted.
    #[error("{path}: {source}")]
    Run {
        /// Input path.
        path: String,
        /// Underlying runner error.
        #[source]
        source: RunError,
    },
    /// Output could not be written.
    #[error("{path}: {source}")]
    Output {
        /// Input path whose output failed.
        path: String,
        /// Underlying output error.
        #[source]
        source: OutputError,
    },
    /// No input could be loaded for a time series.
    #[error("no input table could be loaded")]
    NoTables,
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files written, in input order.
    pub outputs: Vec<PathBuf>,
    /// Failures, in input order.
    pub failures: Vec<PipelineError>,
}

impl BatchReport {
    /// Returns true when no file failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of a time-series batch, keeping the loaded tables for plotting.
#[derive(Debug, Default)]
pub struct TimeSeriesBatch {
    /// Tables that loaded, in input order.
    pub tables: Vec<SubjectTable>,
    /// Written files and failures.
    pub report: BatchReport,
}

// ============================================================================
// SECTION: Independent Mode
// ============================================================================

/// Analyzes one file and writes its result grid.
///
/// # Errors
///
/// Returns [`PipelineError`] when loading, analysis, or writing fails.
pub fn analyze_file(
    path: &Path,
    options: &PipelineOptions,
    sink: &dyn PipelineEventSink,
) -> Result<PathBuf, PipelineError> {
    let table = load_table(path, &options.load, sink)?;
    let partition = GroupPartition::from_table(&table);
    sink.record(&PipelineEvent::GroupsPartitioned {
        source: table.source().to_string(),
        labels: partition.labels().iter().map(ToString::to_string).collect(),
        sizes: partition.sizes(),
        equal_size: partition.equal_size(),
    });
    let results = analyze_table(&table, &partition, &options.analysis, sink).map_err(|source| {
        PipelineError::Run {
            path: path.display().to_string(),
            source,
        }
    })?;
    let grid = assemble_report(&table, &partition, &results, &options.analysis);
    let output = results_file_name(path, options.output_dir.as_deref(), options.date)
        .and_then(|output| write_grid(&grid, &output, options.load.delimiter).map(|()| output))
        .map_err(|source| PipelineError::Output {
            path: path.display().to_string(),
            source,
        })?;
    sink.record(&PipelineEvent::OutputWritten {
        path: output.display().to_string(),
    });
    Ok(output)
}

/// Analyzes every file independently, continuing past failures.
#[must_use]
pub fn run_independent(
    paths: &[PathBuf],
    options: &PipelineOptions,
    sink: &dyn PipelineEventSink,
) -> BatchReport {
    let mut report = BatchReport::default();
    for path in paths {
        match analyze_file(path, options, sink) {
            Ok(output) => report.outputs.push(output),
            Err(error) => {
                record_failure(path, &error, sink);
                report.failures.push(error);
            }
        }
    }
    report
}

// ============================================================================
// SECTION: Time-Series Mode
// ============================================================================

/// Loads every file, continuing past failures.
#[must_use]
pub fn load_tables(
    paths: &[PathBuf],
    options: &LoadOptions,
    sink: &dyn PipelineEventSink,
) -> (Vec<SubjectTable>, Vec<PipelineError>) {
    let mut tables = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        match load_table(path, options, sink) {
            Ok(table) => tables.push(table),
            Err(error) => {
                record_failure(path, &error, sink);
                failures.push(error);
            }
        }
    }
    (tables, failures)
}

/// Loads every file and writes the combined median grid.
#[must_use]
pub fn run_timeseries(
    paths: &[PathBuf],
    options: &PipelineOptions,
    sink: &dyn PipelineEventSink,
) -> TimeSeriesBatch {
    let (tables, failures) = load_tables(paths, &options.load, sink);
    let mut report = BatchReport {
        outputs: Vec::new(),
        failures,
    };
    if tables.is_empty() {
        report.failures.push(PipelineError::NoTables);
        return TimeSeriesBatch {
            tables,
            report,
        };
    }

    let grid = TimeSeries::combine(&tables).to_grid();
    let written = timeseries_file_name(options.output_dir.as_deref(), options.date)
        .and_then(|output| write_grid(&grid, &output, options.load.delimiter).map(|()| output));
    match written {
        Ok(output) => {
            sink.record(&PipelineEvent::OutputWritten {
                path: output.display().to_string(),
            });
            report.outputs.push(output);
        }
        Err(source) => {
            let target = options.output_dir.as_deref().unwrap_or_else(|| Path::new("."));
            let error = PipelineError::Output {
                path: target.display().to_string(),
                source,
            };
            record_failure(target, &error, sink);
            report.failures.push(error);
        }
    }
    TimeSeriesBatch {
        tables,
        report,
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads one table and reports progress.
fn load_table(
    path: &Path,
    options: &LoadOptions,
    sink: &dyn PipelineEventSink,
) -> Result<SubjectTable, PipelineError> {
    sink.record(&PipelineEvent::FileLoading {
        path: path.display().to_string(),
    });
    let table = SubjectTable::load(path, options).map_err(|source| PipelineError::Table {
        path: path.display().to_string(),
        source,
    })?;
    sink.record(&PipelineEvent::TableLoaded {
        source: table.source().to_string(),
        subjects: table.subjects().len(),
        variables: table.variables().len(),
    });
    Ok(table)
}

/// Reports a failed file.
fn record_failure(path: &Path, error: &PipelineError, sink: &dyn PipelineEventSink) {
    sink.record(&PipelineEvent::FileFailed {
        path: path.display().to_string(),
        error: error.to_string(),
    });
}
