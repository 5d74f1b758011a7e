// crates/groupstat-core/src/lib.rs
// ============================================================================
// Module: groupstat Core Library
// Description: Public API surface for the groupstat analysis pipeline.
// Purpose: Expose table loading, statistics, result assembly, and writers.
// Dependencies: crate::{table, partition, stats, runner, report, writer, pipeline}
// ============================================================================

//! ## Overview
//! groupstat core turns a subject-by-variable CSV table into per-variable
//! group comparisons. The pipeline is a straight line: load and reshape the
//! table, partition subjects by group label, run descriptive statistics and
//! the hypothesis tests the group layout permits, assemble one result grid,
//! and write it back out as delimited text.
//!
//! Inputs are untrusted: malformed tables fail with typed errors and never
//! produce partial output files.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod events;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod stats;
pub mod table;
pub mod timeseries;
pub mod writer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use events::FileEventSink;
pub use events::JsonStderrEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::PipelineEvent;
pub use events::PipelineEventSink;
pub use events::TeeEventSink;
pub use partition::GroupPartition;
pub use partition::GroupSamples;
pub use pipeline::AnalysisMode;
pub use pipeline::BatchReport;
pub use pipeline::PipelineError;
pub use pipeline::PipelineOptions;
pub use pipeline::TimeSeriesBatch;
pub use report::OutputGrid;
pub use report::assemble_report;
pub use runner::AnalysisOptions;
pub use runner::NormalityOutcome;
pub use runner::RunError;
pub use runner::TestKind;
pub use runner::TestOutcome;
pub use runner::VariableResult;
pub use stats::StatsError;
pub use stats::TestStatistic;
pub use table::LoadOptions;
pub use table::SubjectTable;
pub use table::TableError;
pub use timeseries::MedianSeries;
pub use timeseries::TimeSeries;
pub use writer::OutputError;
