// crates/groupstat-cli/src/console.rs
// ============================================================================
// Module: Console Event Sink
// Description: Renders pipeline events as human-readable stderr lines.
// Purpose: Give the text log format the same catalog wording as other output.
// Dependencies: groupstat-core
// ============================================================================

//! ## Overview
//! JSON logging reuses the core's JSON-lines sink; this module covers the
//! text format, where each event becomes one catalog message on stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use groupstat_core::PipelineEvent;
use groupstat_core::PipelineEventSink;

use crate::t;

// ============================================================================
// SECTION: Sink
// ============================================================================

/// Sink that writes one text line per event to stderr.
pub struct TextStderrEventSink;

impl PipelineEventSink for TextStderrEventSink {
    fn record(&self, event: &PipelineEvent) {
        let _ = writeln!(std::io::stderr(), "{}", describe_event(event));
    }
}

/// Renders an event as a catalog message.
#[must_use]
pub fn describe_event(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::FileLoading {
            path,
        } => t!("event.file_loading", path = path),
        PipelineEvent::TableLoaded {
            source,
            subjects,
            variables,
        } => t!(
            "event.table_loaded",
            source = source,
            subjects = subjects,
            variables = variables
        ),
        PipelineEvent::GroupsPartitioned {
            source,
            labels,
            sizes,
            equal_size,
        } => {
            let groups = labels
                .iter()
                .zip(sizes)
                .map(|(label, size)| t!("event.group_entry", label = label, size = size))
                .collect::<Vec<_>>()
                .join(", ");
            let sizing =
                if *equal_size { t!("event.groups.equal") } else { t!("event.groups.unequal") };
            t!("event.groups_partitioned", source = source, groups = groups, sizing = sizing)
        }
        PipelineEvent::MissingDataSkipped {
            source,
            variable,
            missing,
        } => t!(
            "event.missing_data_skipped",
            source = source,
            variable = variable,
            missing = missing
        ),
        PipelineEvent::TestUndefined {
            source,
            variable,
            test,
            reason,
        } => t!(
            "event.test_undefined",
            source = source,
            test = test,
            variable = variable,
            reason = reason
        ),
        PipelineEvent::OutputWritten {
            path,
        } => t!("event.output_written", path = path),
        PipelineEvent::FileFailed {
            path,
            error,
        } => t!("event.file_failed", path = path, error = error),
        PipelineEvent::PlotWritten {
            path,
        } => t!("event.plot_written", path = path),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use groupstat_core::PipelineEvent;

    use super::describe_event;

    #[test]
    fn partition_lists_groups_with_sizes() {
        let event = PipelineEvent::GroupsPartitioned {
            source: "trial".to_string(),
            labels: vec!["A".to_string(), "B".to_string()],
            sizes: vec![3, 4],
            equal_size: false,
        };
        assert_eq!(describe_event(&event), "trial: groups A (n=3), B (n=4) (unequal sizes)");
    }

    #[test]
    fn missing_data_names_the_variable() {
        let event = PipelineEvent::MissingDataSkipped {
            source: "trial".to_string(),
            variable: "weight".to_string(),
            missing: 2,
        };
        assert_eq!(
            describe_event(&event),
            "trial: variable weight has 2 missing value(s); tests skipped"
        );
    }

    #[test]
    fn failures_carry_the_error() {
        let event = PipelineEvent::FileFailed {
            path: "bad.csv".to_string(),
            error: "input table is empty".to_string(),
        };
        assert_eq!(describe_event(&event), "Failed to process bad.csv: input table is empty");
    }
}
