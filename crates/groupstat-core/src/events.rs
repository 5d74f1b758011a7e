// crates/groupstat-core/src/events.rs
// ============================================================================
// Module: Pipeline Events
// Description: Structured diagnostics emitted while a batch is processed.
// Purpose: Report progress and data-quality notices without a logging stack.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The pipeline never writes to the console itself. Every notice (file
//! loaded, tests skipped for missing data, output written) is a
//! [`PipelineEvent`] handed to a [`PipelineEventSink`], so callers choose
//! whether events become human-readable lines, JSON lines, or nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Diagnostic event emitted by the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// An input file is about to be read.
    FileLoading {
        /// Input path.
        path: String,
    },
    /// An input table was parsed.
    TableLoaded {
        /// Source label.
        source: String,
        /// Number of subjects.
        subjects: usize,
        /// Number of variables.
        variables: usize,
    },
    /// Subjects were partitioned into groups.
    GroupsPartitioned {
        /// Source label.
        source: String,
        /// Group labels in order.
        labels: Vec<String>,
        /// Group sizes in order.
        sizes: Vec<usize>,
        /// True when every group has the same size.
        equal_size: bool,
    },
    /// Tests were skipped for a variable with missing values.
    MissingDataSkipped {
        /// Source label.
        source: String,
        /// Variable name.
        variable: String,
        /// Number of missing cells.
        missing: usize,
    },
    /// A statistic was undefined for the data.
    TestUndefined {
        /// Source label.
        source: String,
        /// Variable name.
        variable: String,
        /// Test label.
        test: String,
        /// Reason the statistic is undefined.
        reason: String,
    },
    /// A result file was written.
    OutputWritten {
        /// Output path.
        path: String,
    },
    /// An input file failed and was skipped.
    FileFailed {
        /// Input path.
        path: String,
        /// Failure description.
        error: String,
    },
    /// A chart was written.
    PlotWritten {
        /// Chart path.
        path: String,
    },
}

/// Event with a capture timestamp, as serialized by JSON sinks.
#[derive(Debug, Serialize)]
struct TimestampedEvent<'a> {
    /// Milliseconds since the Unix epoch.
    timestamp_ms: u128,
    /// Event payload.
    #[serde(flatten)]
    event: &'a PipelineEvent,
}

impl<'a> TimestampedEvent<'a> {
    /// Stamps an event with the current time.
    fn now(event: &'a PipelineEvent) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis());
        Self {
            timestamp_ms,
            event,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Destination for pipeline events.
pub trait PipelineEventSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: &PipelineEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink that logs JSON lines to stderr.
pub struct JsonStderrEventSink;

impl PipelineEventSink for JsonStderrEventSink {
    fn record(&self, event: &PipelineEvent) {
        if let Ok(payload) = serde_json::to_string(&TimestampedEvent::now(event)) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl PipelineEventSink for FileEventSink {
    fn record(&self, event: &PipelineEvent) {
        if let Ok(payload) = serde_json::to_string(&TimestampedEvent::now(event))
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<PipelineEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl PipelineEventSink for MemoryEventSink {
    fn record(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Sink that fans events out to several sinks.
pub struct TeeEventSink<'a> {
    /// Downstream sinks.
    sinks: Vec<&'a dyn PipelineEventSink>,
}

impl<'a> TeeEventSink<'a> {
    /// Creates a sink that forwards to every sink in order.
    #[must_use]
    pub const fn new(sinks: Vec<&'a dyn PipelineEventSink>) -> Self {
        Self {
            sinks,
        }
    }
}

impl PipelineEventSink for TeeEventSink<'_> {
    fn record(&self, event: &PipelineEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

/// No-op sink.
pub struct NoopEventSink;

impl PipelineEventSink for NoopEventSink {
    fn record(&self, _event: &PipelineEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, reason = "Unit tests use expect for setup clarity.")]

    use super::FileEventSink;
    use super::MemoryEventSink;
    use super::PipelineEvent;
    use super::PipelineEventSink;
    use super::TeeEventSink;
    use super::TimestampedEvent;

    fn written(path: &str) -> PipelineEvent {
        PipelineEvent::OutputWritten {
            path: path.to_string(),
        }
    }

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let value = serde_json::to_value(TimestampedEvent::now(&written("a.csv")))
            .expect("serialize event");
        assert_eq!(value["event"], "output_written");
        assert_eq!(value["path"], "a.csv");
        assert!(value["timestamp_ms"].is_u64());
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryEventSink::new();
        sink.record(&written("a.csv"));
        sink.record(&written("b.csv"));
        assert_eq!(sink.events(), vec![written("a.csv"), written("b.csv")]);
    }

    #[test]
    fn tee_sink_forwards_to_every_sink() {
        let first = MemoryEventSink::new();
        let second = MemoryEventSink::new();
        let tee = TeeEventSink::new(vec![&first, &second]);
        tee.record(&written("a.csv"));
        assert_eq!(first.events().len(), 1);
        assert_eq!(second.events().len(), 1);
    }

    #[test]
    fn file_sink_appends_json_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.jsonl");
        let sink = FileEventSink::new(&path).expect("open sink");
        sink.record(&written("a.csv"));
        sink.record(&written("b.csv"));
        let text = std::fs::read_to_string(&path).expect("read log");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"path\":\"b.csv\""));
    }
}
