// crates/groupstat-plot/tests/plot_output.rs
// ============================================================================
// Module: Plot Output Tests
// Description: Renders median charts for a two-point time series.
// Purpose: Ensure one SVG per variable lands in the plot directory.
// ============================================================================

//! ## Overview
//! Builds a combined series from in-memory tables and checks the written
//! SVG files and emitted events.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use groupstat_core::LoadOptions;
use groupstat_core::MemoryEventSink;
use groupstat_core::NoopEventSink;
use groupstat_core::PipelineEvent;
use groupstat_core::SubjectTable;
use groupstat_core::TimeSeries;
use groupstat_plot::PlotError;
use groupstat_plot::PlotOptions;
use groupstat_plot::plot_medians;
use groupstat_plot::render_variable;

fn tables() -> Vec<SubjectTable> {
    let header = "Person,p1,p2,p3,p4\nGroup,ctl,ctl,trt,trt\n";
    let first = format!("{header}heart rate,60,64,70,74\nmass,5,6,7,8\n");
    let second = format!("{header}heart rate,61,63,80,84\nmass,5,7,9,9\n");
    vec![
        SubjectTable::from_bytes(first.as_bytes(), "day1", &LoadOptions::default()).expect("day1"),
        SubjectTable::from_bytes(second.as_bytes(), "day2", &LoadOptions::default())
            .expect("day2"),
    ]
}

#[test]
fn writes_one_svg_per_variable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tables = tables();
    let series = TimeSeries::combine(&tables);
    let options = PlotOptions {
        directory: dir.path().join("fig"),
        ..PlotOptions::default()
    };
    let sink = MemoryEventSink::new();
    let written = plot_medians(&series, &options, &sink).expect("plot");
    assert_eq!(written, vec![
        dir.path().join("fig").join("heart_rate.svg"),
        dir.path().join("fig").join("mass.svg"),
    ]);
    for path in &written {
        let svg = std::fs::read_to_string(path).expect("read svg");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("ctl"));
        assert!(svg.contains("trt"));
    }
    let plotted = sink
        .events()
        .iter()
        .filter(|event| matches!(event, PipelineEvent::PlotWritten { .. }))
        .count();
    assert_eq!(plotted, 2);
}

#[test]
fn render_uses_requested_size() {
    let tables = tables();
    let series = TimeSeries::combine(&tables);
    let options = PlotOptions {
        width: 320,
        height: 240,
        ..PlotOptions::default()
    };
    let svg = render_variable(&series, "mass", &options).expect("render");
    assert!(svg.contains("width=\"320\""));
    assert!(svg.contains("height=\"240\""));
}

#[test]
fn empty_series_is_rejected() {
    let tables: Vec<SubjectTable> = Vec::new();
    let series = TimeSeries::combine(&tables);
    let result = plot_medians(&series, &PlotOptions::default(), &NoopEventSink);
    assert!(matches!(result, Err(PlotError::NoSources)));
}
