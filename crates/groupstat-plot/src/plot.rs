// crates/groupstat-plot/src/plot.rs
// ============================================================================
// Module: Median Plots
// Description: Renders per-group median lines for each variable as SVG.
// Purpose: Write one chart per variable of a combined time series.
// Dependencies: groupstat-core, plotters, thiserror
// ============================================================================

//! ## Overview
//! Charts are rendered into memory and written with a single call, so a
//! failed render never leaves a truncated SVG behind. File names are derived
//! from variable names with every character outside `[A-Za-z0-9._-]`
//! replaced; names that collide after replacement get a numeric suffix.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use groupstat_core::PipelineEvent;
use groupstat_core::PipelineEventSink;
use groupstat_core::TimeSeries;
use plotters::prelude::*;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default plot directory.
pub const DEFAULT_PLOT_DIRECTORY: &str = "fig";

/// Line colors, cycled when there are more groups than entries.
const PALETTE: [RGBColor; 8] = [
    RGBColor(0, 114, 178),
    RGBColor(230, 159, 0),
    RGBColor(0, 158, 115),
    RGBColor(213, 94, 0),
    RGBColor(86, 180, 233),
    RGBColor(204, 121, 167),
    RGBColor(240, 228, 66),
    RGBColor(0, 0, 0),
];

/// Relative padding added around the data range on both axes.
const AXIS_PADDING: f64 = 0.05;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Plot output options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotOptions {
    /// Directory receiving SVG files; created when absent.
    pub directory: PathBuf,
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_PLOT_DIRECTORY),
            width: 800,
            height: 600,
        }
    }
}

/// Errors raised while plotting.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Nothing to plot.
    #[error("no input table could be loaded for plotting")]
    NoSources,
    /// Chart drawing failed.
    #[error("failed to render plot for `{variable}`: {error}")]
    Render {
        /// Variable being plotted.
        variable: String,
        /// Backend error text.
        error: String,
    },
    /// Plot directory or file could not be written.
    #[error("failed to write {path}: {error}")]
    Io {
        /// Path being written.
        path: String,
        /// Underlying I/O error text.
        error: String,
    },
}

// ============================================================================
// SECTION: Plotting
// ============================================================================

/// Writes one SVG per variable of the series into the plot directory.
///
/// # Errors
///
/// Returns [`PlotError`] when the series is empty or a chart cannot be
/// rendered or written. Charts written before the failure are kept.
pub fn plot_medians(
    series: &TimeSeries<'_>,
    options: &PlotOptions,
    sink: &dyn PipelineEventSink,
) -> Result<Vec<PathBuf>, PlotError> {
    if series.is_empty() {
        return Err(PlotError::NoSources);
    }
    fs::create_dir_all(&options.directory).map_err(|err| PlotError::Io {
        path: options.directory.display().to_string(),
        error: err.to_string(),
    })?;

    let mut used = BTreeSet::new();
    let mut written = Vec::with_capacity(series.variables().len());
    for variable in series.variables() {
        let svg = render_variable(series, variable, options)?;
        let stem = unique_stem(&sanitize(variable), &mut used);
        let path = options.directory.join(format!("{stem}.svg"));
        fs::write(&path, svg).map_err(|err| PlotError::Io {
            path: path.display().to_string(),
            error: err.to_string(),
        })?;
        sink.record(&PipelineEvent::PlotWritten {
            path: path.display().to_string(),
        });
        written.push(path);
    }
    Ok(written)
}

/// Returns the SVG path for a variable, before collision handling.
#[must_use]
pub fn plot_file_name(directory: &Path, variable: &str) -> PathBuf {
    directory.join(format!("{}.svg", sanitize(variable)))
}

/// Renders the median chart of one variable as an SVG document.
///
/// # Errors
///
/// Returns [`PlotError::Render`] when the backend fails.
pub fn render_variable(
    series: &TimeSeries<'_>,
    variable: &str,
    options: &PlotOptions,
) -> Result<String, PlotError> {
    let mut svg = String::new();
    draw_chart(&mut svg, series, variable, options).map_err(|error| PlotError::Render {
        variable: variable.to_string(),
        error,
    })?;
    Ok(svg)
}

/// Draws the chart into `buffer`.
fn draw_chart(
    buffer: &mut String,
    series: &TimeSeries<'_>,
    variable: &str,
    options: &PlotOptions,
) -> Result<(), String> {
    let lines = series.series(variable);
    let sources = series.sources();
    let root = SVGBackend::with_string(buffer, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|err| err.to_string())?;

    let last = index_f64(sources.len().saturating_sub(1));
    let (x_lo, x_hi) = expand_range(0.0, last);
    let (y_min, y_max) = lines
        .iter()
        .flat_map(|line| line.points.iter().map(|(_, value)| *value))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
            (lo.min(value), hi.max(value))
        });
    let (y_lo, y_hi) = if y_min.is_finite() { expand_range(y_min, y_max) } else { (-1.0, 1.0) };

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Median {variable}"), ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo .. x_hi, y_lo .. y_hi)
        .map_err(|err| err.to_string())?;

    let source_label = |value: &f64| {
        sources
            .iter()
            .enumerate()
            .find(|(index, _)| (index_f64(*index) - *value).abs() < 1e-9)
            .map_or_else(String::new, |(_, source)| (*source).to_string())
    };
    chart
        .configure_mesh()
        .x_labels(sources.len())
        .x_label_formatter(&source_label)
        .x_desc("Input")
        .y_desc("Median")
        .draw()
        .map_err(|err| err.to_string())?;

    for (position, line) in lines.iter().enumerate() {
        let color = PALETTE[position % PALETTE.len()];
        let points: Vec<(f64, f64)> =
            line.points.iter().map(|(index, value)| (index_f64(*index), *value)).collect();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(|err| err.to_string())?
            .label(line.group.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        chart
            .draw_series(points.iter().map(|point| Circle::new(*point, 3, color.filled())))
            .map_err(|err| err.to_string())?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|err| err.to_string())?;
    root.present().map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Pads a range so points do not sit on the border.
fn expand_range(min: f64, max: f64) -> (f64, f64) {
    if (max - min).abs() < 1e-9 {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * AXIS_PADDING;
    (min - pad, max + pad)
}

/// Converts a source index to a chart coordinate.
fn index_f64(index: usize) -> f64 {
    u32::try_from(index).map_or(f64::from(u32::MAX), f64::from)
}

/// Replaces characters that are unsafe in file names.
fn sanitize(variable: &str) -> String {
    let cleaned: String = variable
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') { ch } else { '_' }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|ch| ch == '.') {
        "variable".to_string()
    } else {
        cleaned
    }
}

/// Appends `_2`, `_3`, ... until the stem is unused, then claims it.
fn unique_stem(stem: &str, used: &mut BTreeSet<String>) -> String {
    let mut candidate = stem.to_string();
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{stem}_{suffix}");
        suffix += 1;
    }
    used.insert(candidate.clone());
    candidate
}

// ============================================================================
// SECTION: Tests
// ============================================================================
