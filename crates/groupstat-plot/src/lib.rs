// crates/groupstat-plot/src/lib.rs
// ============================================================================
// Module: groupstat Plot Library
// Description: Median time-series charts rendered as SVG.
// Purpose: Visualize how group medians move across consecutive inputs.
// Dependencies: groupstat-core, plotters
// ============================================================================

//! ## Overview
//! One chart per variable: the x axis is the position of each input in the
//! time series, the y axis is the group median, and every group is one
//! labelled line.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod plot;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use plot::PlotError;
pub use plot::PlotOptions;
pub use plot::plot_file_name;
pub use plot::plot_medians;
pub use plot::render_variable;
