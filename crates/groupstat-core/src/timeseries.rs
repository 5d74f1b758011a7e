// crates/groupstat-core/src/timeseries.rs
// ============================================================================
// Module: Time-Series Combiner
// Description: Per-source, per-group medians across a sequence of tables.
// Purpose: Build the combined results file and the plotted median series.
// Dependencies: crate::{table, partition, stats, report}
// ============================================================================

//! ## Overview
//! Each input table is one point in time; its position in the input list is
//! the time index. The combined grid has one `Median - <source>-<group>`
//! column per source and group, then every source's original subject
//! columns. Variables are the union over all sources in first-seen order;
//! a variable absent from a source leaves that source's subject cells empty
//! and its medians `NaN`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::iter::repeat_n;

use crate::partition::GroupPartition;
use crate::report::OutputGrid;
use crate::report::UNDEFINED;
use crate::report::format_number;
use crate::stats::descriptive::median;
use crate::table::DEFAULT_GROUP_COLUMN;
use crate::table::DEFAULT_ID_COLUMN;
use crate::table::SubjectTable;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Medians of one group over time.
#[derive(Debug, Clone, PartialEq)]
pub struct MedianSeries {
    /// Group label.
    pub group: String,
    /// `(source index, median)` pairs with finite medians.
    pub points: Vec<(usize, f64)>,
}

/// Group medians of one source table.
#[derive(Debug, Clone, PartialEq)]
struct SourceMedians {
    /// Source label.
    source: String,
    /// Group labels in partition order.
    groups: Vec<String>,
    /// Per-variable medians in group order.
    medians: BTreeMap<String, Vec<f64>>,
}

/// Combined view over a sequence of tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<'a> {
    /// Input tables in time order.
    tables: &'a [SubjectTable],
    /// Medians per source, aligned with `tables`.
    sources: Vec<SourceMedians>,
    /// Union of variable names in first-seen order.
    variables: Vec<String>,
}

// ============================================================================
// SECTION: Combination
// ============================================================================

impl<'a> TimeSeries<'a> {
    /// Computes group medians for every table.
    #[must_use]
    pub fn combine(tables: &'a [SubjectTable]) -> Self {
        let mut variables: Vec<String> = Vec::new();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let sources = tables
            .iter()
            .map(|table| {
                let partition = GroupPartition::from_table(table);
                let medians = table
                    .variables()
                    .iter()
                    .map(|variable| {
                        if seen.insert(variable.name()) {
                            variables.push(variable.name().to_string());
                        }
                        let samples = partition.samples(variable);
                        let medians = samples.values.iter().map(|values| median(values));
                        (variable.name().to_string(), medians.collect())
                    })
                    .collect();
                SourceMedians {
                    source: table.source().to_string(),
                    groups: partition.labels().iter().map(ToString::to_string).collect(),
                    medians,
                }
            })
            .collect();
        Self {
            tables,
            sources,
            variables,
        }
    }

    /// Returns variable names in first-seen order.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Returns the number of sources.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true when no sources were combined.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns source labels in time order.
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.source.as_str()).collect()
    }

    /// Returns one median series per group for a variable.
    ///
    /// Groups appear in first-seen order across sources; a source without
    /// the group or the variable contributes no point.
    #[must_use]
    pub fn series(&self, variable: &str) -> Vec<MedianSeries> {
        let mut series: Vec<MedianSeries> = Vec::new();
        for (index, source) in self.sources.iter().enumerate() {
            let medians = source.medians.get(variable);
            for (position, group) in source.groups.iter().enumerate() {
                let value = medians.and_then(|values| values.get(position)).copied();
                let existing = series.iter().position(|item| &item.group == group);
                let slot = if let Some(found) = existing {
                    found
                } else {
                    series.push(MedianSeries {
                        group: group.clone(),
                        points: Vec::new(),
                    });
                    series.len() - 1
                };
                if let Some(value) = value.filter(|value| value.is_finite()) {
                    series[slot].points.push((index, value));
                }
            }
        }
        series
    }

    // ========================================================================
    // SECTION: Grid
    // ========================================================================

    /// Builds the combined results grid.
    #[must_use]
    pub fn to_grid(&self) -> OutputGrid {
        let id_column = self.tables.first().map_or(DEFAULT_ID_COLUMN, SubjectTable::id_column);
        let group_label =
            self.tables.first().map_or(DEFAULT_GROUP_COLUMN, SubjectTable::group_column);

        let mut header = vec![id_column.to_string()];
        for source in &self.sources {
            header.extend(
                source.groups.iter().map(|group| format!("Median - {}-{group}", source.source)),
            );
        }
        for table in self.tables {
            header.extend(table.subjects().iter().cloned());
        }

        let median_columns: usize = self.sources.iter().map(|source| source.groups.len()).sum();
        let mut group_row = vec![group_label.to_string()];
        group_row.extend(repeat_n(String::new(), median_columns));
        for table in self.tables {
            group_row.extend(table.groups().iter().cloned());
        }

        let mut rows = vec![group_row];
        for name in &self.variables {
            let mut row = vec![name.clone()];
            for source in &self.sources {
                match source.medians.get(name) {
                    Some(medians) => row.extend(medians.iter().map(|value| format_number(*value))),
                    None => row.extend(repeat_n(UNDEFINED.to_string(), source.groups.len())),
                }
            }
            for table in self.tables {
                match table.variable(name) {
                    Some(variable) => {
                        row.extend(variable.cells().iter().map(|cell| cell.raw().to_string()));
                    }
                    None => row.extend(repeat_n(String::new(), table.subjects().len())),
                }
            }
            rows.push(row);
        }
        OutputGrid::new(header, rows)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
