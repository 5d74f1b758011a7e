// crates/groupstat-core/src/report.rs
// ============================================================================
// Module: Result Assembler
// Description: Builds the output grid from per-variable results.
// Purpose: Lay out results, summary rows, and the original cells.
// Dependencies: crate::{runner, table, partition}
// ============================================================================

//! ## Overview
//! The grid header is the identifier field name, the result columns, then
//! the subject identifiers. Rows are the group row (column explanations and
//! group labels), the `Percentage`, `Criteria Count` and `Total Count`
//! summary rows, then one row per variable with the original cells appended
//! unchanged.
//!
//! Numbers use the shortest representation that parses back to the same
//! value; undefined numbers are written as `NaN`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::partition::GroupPartition;
use crate::runner::AnalysisOptions;
use crate::runner::NormalityOutcome;
use crate::runner::TestKind;
use crate::runner::TestOutcome;
use crate::runner::VariableResult;
use crate::stats::TestStatistic;
use crate::stats::count_f64;
use crate::stats::descriptive::Descriptives;
use crate::table::SubjectTable;

// ============================================================================
// SECTION: Markers
// ============================================================================

/// Cell text for a test the group layout does not permit.
pub const NOT_APPLICABLE: &str = "not applicable";
/// Cell text for a test skipped because of missing values.
pub const SKIPPED_MISSING_DATA: &str = "skipped due to missing data";
/// Cell text for a disabled normality test.
pub const SKIPPED: &str = "skipped";
/// Cell text for an undefined number.
pub const UNDEFINED: &str = "NaN";

/// Label of the percentage summary row.
pub const PERCENTAGE_ROW: &str = "Percentage";
/// Label of the criteria-count summary row.
pub const CRITERIA_COUNT_ROW: &str = "Criteria Count";
/// Label of the total-count summary row.
pub const TOTAL_COUNT_ROW: &str = "Total Count";

// ============================================================================
// SECTION: Grid
// ============================================================================

/// Rectangular table of output cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputGrid {
    /// Header cells.
    header: Vec<String>,
    /// Body rows; every row has the header's width.
    rows: Vec<Vec<String>>,
}

impl OutputGrid {
    /// Creates a grid from a header and rows.
    #[must_use]
    pub const fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            header,
            rows,
        }
    }

    /// Returns the header cells.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Returns the body rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Finds a column by header text.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|cell| cell == name)
    }

    /// Finds a row by its first cell.
    #[must_use]
    pub fn row(&self, label: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.first().is_some_and(|cell| cell == label))
            .map(Vec::as_slice)
    }

    /// Looks up a cell by row label and column header.
    #[must_use]
    pub fn cell(&self, row: &str, column: &str) -> Option<&str> {
        let index = self.column(column)?;
        self.row(row)?.get(index).map(String::as_str)
    }
}

// ============================================================================
// SECTION: Columns
// ============================================================================

/// One result column of the grid.
#[derive(Debug, Clone, Copy)]
enum ResultColumn {
    /// Count of zero cells.
    Zeroes,
    /// Count of missing cells.
    Missing,
    /// Median of group `n`.
    Median(usize),
    /// Excess kurtosis of group `n`.
    Kurtosis(usize),
    /// Skewness of group `n`.
    Skewness(usize),
    /// Shapiro-Wilk p-value of group `n`.
    Shapiro(usize),
    /// Variance of group `n`.
    Variance(usize),
    /// Test statistic.
    Statistic(TestKind),
    /// Test p-value.
    PValue(TestKind),
}

impl ResultColumn {
    /// Lists result columns in output order for `groups` groups.
    fn layout(groups: usize) -> Vec<Self> {
        let mut columns = vec![Self::Zeroes, Self::Missing];
        let per_group: [fn(usize) -> Self; 5] =
            [Self::Median, Self::Kurtosis, Self::Skewness, Self::Shapiro, Self::Variance];
        for per_group in per_group {
            columns.extend((0 .. groups).map(per_group));
        }
        for kind in TestKind::ALL {
            columns.push(Self::Statistic(kind));
            columns.push(Self::PValue(kind));
        }
        columns
    }

    /// Header text.
    fn header(self, labels: &[&str]) -> String {
        let label = |index: usize| labels.get(index).copied().unwrap_or_default();
        match self {
            Self::Zeroes => "Zeroes".to_string(),
            Self::Missing => "NaNs".to_string(),
            Self::Median(group) => format!("Median - {}", label(group)),
            Self::Kurtosis(group) => format!("Kurtosis - {}", label(group)),
            Self::Skewness(group) => format!("Skewness - {}", label(group)),
            Self::Shapiro(group) => format!("Shapiro Norm - {}", label(group)),
            Self::Variance(group) => format!("Variance - {}", label(group)),
            Self::Statistic(kind) => kind.statistic_column().to_string(),
            Self::PValue(kind) => kind.p_value_column().to_string(),
        }
    }

    /// Interpretation text for the group row.
    fn explanation(self, options: &AnalysisOptions) -> String {
        match self {
            Self::Zeroes => "Possible errors".to_string(),
            Self::Missing => "Not A Number, possible errors".to_string(),
            Self::Median(_) => String::new(),
            Self::Kurtosis(_) => {
                let limit = options.kurtosis_limit;
                format!("Not normal when <-{limit} or >{limit}")
            }
            Self::Skewness(_) => {
                let limit = options.skewness_limit;
                format!("Not normal when <-{limit} or >{limit}")
            }
            Self::Shapiro(_) => format!("Not normal when <{}", options.alpha),
            Self::Variance(_) => "The spread from the average".to_string(),
            Self::Statistic(_) => "Test statistic".to_string(),
            Self::PValue(kind) => format!("{}. Criteria <{}", kind.explanation(), options.alpha),
        }
    }

    /// Cell text for one variable.
    fn cell(self, result: &VariableResult) -> String {
        match self {
            Self::Zeroes => result.zeroes.to_string(),
            Self::Missing => result.missing.to_string(),
            Self::Median(group) => descriptive(result, group, |stats| stats.median),
            Self::Kurtosis(group) => descriptive(result, group, |stats| stats.kurtosis),
            Self::Skewness(group) => descriptive(result, group, |stats| stats.skewness),
            Self::Variance(group) => descriptive(result, group, |stats| stats.variance),
            Self::Shapiro(group) => match result.groups.get(group).map(|item| &item.normality) {
                Some(NormalityOutcome::PValue {
                    p_value,
                }) => format_number(*p_value),
                Some(NormalityOutcome::Disabled) => SKIPPED.to_string(),
                Some(NormalityOutcome::Undefined { .. }) | None => UNDEFINED.to_string(),
            },
            Self::Statistic(kind) => test_cell(result, kind, |statistic| statistic.statistic),
            Self::PValue(kind) => test_cell(result, kind, |statistic| statistic.p_value),
        }
    }

    /// True when the column carries a criterion.
    const fn has_criterion(self) -> bool {
        !matches!(self, Self::Median(_) | Self::Variance(_) | Self::Statistic(_))
    }

    /// Whether a variable meets the column criterion.
    fn meets(self, result: &VariableResult, options: &AnalysisOptions) -> bool {
        let stat = |group: usize, pick: fn(&Descriptives) -> f64| {
            result.groups.get(group).map_or(f64::NAN, |summary| pick(&summary.descriptives))
        };
        match self {
            Self::Zeroes => result.zeroes != 0,
            Self::Missing => result.missing != 0,
            Self::Kurtosis(group) => {
                stat(group, |stats| stats.kurtosis).abs() > options.kurtosis_limit
            }
            Self::Skewness(group) => {
                stat(group, |stats| stats.skewness).abs() > options.skewness_limit
            }
            Self::Shapiro(group) => matches!(
                result.groups.get(group).map(|summary| &summary.normality),
                Some(NormalityOutcome::PValue { p_value }) if *p_value < options.alpha
            ),
            Self::PValue(kind) => matches!(
                result.outcome(kind),
                Some(TestOutcome::Computed(statistic)) if statistic.p_value < options.alpha
            ),
            Self::Median(_) | Self::Variance(_) | Self::Statistic(_) => false,
        }
    }
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Builds the output grid for one table.
#[must_use]
pub fn assemble_report(
    table: &SubjectTable,
    partition: &GroupPartition,
    results: &[VariableResult],
    options: &AnalysisOptions,
) -> OutputGrid {
    let labels = partition.labels();
    let columns = ResultColumn::layout(partition.len());

    let mut header = Vec::with_capacity(1 + columns.len() + table.subjects().len());
    header.push(table.id_column().to_string());
    header.extend(columns.iter().map(|column| column.header(&labels)));
    header.extend(table.subjects().iter().cloned());

    let subject_padding = vec![String::new(); table.subjects().len()];
    let total = results.len();
    let counts: Vec<Option<usize>> = columns
        .iter()
        .map(|column| {
            column
                .has_criterion()
                .then(|| results.iter().filter(|result| column.meets(result, options)).count())
        })
        .collect();

    let mut rows = Vec::with_capacity(4 + results.len());

    let mut group_row = vec![table.group_column().to_string()];
    group_row.extend(columns.iter().map(|column| column.explanation(options)));
    group_row.extend(table.groups().iter().cloned());
    rows.push(group_row);

    let mut percentage_row = vec![PERCENTAGE_ROW.to_string()];
    percentage_row.extend(
        counts.iter().map(|count| count.map_or_else(String::new, |count| percentage(count, total))),
    );
    percentage_row.extend(subject_padding.iter().cloned());
    rows.push(percentage_row);

    let mut criteria_row = vec![CRITERIA_COUNT_ROW.to_string()];
    criteria_row.extend(
        counts.iter().map(|count| count.map_or_else(String::new, |count| count.to_string())),
    );
    criteria_row.extend(subject_padding.iter().cloned());
    rows.push(criteria_row);

    let mut total_row = vec![TOTAL_COUNT_ROW.to_string()];
    total_row
        .extend(counts.iter().map(|count| count.map_or_else(String::new, |_| total.to_string())));
    total_row.extend(subject_padding);
    rows.push(total_row);

    for result in results {
        let mut row = vec![result.name.clone()];
        row.extend(columns.iter().map(|column| column.cell(result)));
        if let Some(variable) = table.variable(&result.name) {
            row.extend(variable.cells().iter().map(|cell| cell.raw().to_string()));
        }
        rows.push(row);
    }

    OutputGrid::new(header, rows)
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Formats a number with the shortest round-trip representation.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return UNDEFINED.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-5 .. 1e16).contains(&magnitude) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}

/// Formats `count / total` as a whole percentage.
fn percentage(count: usize, total: usize) -> String {
    if total == 0 {
        return UNDEFINED.to_string();
    }
    let share = count_f64(count) / count_f64(total) * 100.0;
    format!("{share:.0}%")
}

/// Formats one descriptive statistic of a group.
fn descriptive(result: &VariableResult, group: usize, pick: fn(&Descriptives) -> f64) -> String {
    result
        .groups
        .get(group)
        .map_or_else(|| UNDEFINED.to_string(), |summary| format_number(pick(&summary.descriptives)))
}

/// Formats one field of a test outcome.
fn test_cell(
    result: &VariableResult,
    kind: TestKind,
    pick: fn(&TestStatistic) -> f64,
) -> String {
    match result.outcome(kind) {
        Some(TestOutcome::Computed(statistic)) => format_number(pick(statistic)),
        Some(TestOutcome::NotApplicable) | None => NOT_APPLICABLE.to_string(),
        Some(TestOutcome::SkippedMissingData) => SKIPPED_MISSING_DATA.to_string(),
        Some(TestOutcome::Undefined { .. }) => UNDEFINED.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
