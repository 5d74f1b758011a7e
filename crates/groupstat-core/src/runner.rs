// crates/groupstat-core/src/runner.rs
// ============================================================================
// Module: Per-Variable Test Runner
// Description: Descriptive statistics and gated hypothesis tests per variable.
// Purpose: Produce one immutable result row per variable.
// Dependencies: crate::{partition, stats, events}
// ============================================================================

//! ## Overview
//! Tests are gated by the number of groups and whether every group has the
//! same size:
//!
//! | Test | Gate |
//! |---|---|
//! | Levene, independent t-test, Mann-Whitney | exactly two groups |
//! | Paired t-test, Wilcoxon | two groups of equal size |
//! | One-way ANOVA | more than two groups |
//! | Kruskal-Wallis | two or more groups |
//! | Friedman | more than two groups of equal size |
//!
//! A gated-out test is [`TestOutcome::NotApplicable`]. A variable with any
//! missing value keeps its descriptive statistics but every applicable test
//! is [`TestOutcome::SkippedMissingData`]. Data that leave a statistic
//! undefined produce [`TestOutcome::Undefined`]; contract violations abort
//! the file with [`RunError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::events::PipelineEvent;
use crate::events::PipelineEventSink;
use crate::partition::GroupPartition;
use crate::stats::StatsError;
use crate::stats::TestStatistic;
use crate::stats::descriptive::Descriptives;
use crate::stats::descriptive::describe;
use crate::stats::nonparametric;
use crate::stats::normality::shapiro_wilk;
use crate::stats::parametric;
use crate::table::SubjectTable;
use crate::table::Variable;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;
/// Default absolute excess-kurtosis threshold.
pub const DEFAULT_KURTOSIS_LIMIT: f64 = 3.0;
/// Default absolute skewness threshold.
pub const DEFAULT_SKEWNESS_LIMIT: f64 = 0.8;

// ============================================================================
// SECTION: Test Kinds
// ============================================================================

/// Hypothesis tests in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Levene's test for equal variances.
    Levene,
    /// Independent two-sample t-test.
    TTestInd,
    /// Mann-Whitney U test.
    MannWhitney,
    /// Paired t-test.
    TTestRel,
    /// Wilcoxon signed-rank test.
    Wilcoxon,
    /// One-way ANOVA.
    Anova,
    /// Kruskal-Wallis H test.
    Kruskal,
    /// Friedman chi-square test.
    Friedman,
}

impl TestKind {
    /// Every test in output column order.
    pub const ALL: [Self; 8] = [
        Self::Levene,
        Self::TTestInd,
        Self::MannWhitney,
        Self::TTestRel,
        Self::Wilcoxon,
        Self::Anova,
        Self::Kruskal,
        Self::Friedman,
    ];

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Levene => "Levene",
            Self::TTestInd => "T-Test Ind.",
            Self::MannWhitney => "Mann-Whitney",
            Self::TTestRel => "T-Test Rel.",
            Self::Wilcoxon => "Wilcoxon",
            Self::Anova => "ANOVA One-Way",
            Self::Kruskal => "Kruskal",
            Self::Friedman => "Friedman",
        }
    }

    /// Returns the header of the statistic column.
    #[must_use]
    pub const fn statistic_column(self) -> &'static str {
        match self {
            Self::Levene => "Levene W",
            Self::TTestInd => "T-Test Ind. t",
            Self::MannWhitney => "Mann-Whitney U",
            Self::TTestRel => "T-Test Rel. t",
            Self::Wilcoxon => "Wilcoxon T",
            Self::Anova => "ANOVA One-Way F",
            Self::Kruskal => "Kruskal H",
            Self::Friedman => "Friedman Chi-Square",
        }
    }

    /// Returns the header of the p-value column.
    #[must_use]
    pub const fn p_value_column(self) -> &'static str {
        match self {
            Self::Levene => "Levene P-value",
            Self::TTestInd => "T-Test Ind. P-value",
            Self::MannWhitney => "Mann-Whitney P-value",
            Self::TTestRel => "T-Test Rel. P-value",
            Self::Wilcoxon => "Wilcoxon P-value",
            Self::Anova => "ANOVA One-Way P-value",
            Self::Kruskal => "Kruskal P-value",
            Self::Friedman => "Friedman P-value",
        }
    }

    /// Returns the interpretation placed under the p-value column.
    #[must_use]
    pub const fn explanation(self) -> &'static str {
        match self {
            Self::Levene => "Variance differs between groups",
            Self::TTestInd => "2 groups independent. Assumes normal dist.",
            Self::MannWhitney => "2 groups independent non-parametric",
            Self::TTestRel => "2 groups dependent. Assumes normal dist. and equal size",
            Self::Wilcoxon => "2 groups dependent non-parametric. Assumes equal size",
            Self::Anova => "3+ groups independent. Assumes normal dist.",
            Self::Kruskal => "2+ groups independent non-parametric",
            Self::Friedman => "3+ groups dependent non-parametric. Assumes equal size",
        }
    }

    /// Returns true when the test applies to `groups` groups.
    #[must_use]
    pub const fn is_applicable(self, groups: usize, equal_size: bool) -> bool {
        match self {
            Self::Levene | Self::TTestInd | Self::MannWhitney => groups == 2,
            Self::TTestRel | Self::Wilcoxon => groups == 2 && equal_size,
            Self::Anova => groups > 2,
            Self::Kruskal => groups >= 2,
            Self::Friedman => groups > 2 && equal_size,
        }
    }

    /// Runs the test over per-group samples.
    fn run(self, samples: &[Vec<f64>]) -> Result<TestStatistic, StatsError> {
        match self {
            Self::Levene => parametric::levene(samples),
            Self::TTestInd => {
                let (left, right) = self.pair(samples)?;
                parametric::ttest_ind(left, right)
            }
            Self::MannWhitney => {
                let (left, right) = self.pair(samples)?;
                nonparametric::mann_whitney_u(left, right)
            }
            Self::TTestRel => {
                let (left, right) = self.pair(samples)?;
                parametric::ttest_rel(left, right)
            }
            Self::Wilcoxon => {
                let (left, right) = self.pair(samples)?;
                nonparametric::wilcoxon(left, right)
            }
            Self::Anova => parametric::f_oneway(samples),
            Self::Kruskal => nonparametric::kruskal(samples),
            Self::Friedman => nonparametric::friedman(samples),
        }
    }

    /// Splits a two-group layout into its samples.
    fn pair(self, samples: &[Vec<f64>]) -> Result<(&[f64], &[f64]), StatsError> {
        match samples {
            [left, right] => Ok((left, right)),
            _ => Err(StatsError::InsufficientData {
                test: self.label(),
                needed: 2,
                given: samples.len(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of one hypothesis test for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    /// Statistic and p-value were computed.
    Computed(TestStatistic),
    /// The group layout does not permit this test.
    NotApplicable,
    /// The variable has missing values.
    SkippedMissingData,
    /// The data leave the statistic undefined.
    Undefined {
        /// Reason the statistic is undefined.
        reason: String,
    },
}

/// Shapiro-Wilk outcome for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NormalityOutcome {
    /// Computed p-value.
    PValue {
        /// Two-sided p-value.
        p_value: f64,
    },
    /// The sample leaves the statistic undefined.
    Undefined {
        /// Reason the statistic is undefined.
        reason: String,
    },
    /// Normality testing is disabled.
    Disabled,
}

/// Descriptive statistics and normality for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Group label.
    pub label: String,
    /// Descriptive statistics over non-missing values.
    pub descriptives: Descriptives,
    /// Shapiro-Wilk outcome.
    pub normality: NormalityOutcome,
}

/// All results for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableResult {
    /// Variable name.
    pub name: String,
    /// Cells holding exactly zero.
    pub zeroes: usize,
    /// Missing cells.
    pub missing: usize,
    /// Per-group summaries in partition order.
    pub groups: Vec<GroupSummary>,
    /// Test outcomes in [`TestKind::ALL`] order.
    pub tests: Vec<(TestKind, TestOutcome)>,
}

impl VariableResult {
    /// Returns the outcome of a test.
    #[must_use]
    pub fn outcome(&self, kind: TestKind) -> Option<&TestOutcome> {
        self.tests.iter().find(|(test, _)| *test == kind).map(|(_, outcome)| outcome)
    }
}

// ============================================================================
// SECTION: Options and Errors
// ============================================================================

/// Analysis thresholds and switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisOptions {
    /// Run Shapiro-Wilk per group.
    pub normality: bool,
    /// Significance level for p-value criteria.
    pub alpha: f64,
    /// Absolute excess-kurtosis criterion.
    pub kurtosis_limit: f64,
    /// Absolute skewness criterion.
    pub skewness_limit: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            normality: true,
            alpha: DEFAULT_ALPHA,
            kurtosis_limit: DEFAULT_KURTOSIS_LIMIT,
            skewness_limit: DEFAULT_SKEWNESS_LIMIT,
        }
    }
}

/// Errors that abort analysis of a file.
#[derive(Debug, Error)]
pub enum RunError {
    /// A statistical routine failed for a reason other than the data.
    #[error("variable `{variable}`: {source}")]
    Statistic {
        /// Variable being analyzed.
        variable: String,
        /// Underlying statistics error.
        #[source]
        source: StatsError,
    },
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Analyzes every variable of a table.
///
/// # Errors
///
/// Returns [`RunError`] when a test fails for a reason other than the data.
pub fn analyze_table(
    table: &SubjectTable,
    partition: &GroupPartition,
    options: &AnalysisOptions,
    sink: &dyn PipelineEventSink,
) -> Result<Vec<VariableResult>, RunError> {
    table
        .variables()
        .iter()
        .map(|variable| analyze_variable(table.source(), variable, partition, options, sink))
        .collect()
}

/// Analyzes one variable.
///
/// # Errors
///
/// Returns [`RunError`] when a test fails for a reason other than the data.
pub fn analyze_variable(
    source: &str,
    variable: &Variable,
    partition: &GroupPartition,
    options: &AnalysisOptions,
    sink: &dyn PipelineEventSink,
) -> Result<VariableResult, RunError> {
    let samples = partition.samples(variable);
    let fatal = |error: StatsError| RunError::Statistic {
        variable: variable.name().to_string(),
        source: error,
    };

    let mut groups = Vec::with_capacity(partition.len());
    for (group, values) in partition.groups().iter().zip(&samples.values) {
        let normality = if options.normality {
            match shapiro_wilk(values) {
                Ok(result) => NormalityOutcome::PValue {
                    p_value: result.p_value,
                },
                Err(err) if err.is_degenerate() => NormalityOutcome::Undefined {
                    reason: err.to_string(),
                },
                Err(err) => return Err(fatal(err)),
            }
        } else {
            NormalityOutcome::Disabled
        };
        groups.push(GroupSummary {
            label: group.label().to_string(),
            descriptives: describe(values),
            normality,
        });
    }

    let missing = variable.missing_count();
    if samples.has_missing {
        sink.record(&PipelineEvent::MissingDataSkipped {
            source: source.to_string(),
            variable: variable.name().to_string(),
            missing,
        });
    }

    let equal_size = partition.equal_size();
    let mut tests = Vec::with_capacity(TestKind::ALL.len());
    for kind in TestKind::ALL {
        let outcome = if !kind.is_applicable(partition.len(), equal_size) {
            TestOutcome::NotApplicable
        } else if samples.has_missing {
            TestOutcome::SkippedMissingData
        } else {
            match kind.run(&samples.values) {
                Ok(statistic) => TestOutcome::Computed(statistic),
                Err(err) if err.is_degenerate() => {
                    let reason = err.to_string();
                    sink.record(&PipelineEvent::TestUndefined {
                        source: source.to_string(),
                        variable: variable.name().to_string(),
                        test: kind.label().to_string(),
                        reason: reason.clone(),
                    });
                    TestOutcome::Undefined {
                        reason,
                    }
                }
                Err(err) => return Err(fatal(err)),
            }
        };
        tests.push((kind, outcome));
    }

    Ok(VariableResult {
        name: variable.name().to_string(),
        zeroes: variable.zero_count(),
        missing,
        groups,
        tests,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
