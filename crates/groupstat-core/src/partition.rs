// crates/groupstat-core/src/partition.rs
// ============================================================================
// Module: Group Partitioner
// Description: Splits subjects into ordered groups by label.
// Purpose: Expose group sizes, the equal-size flag, and per-group samples.
// Dependencies: crate::table
// ============================================================================

//! ## Overview
//! Groups are ordered by label (lexicographically), matching a group-by over
//! the label column. Members keep subject order so dependent-sample tests
//! pair the i-th subject of each group.
//!
//! ## Invariants
//! - Every subject index appears in exactly one group.
//! - `equal_size` is true iff all groups have identical cardinality.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::table::SubjectTable;
use crate::table::Variable;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A labelled set of subject indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Group label.
    label: String,
    /// Subject indices in input order.
    members: Vec<usize>,
}

impl Group {
    /// Returns the group label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns member subject indices in input order.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }
}

/// Ordered partition of subjects by group label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPartition {
    /// Groups sorted by label.
    groups: Vec<Group>,
}

/// Per-group numeric samples for one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSamples {
    /// Non-missing values per group, in partition order.
    pub values: Vec<Vec<f64>>,
    /// True when any subject had a missing value.
    pub has_missing: bool,
}

impl GroupPartition {
    /// Builds a partition from one label per subject.
    #[must_use]
    pub fn from_labels(labels: &[String]) -> Self {
        let mut by_label: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, label) in labels.iter().enumerate() {
            by_label.entry(label.as_str()).or_default().push(index);
        }
        let groups = by_label
            .into_iter()
            .map(|(label, members)| Group {
                label: label.to_string(),
                members,
            })
            .collect();
        Self {
            groups,
        }
    }

    /// Builds a partition from a table's group row.
    #[must_use]
    pub fn from_table(table: &SubjectTable) -> Self {
        Self::from_labels(table.groups())
    }

    /// Returns the groups in label order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Returns the number of groups.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true when the partition has no groups.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns group cardinalities in label order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.groups.iter().map(|group| group.members.len()).collect()
    }

    /// Returns group labels in order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.label.as_str()).collect()
    }

    /// Returns true iff every group has the same cardinality.
    #[must_use]
    pub fn equal_size(&self) -> bool {
        let mut sizes = self.groups.iter().map(|group| group.members.len());
        sizes.next().is_none_or(|first| sizes.all(|size| size == first))
    }

    /// Extracts per-group non-missing values for a variable.
    #[must_use]
    pub fn samples(&self, variable: &Variable) -> GroupSamples {
        let cells = variable.cells();
        let mut has_missing = false;
        let values = self
            .groups
            .iter()
            .map(|group| {
                group
                    .members
                    .iter()
                    .filter_map(|index| {
                        let value = cells.get(*index).and_then(|cell| cell.value());
                        if value.is_none() {
                            has_missing = true;
                        }
                        value
                    })
                    .collect()
            })
            .collect();
        GroupSamples {
            values,
            has_missing,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
