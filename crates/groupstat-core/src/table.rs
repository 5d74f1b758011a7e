// crates/groupstat-core/src/table.rs
// ============================================================================
// Module: Subject Table
// Description: Loader and reshaped table model for subject-by-variable CSV.
// Purpose: Parse variable-per-row input into subjects, groups, and variables.
// Dependencies: csv, thiserror
// ============================================================================

//! ## Overview
//! Input files hold one column per subject and one row per variable. The
//! header row names the subjects and carries the identifier field (default
//! `Person`) whose column labels each row; the row labelled with the group
//! field (default `Group`) assigns every subject to a group.
//!
//! ## Invariants
//! - Every subject has exactly one non-empty group label.
//! - Every variable holds exactly one cell per subject.
//! - Numeric cells are finite; missing tokens parse to `None`.
//! - Raw cell text is preserved so tables can be written back unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default subject-identifier field name.
pub const DEFAULT_ID_COLUMN: &str = "Person";
/// Default group field name.
pub const DEFAULT_GROUP_COLUMN: &str = "Group";
/// Default maximum input file size in bytes.
pub const DEFAULT_MAX_FILE_BYTES: usize = 64 * 1024 * 1024;
/// Cell tokens treated as missing values.
const MISSING_TOKENS: &[&str] = &["", "NaN", "nan", "NA", "N/A", "null", "NULL"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading a subject table.
#[derive(Debug, Error)]
pub enum TableError {
    /// File could not be opened or read.
    #[error("failed to read {path}: {error}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error text.
        error: String,
    },
    /// File exceeds the configured size limit.
    #[error("input is {size} bytes which exceeds the limit of {limit} bytes")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
    /// Delimited text could not be parsed.
    #[error("malformed table: {0}")]
    Csv(String),
    /// Input contained no header row.
    #[error("input table is empty")]
    Empty,
    /// Subject-identifier column missing from the header.
    #[error("identifier column `{column}` not found in header")]
    MissingIdColumn {
        /// Expected identifier column name.
        column: String,
    },
    /// Header names no subjects.
    #[error("header contains no subject columns")]
    NoSubjects,
    /// Group row missing from the table.
    #[error("group row `{row}` not found")]
    MissingGroupRow {
        /// Expected group row label.
        row: String,
    },
    /// Group row appears more than once.
    #[error("group row `{row}` appears more than once")]
    DuplicateGroupRow {
        /// Group row label.
        row: String,
    },
    /// A subject has no group label.
    #[error("subject `{subject}` has no group label")]
    EmptyGroupLabel {
        /// Subject without a label.
        subject: String,
    },
    /// A data row has an empty identifier cell.
    #[error("data row {row} has no variable name")]
    MissingVariableName {
        /// One-based data row number.
        row: usize,
    },
    /// A variable name appears more than once.
    #[error("variable `{0}` appears more than once")]
    DuplicateVariable(String),
    /// A cell could not be coerced to a number.
    #[error("non-numeric value `{value}` for variable `{variable}`, subject `{subject}`")]
    NonNumeric {
        /// Variable name.
        variable: String,
        /// Subject identifier.
        subject: String,
        /// Offending cell text.
        value: String,
    },
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Options controlling how an input table is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Header field naming the identifier column.
    pub id_column: String,
    /// Row label carrying group assignments.
    pub group_column: String,
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Maximum accepted file size in bytes.
    pub max_file_bytes: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            id_column: DEFAULT_ID_COLUMN.to_string(),
            group_column: DEFAULT_GROUP_COLUMN.to_string(),
            delimiter: b',',
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Table Types
// ============================================================================

/// A single measurement cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Trimmed source text.
    raw: String,
    /// Parsed value; `None` when missing.
    value: Option<f64>,
}

impl Cell {
    /// Parses a cell, returning `None` when the text is not numeric.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if MISSING_TOKENS.contains(&trimmed) {
            return Some(Self {
                raw: trimmed.to_string(),
                value: None,
            });
        }
        let parsed = trimmed.parse::<f64>().ok()?;
        if parsed.is_nan() {
            return Some(Self {
                raw: trimmed.to_string(),
                value: None,
            });
        }
        if !parsed.is_finite() {
            return None;
        }
        Some(Self {
            raw: trimmed.to_string(),
            value: Some(parsed),
        })
    }

    /// Returns the original cell text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the numeric value, or `None` when missing.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        self.value
    }
}

/// One measured variable across all subjects.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name from the identifier column.
    name: String,
    /// Cells in subject order.
    cells: Vec<Cell>,
}

impl Variable {
    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns cells in subject order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Counts cells holding exactly zero.
    #[must_use]
    pub fn zero_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.value.is_some_and(|value| value == 0.0)).count()
    }

    /// Counts missing cells.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.value.is_none()).count()
    }
}

/// Subject-major view of an input table.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectTable {
    /// Source label (file name without `.csv`).
    source: String,
    /// Identifier field name.
    id_column: String,
    /// Group field name.
    group_column: String,
    /// Subject identifiers in input order.
    subjects: Vec<String>,
    /// Group label per subject.
    groups: Vec<String>,
    /// Variables in input order.
    variables: Vec<Variable>,
    /// Position of each variable in `variables`, keyed by name.
    index: BTreeMap<String, usize>,
}

impl SubjectTable {
    /// Loads a table from disk.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] when the file is unreadable, too large, or malformed.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, TableError> {
        let bytes = read_bytes_with_limit(path, options.max_file_bytes)?;
        Self::from_bytes(&bytes, &source_label(path), options)
    }

    /// Parses a table from in-memory delimited text.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] when the table is malformed.
    pub fn from_bytes(
        bytes: &[u8],
        source: &str,
        options: &LoadOptions,
    ) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(bytes);
        let mut records = reader.records();
        let header = match records.next() {
            Some(record) => record.map_err(|err| TableError::Csv(err.to_string()))?,
            None => return Err(TableError::Empty),
        };
        let id_index =
            header.iter().position(|field| field == options.id_column).ok_or_else(|| {
                TableError::MissingIdColumn {
                    column: options.id_column.clone(),
                }
            })?;
        let subject_columns: Vec<usize> =
            (0 .. header.len()).filter(|index| *index != id_index).collect();
        if subject_columns.is_empty() {
            return Err(TableError::NoSubjects);
        }
        let subjects: Vec<String> = subject_columns
            .iter()
            .map(|index| header.get(*index).unwrap_or_default().to_string())
            .collect();

        let mut groups: Option<Vec<String>> = None;
        let mut variables = Vec::new();
        let mut index = BTreeMap::new();
        for (row, record) in records.enumerate() {
            let record = record.map_err(|err| TableError::Csv(err.to_string()))?;
            let name = record.get(id_index).unwrap_or_default().to_string();
            if name == options.group_column {
                if groups.is_some() {
                    return Err(TableError::DuplicateGroupRow {
                        row: name,
                    });
                }
                let mut labels = Vec::with_capacity(subjects.len());
                for (subject, column) in subjects.iter().zip(&subject_columns) {
                    let label = record.get(*column).unwrap_or_default();
                    if label.is_empty() {
                        return Err(TableError::EmptyGroupLabel {
                            subject: subject.clone(),
                        });
                    }
                    labels.push(label.to_string());
                }
                groups = Some(labels);
                continue;
            }
            if name.is_empty() {
                return Err(TableError::MissingVariableName {
                    row: row + 1,
                });
            }
            if index.contains_key(&name) {
                return Err(TableError::DuplicateVariable(name));
            }
            index.insert(name.clone(), variables.len());
            let mut cells = Vec::with_capacity(subjects.len());
            for (subject, column) in subjects.iter().zip(&subject_columns) {
                let raw = record.get(*column).unwrap_or_default();
                let cell = Cell::parse(raw).ok_or_else(|| TableError::NonNumeric {
                    variable: name.clone(),
                    subject: subject.clone(),
                    value: raw.to_string(),
                })?;
                cells.push(cell);
            }
            variables.push(Variable {
                name,
                cells,
            });
        }

        let groups = groups.ok_or_else(|| TableError::MissingGroupRow {
            row: options.group_column.clone(),
        })?;
        Ok(Self {
            source: source.to_string(),
            id_column: options.id_column.clone(),
            group_column: options.group_column.clone(),
            subjects,
            groups,
            variables,
            index,
        })
    }

    /// Returns the source label.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the identifier field name.
    #[must_use]
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Returns the group field name.
    #[must_use]
    pub fn group_column(&self) -> &str {
        &self.group_column
    }

    /// Returns subject identifiers in input order.
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Returns the group label of every subject.
    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Returns variables in input order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Looks up a variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).and_then(|position| self.variables.get(*position))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Derives the source label from a path by dropping a trailing `.csv`.
#[must_use]
pub fn source_label(path: &Path) -> String {
    let name = path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |name| name.to_string_lossy().into_owned(),
    );
    name.strip_suffix(".csv").map_or_else(|| name.clone(), str::to_string)
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, TableError> {
    let io_error = |err: std::io::Error| TableError::Io {
        path: path.display().to_string(),
        error: err.to_string(),
    };
    let file = File::open(path).map_err(io_error)?;
    let size = file.metadata().map_err(io_error)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(TableError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(io_error)?;
    if bytes.len() > max_bytes {
        return Err(TableError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
