// crates/groupstat-config/src/config.rs
// ============================================================================
// Module: groupstat Configuration
// Description: Configuration loading and validation for groupstat.
// Purpose: Provide strict config parsing with hard limits and defaults.
// Dependencies: groupstat-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file is resolved from an explicit path, then the `GROUPSTAT_CONFIG`
//! environment variable, then `groupstat.toml` in the working directory.
//! Only the last of these may be absent, in which case built-in defaults
//! apply. Every loaded config is validated before it is returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use groupstat_core::AnalysisMode;
use groupstat_core::AnalysisOptions;
use groupstat_core::LoadOptions;
use groupstat_core::PipelineOptions;
use groupstat_core::runner::DEFAULT_ALPHA;
use groupstat_core::runner::DEFAULT_KURTOSIS_LIMIT;
use groupstat_core::runner::DEFAULT_SKEWNESS_LIMIT;
use groupstat_core::table::DEFAULT_GROUP_COLUMN;
use groupstat_core::table::DEFAULT_ID_COLUMN;
use groupstat_core::table::DEFAULT_MAX_FILE_BYTES;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "groupstat.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "GROUPSTAT_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of the identifier and group field names.
pub(crate) const MAX_FIELD_NAME_LENGTH: usize = 256;
/// Upper bound for `input.max_file_bytes`.
pub(crate) const MAX_INPUT_FILE_BYTES: usize = 1024 * 1024 * 1024;
/// Smallest accepted plot dimension in pixels.
pub(crate) const MIN_PLOT_DIMENSION: u32 = 100;
/// Largest accepted plot dimension in pixels.
pub(crate) const MAX_PLOT_DIMENSION: u32 = 10_000;
/// Default input file when no files are given.
pub(crate) const DEFAULT_INPUT_FILE: &str = "example.csv";
/// Default plot output directory.
pub(crate) const DEFAULT_PLOT_DIRECTORY: &str = "fig";
/// Default plot width in pixels.
pub(crate) const DEFAULT_PLOT_WIDTH: u32 = 800;
/// Default plot height in pixels.
pub(crate) const DEFAULT_PLOT_HEIGHT: u32 = 600;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// groupstat configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GroupStatConfig {
    /// Input parsing configuration.
    #[serde(default)]
    pub input: InputConfig,
    /// Analysis thresholds and switches.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Result file configuration.
    #[serde(default)]
    pub output: OutputConfig,
    /// Median plot configuration.
    #[serde(default)]
    pub plot: PlotConfig,
    /// Diagnostic output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Path the config was loaded from; `None` for built-in defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl GroupStatConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved.path)?;
        if !resolved.required && !resolved.path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved.path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source = Some(resolved.path);
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.input.validate()?;
        self.analysis.validate()?;
        self.output.validate()?;
        self.plot.validate()?;
        self.logging.validate()
    }

    /// Builds pipeline options from the configured sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the delimiter is invalid.
    pub fn pipeline_options(&self) -> Result<PipelineOptions, ConfigError> {
        Ok(PipelineOptions {
            load: self.input.load_options()?,
            analysis: self.analysis.analysis_options(),
            output_dir: self.output.directory.as_deref().map(PathBuf::from),
            ..PipelineOptions::default()
        })
    }
}

// ============================================================================
// SECTION: Input
// ============================================================================

/// Input parsing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputConfig {
    /// Header field naming the identifier column.
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Row label carrying group assignments.
    #[serde(default = "default_group_column")]
    pub group_column: String,
    /// Single-character field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// File analyzed when no inputs are given.
    #[serde(default = "default_input_file")]
    pub default_file: String,
    /// Maximum accepted input size in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            group_column: default_group_column(),
            delimiter: default_delimiter(),
            default_file: default_input_file(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl InputConfig {
    /// Validates input settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_field_name("input.id_column", &self.id_column)?;
        validate_field_name("input.group_column", &self.group_column)?;
        if self.id_column.trim() == self.group_column.trim() {
            return Err(ConfigError::Invalid(
                "input.id_column and input.group_column must differ".to_string(),
            ));
        }
        self.delimiter_byte()?;
        validate_path_string("input.default_file", &self.default_file)?;
        if self.max_file_bytes == 0 || self.max_file_bytes > MAX_INPUT_FILE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "input.max_file_bytes must be between 1 and {MAX_INPUT_FILE_BYTES}"
            )));
        }
        Ok(())
    }

    /// Returns the delimiter as a byte.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] unless the delimiter is one ASCII
    /// character other than a quote or line break.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() && !matches!(*byte, b'"' | b'\n' | b'\r') => Ok(*byte),
            _ => Err(ConfigError::Invalid(
                "input.delimiter must be a single ascii character".to_string(),
            )),
        }
    }

    /// Builds loader options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the delimiter is invalid.
    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        Ok(LoadOptions {
            id_column: self.id_column.trim().to_string(),
            group_column: self.group_column.trim().to_string(),
            delimiter: self.delimiter_byte()?,
            max_file_bytes: self.max_file_bytes,
        })
    }
}

// ============================================================================
// SECTION: Analysis
// ============================================================================

/// Analysis thresholds and switches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    /// How a batch of inputs is interpreted.
    #[serde(default)]
    pub mode: AnalysisMode,
    /// Significance level for p-value criteria.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Absolute excess-kurtosis criterion.
    #[serde(default = "default_kurtosis_limit")]
    pub kurtosis_limit: f64,
    /// Absolute skewness criterion.
    #[serde(default = "default_skewness_limit")]
    pub skewness_limit: f64,
    /// Run Shapiro-Wilk per group.
    #[serde(default = "default_true")]
    pub normality: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            alpha: default_alpha(),
            kurtosis_limit: default_kurtosis_limit(),
            skewness_limit: default_skewness_limit(),
            normality: true,
        }
    }
}

impl AnalysisConfig {
    /// Validates thresholds.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(ConfigError::Invalid(
                "analysis.alpha must be strictly between 0 and 1".to_string(),
            ));
        }
        validate_limit("analysis.kurtosis_limit", self.kurtosis_limit)?;
        validate_limit("analysis.skewness_limit", self.skewness_limit)
    }

    /// Builds runner options.
    #[must_use]
    pub const fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            normality: self.normality,
            alpha: self.alpha,
            kurtosis_limit: self.kurtosis_limit,
            skewness_limit: self.skewness_limit,
        }
    }
}

// ============================================================================
// SECTION: Output, Plot, Logging
// ============================================================================

/// Result file configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Output directory; results go next to each input when unset.
    #[serde(default)]
    pub directory: Option<String>,
}

impl OutputConfig {
    /// Validates the output directory.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(directory) = &self.directory {
            validate_path_string("output.directory", directory)?;
        }
        Ok(())
    }
}

/// Median plot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlotConfig {
    /// Directory receiving SVG plots.
    #[serde(default = "default_plot_directory")]
    pub directory: String,
    /// Plot width in pixels.
    #[serde(default = "default_plot_width")]
    pub width: u32,
    /// Plot height in pixels.
    #[serde(default = "default_plot_height")]
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            directory: default_plot_directory(),
            width: default_plot_width(),
            height: default_plot_height(),
        }
    }
}

impl PlotConfig {
    /// Validates plot settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("plot.directory", &self.directory)?;
        for (field, value) in [("plot.width", self.width), ("plot.height", self.height)] {
            if !(MIN_PLOT_DIMENSION ..= MAX_PLOT_DIMENSION).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be between {MIN_PLOT_DIMENSION} and {MAX_PLOT_DIMENSION}"
                )));
            }
        }
        Ok(())
    }
}

/// Diagnostic output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Diagnostic output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Format of progress events on stderr.
    #[serde(default)]
    pub format: LogFormat,
    /// Optional JSON-lines event log file.
    #[serde(default)]
    pub file: Option<String>,
}

impl LoggingConfig {
    /// Validates the event log path.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(file) = &self.file {
            validate_path_string("logging.file", file)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Config path plus whether it must exist.
struct ResolvedPath {
    /// Candidate config path.
    path: PathBuf,
    /// False only for the implicit default file.
    required: bool,
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            required: true,
        });
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            required: true,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        required: false,
    })
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an identifier or group field name.
fn validate_field_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_FIELD_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Validates a positive finite threshold.
fn validate_limit(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{field} must be a positive number")))
    }
}

/// Default identifier field.
fn default_id_column() -> String {
    DEFAULT_ID_COLUMN.to_string()
}

/// Default group field.
fn default_group_column() -> String {
    DEFAULT_GROUP_COLUMN.to_string()
}

/// Default delimiter.
fn default_delimiter() -> String {
    ",".to_string()
}

/// Default input file.
fn default_input_file() -> String {
    DEFAULT_INPUT_FILE.to_string()
}

/// Default input size limit.
const fn default_max_file_bytes() -> usize {
    DEFAULT_MAX_FILE_BYTES
}

/// Default significance level.
const fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

/// Default kurtosis criterion.
const fn default_kurtosis_limit() -> f64 {
    DEFAULT_KURTOSIS_LIMIT
}

/// Default skewness criterion.
const fn default_skewness_limit() -> f64 {
    DEFAULT_SKEWNESS_LIMIT
}

/// Serde default for switches that start enabled.
const fn default_true() -> bool {
    true
}

/// Default plot directory.
fn default_plot_directory() -> String {
    DEFAULT_PLOT_DIRECTORY.to_string()
}

/// Default plot width.
const fn default_plot_width() -> u32 {
    DEFAULT_PLOT_WIDTH
}

/// Default plot height.
const fn default_plot_height() -> u32 {
    DEFAULT_PLOT_HEIGHT
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(GroupStatConfig::default().validate().is_ok(), "defaults should validate");
    }

    #[test]
    fn delimiter_accepts_single_ascii_character() {
        for (raw, expected) in [(",", b','), (";", b';'), ("\t", b'\t')] {
            let config = InputConfig {
                delimiter: raw.to_string(),
                ..InputConfig::default()
            };
            assert_eq!(config.delimiter_byte().unwrap(), expected);
        }
    }

    #[test]
    fn delimiter_rejects_quotes_and_multiple_characters() {
        for raw in ["", "\"", ",,", "\u{e9}"] {
            let config = InputConfig {
                delimiter: raw.to_string(),
                ..InputConfig::default()
            };
            assert!(config.delimiter_byte().is_err(), "delimiter {raw} should fail");
        }
    }

    #[test]
    fn input_rejects_matching_field_names() {
        let config = InputConfig {
            group_column: "Person".to_string(),
            ..InputConfig::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("must differ"));
    }

    #[test]
    fn input_rejects_zero_size_limit() {
        let config = InputConfig {
            max_file_bytes: 0,
            ..InputConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn alpha_must_be_a_probability() {
        for alpha in [0.0, 1.0, -0.5, f64::NAN] {
            let config = AnalysisConfig {
                alpha,
                ..AnalysisConfig::default()
            };
            assert!(config.validate().is_err(), "alpha {alpha} should fail");
        }
        let config = AnalysisConfig {
            alpha: 0.01,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn limits_must_be_positive() {
        assert!(validate_limit("limit", 0.0).is_err());
        assert!(validate_limit("limit", f64::INFINITY).is_err());
        assert!(validate_limit("limit", 0.8).is_ok());
    }

    #[test]
    fn plot_dimensions_are_bounded() {
        let config = PlotConfig {
            width: MIN_PLOT_DIMENSION - 1,
            ..PlotConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("plot.width"));
        let config = PlotConfig {
            height: MAX_PLOT_DIMENSION,
            ..PlotConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_path_string_rejects_empty_string() {
        let result = validate_path_string("output.directory", "  ");
        assert!(result.unwrap_err().to_string().contains("output.directory must be non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_component_too_long() {
        let component = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path_string("plot.directory", &format!("out/{component}"));
        assert!(result.unwrap_err().to_string().contains("path component too long"));
    }

    #[test]
    fn pipeline_options_carry_sections() {
        let mut config = GroupStatConfig::default();
        config.input.delimiter = ";".to_string();
        config.analysis.normality = false;
        config.output.directory = Some("out".to_string());
        let options = config.pipeline_options().unwrap();
        assert_eq!(options.load.delimiter, b';');
        assert!(!options.analysis.normality);
        assert_eq!(options.output_dir, Some(PathBuf::from("out")));
    }
}
