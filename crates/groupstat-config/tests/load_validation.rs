//! Config load validation tests for groupstat-config.
// crates/groupstat-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section parsing.
// Purpose: Ensure config input handling is strict and defaults are complete.
// =============================================================================

use std::io::Write;
use std::path::Path;

use groupstat_config::ConfigError;
use groupstat_config::GroupStatConfig;
use groupstat_config::LogFormat;
use groupstat_core::AnalysisMode;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<GroupStatConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(GroupStatConfig::load(Some(Path::new(&long_path))), "exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        GroupStatConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    assert_invalid(GroupStatConfig::load(Some(&missing)), "config io error")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'#'; 1_048_577])?;
    assert_invalid(GroupStatConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(GroupStatConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config(b"[analysis\nalpha = 0.05\n")?;
    assert_invalid(GroupStatConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_invalid_threshold() -> TestResult {
    let file = write_config(b"[analysis]\nalpha = 1.5\n")?;
    assert_invalid(GroupStatConfig::load(Some(file.path())), "analysis.alpha")
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let file = write_config(b"")?;
    let config = GroupStatConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let mut expected = GroupStatConfig::default();
    expected.source = Some(file.path().to_path_buf());
    if config != expected {
        return Err("empty config should match defaults".to_string());
    }
    if config.input.default_file != "example.csv" || config.plot.directory != "fig" {
        return Err("unexpected default paths".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_every_section() -> TestResult {
    let file = write_config(
        br#"
[input]
id_column = "Subject"
group_column = "Cohort"
delimiter = ";"

[analysis]
mode = "time_series"
alpha = 0.01
normality = false

[output]
directory = "results"

[plot]
directory = "plots"
width = 1024

[logging]
format = "json"
file = "events.jsonl"
"#,
    )?;
    let config = GroupStatConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.analysis.mode != AnalysisMode::TimeSeries {
        return Err("mode not parsed".to_string());
    }
    if config.logging.format != LogFormat::Json || config.logging.file.is_none() {
        return Err("logging not parsed".to_string());
    }
    if config.plot.width != 1024 || config.plot.height != 600 {
        return Err("plot dimensions not parsed".to_string());
    }
    let options = config.pipeline_options().map_err(|err| err.to_string())?;
    if options.load.id_column != "Subject" || options.load.group_column != "Cohort" {
        return Err("field names not carried".to_string());
    }
    if options.load.delimiter != b';' || options.analysis.normality {
        return Err("input or analysis options not carried".to_string());
    }
    if (options.analysis.alpha - 0.01).abs() > f64::EPSILON {
        return Err("alpha not carried".to_string());
    }
    Ok(())
}

#[test]
fn unknown_log_format_is_a_parse_error() -> TestResult {
    assert_invalid(GroupStatConfig::from_toml_str("[logging]\nformat = \"xml\"\n"), "parse error")
}
