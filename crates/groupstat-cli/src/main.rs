// crates/groupstat-cli/src/main.rs
// ============================================================================
// Module: groupstat CLI Entry Point
// Description: Command dispatcher for batch analysis, plotting, and config.
// Purpose: Run the analysis pipeline over input files with configured options.
// Dependencies: clap, groupstat-config, groupstat-core, groupstat-plot, thiserror.
// ============================================================================

//! ## Overview
//! The groupstat CLI analyzes subject-by-variable CSV files, writes dated
//! result grids, and optionally plots group medians across a time series.
//! All user-facing strings are routed through the message catalog. Progress
//! events go to stderr as text or JSON lines; summaries go to stdout.
//!
//! The exit code is a failure when any input failed, even though the rest of
//! the batch is still processed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use groupstat_cli::console::TextStderrEventSink;
use groupstat_cli::t;
use groupstat_config::GroupStatConfig;
use groupstat_config::LogFormat;
use groupstat_core::AnalysisMode;
use groupstat_core::FileEventSink;
use groupstat_core::JsonStderrEventSink;
use groupstat_core::PipelineEventSink;
use groupstat_core::PipelineOptions;
use groupstat_core::TeeEventSink;
use groupstat_core::TimeSeries;
use groupstat_core::pipeline::load_tables;
use groupstat_core::pipeline::run_independent;
use groupstat_core::pipeline::run_timeseries;
use groupstat_plot::PlotOptions;
use groupstat_plot::plot_medians;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "groupstat", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze input files and write result grids.
    Analyze(AnalyzeCommand),
    /// Plot group medians across input files treated as a time series.
    Plot(PlotCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments shared by commands that run the pipeline.
#[derive(Args, Debug)]
struct PipelineArgs {
    /// Optional config file path (defaults to groupstat.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Progress output format (overrides `logging.format`).
    #[arg(long, value_enum, value_name = "FORMAT")]
    log_format: Option<LogFormatArg>,
}

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
struct AnalyzeCommand {
    /// Input CSV files (defaults to `input.default_file`).
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
    /// How inputs are interpreted (overrides `analysis.mode`).
    #[arg(long, value_enum, value_name = "MODE")]
    mode: Option<ModeArg>,
    /// Skip Shapiro-Wilk normality tests.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_normality: bool,
    /// Plot group medians (time-series mode only).
    #[arg(long, action = ArgAction::SetTrue)]
    plot: bool,
    /// Directory for result files (overrides `output.directory`).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Directory for plots (overrides `plot.directory`).
    #[arg(long, value_name = "DIR")]
    plot_dir: Option<PathBuf>,
    /// Config and logging arguments.
    #[command(flatten)]
    pipeline: PipelineArgs,
}

/// Arguments for the `plot` command.
#[derive(Args, Debug)]
struct PlotCommand {
    /// Input CSV files in time order (defaults to `input.default_file`).
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
    /// Directory for plots (overrides `plot.directory`).
    #[arg(long, value_name = "DIR")]
    plot_dir: Option<PathBuf>,
    /// Config and logging arguments.
    #[command(flatten)]
    pipeline: PipelineArgs,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to groupstat.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Analysis mode argument.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// Analyze each file on its own.
    Independent,
    /// Treat files as consecutive measurements.
    Timeseries,
}

impl From<ModeArg> for AnalysisMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Independent => Self::Independent,
            ModeArg::Timeseries => Self::TimeSeries,
        }
    }
}

/// Progress output format argument.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormatArg {
    /// Human-readable lines.
    Text,
    /// JSON lines.
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Per-batch file counts.
struct BatchSummary {
    /// Files requested.
    total: usize,
    /// Files processed successfully.
    succeeded: usize,
    /// True when every file and every plot succeeded.
    clean: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Analyze(command) => command_analyze(command),
        Commands::Plot(command) => command_plot(command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Analyze Command
// ============================================================================

/// Executes the `analyze` command.
fn command_analyze(command: AnalyzeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.pipeline.config.as_deref())?;
    let mut options = pipeline_options(&config)?;
    if command.skip_normality {
        options.analysis.normality = false;
    }
    if let Some(directory) = command.output_dir {
        options.output_dir = Some(directory);
    }
    let files = input_files(command.files, &config);
    let mode = command.mode.map_or(config.analysis.mode, AnalysisMode::from);
    let plot_options = plot_options(&config, command.plot_dir);

    let summary = with_sink(&config, command.pipeline.log_format, |sink| match mode {
        AnalysisMode::Independent => {
            if command.plot {
                write_stderr_line(&t!("analyze.plot_ignored"))
                    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            }
            let report = run_independent(&files, &options, sink);
            Ok(BatchSummary {
                total: files.len(),
                succeeded: report.outputs.len(),
                clean: report.is_success(),
            })
        }
        AnalysisMode::TimeSeries => {
            let batch = run_timeseries(&files, &options, sink);
            let mut clean = batch.report.is_success();
            if command.plot && !batch.tables.is_empty() {
                let series = TimeSeries::combine(&batch.tables);
                if let Err(err) = plot_medians(&series, &plot_options, sink) {
                    write_stderr_line(&t!("plot.failed", error = err))
                        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
                    clean = false;
                }
            }
            Ok(BatchSummary {
                total: files.len(),
                succeeded: batch.tables.len(),
                clean,
            })
        }
    })?;
    finish(&summary)
}

// ============================================================================
// SECTION: Plot Command
// ============================================================================

/// Executes the `plot` command.
fn command_plot(command: PlotCommand) -> CliResult<ExitCode> {
    let config = load_config(command.pipeline.config.as_deref())?;
    let options = pipeline_options(&config)?;
    let files = input_files(command.files, &config);
    let plot_options = plot_options(&config, command.plot_dir);

    with_sink(&config, command.pipeline.log_format, |sink| {
        let (tables, failures) = load_tables(&files, &options.load, sink);
        let series = TimeSeries::combine(&tables);
        let written = plot_medians(&series, &plot_options, sink)
            .map_err(|err| CliError::new(t!("plot.failed", error = err)))?;
        write_stdout_line(&t!(
            "plot.summary",
            count = written.len(),
            directory = plot_options.directory.display()
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        Ok(if failures.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    })
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = load_config(command.config.as_deref())?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<GroupStatConfig> {
    GroupStatConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Builds pipeline options from configuration.
fn pipeline_options(config: &GroupStatConfig) -> CliResult<PipelineOptions> {
    config.pipeline_options().map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Returns the given files, or the configured default file when none are given.
fn input_files(files: Vec<PathBuf>, config: &GroupStatConfig) -> Vec<PathBuf> {
    if files.is_empty() { vec![PathBuf::from(&config.input.default_file)] } else { files }
}

/// Builds plot options from configuration and an optional directory override.
fn plot_options(config: &GroupStatConfig, directory: Option<PathBuf>) -> PlotOptions {
    PlotOptions {
        directory: directory.unwrap_or_else(|| PathBuf::from(&config.plot.directory)),
        width: config.plot.width,
        height: config.plot.height,
    }
}

/// Runs `body` with the console sink and the optional event log file.
fn with_sink<T>(
    config: &GroupStatConfig,
    format: Option<LogFormatArg>,
    body: impl FnOnce(&dyn PipelineEventSink) -> CliResult<T>,
) -> CliResult<T> {
    let text = TextStderrEventSink;
    let json = JsonStderrEventSink;
    let console: &dyn PipelineEventSink =
        match format.map_or(config.logging.format, LogFormat::from) {
            LogFormat::Text => &text,
            LogFormat::Json => &json,
        };
    let file = config
        .logging
        .file
        .as_deref()
        .map(|path| {
            FileEventSink::new(Path::new(path))
                .map_err(|err| CliError::new(t!("logging.open_failed", path = path, error = err)))
        })
        .transpose()?;
    let mut sinks = vec![console];
    if let Some(file) = &file {
        sinks.push(file);
    }
    body(&TeeEventSink::new(sinks))
}

/// Prints the batch summary and maps it to an exit code.
fn finish(summary: &BatchSummary) -> CliResult<ExitCode> {
    write_stdout_line(&t!(
        "analyze.summary",
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.total - summary.succeeded
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(if summary.clean { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
