// crates/groupstat-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Keyed message templates and placeholder substitution.
// Purpose: Centralize user-facing strings of the groupstat CLI.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every line groupstat prints, from progress events to batch summaries and
//! error reports, is looked up here by key. Templates carry `{name}`
//! placeholders that [`t!`](crate::t) fills from named arguments, so the
//! wording of a message lives in one table instead of at each call site.
//! An unknown key renders as the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One named value for a catalog template, as collected by [`macro@crate::t`].
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces, such as `source` or `variable`.
    pub key: &'static str,
    /// Display text written in place of `{key}`.
    pub value: String,
}

impl MessageArg {
    /// Pairs a placeholder name with its rendered text.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Message templates keyed by `area.message`.
static MESSAGES: &[(&str, &str)] = &[
    ("main.version", "groupstat {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("logging.open_failed", "Failed to open event log {path}: {error}"),
    ("analyze.summary", "Processed {total} file(s): {succeeded} succeeded, {failed} failed."),
    ("analyze.plot_ignored", "--plot applies to time-series mode only; no plots written."),
    ("plot.failed", "Plotting failed: {error}"),
    ("plot.summary", "Wrote {count} plot(s) to {directory}."),
    ("event.file_loading", "Loading {path}"),
    ("event.table_loaded", "Loaded {source}: {subjects} subjects, {variables} variables"),
    ("event.groups_partitioned", "{source}: groups {groups} ({sizing})"),
    ("event.groups.equal", "equal sizes"),
    ("event.groups.unequal", "unequal sizes"),
    ("event.group_entry", "{label} (n={size})"),
    (
        "event.missing_data_skipped",
        "{source}: variable {variable} has {missing} missing value(s); tests skipped",
    ),
    ("event.test_undefined", "{source}: {test} undefined for variable {variable}: {reason}"),
    ("event.output_written", "Results written to {path}"),
    ("event.file_failed", "Failed to process {path}: {error}"),
    ("event.plot_written", "Plot written to {path}"),
];

/// Returns the template table, built on first use.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_MAP.get_or_init(|| MESSAGES.iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders the template for `key` with every `{name}` replaced by its argument.
///
/// Placeholders without a matching argument are left as written.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    args.into_iter().fold(template.to_string(), |message, arg| {
        message.replace(&format!("{{{}}}", arg.key), &arg.value)
    })
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Renders a catalog message: `t!("event.plot_written", path = target)`.
///
/// Each argument is converted with `to_string` before substitution.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
