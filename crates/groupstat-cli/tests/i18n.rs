// crates/groupstat-cli/tests/i18n.rs
// ============================================================================
// Module: CLI Catalog Tests
// Description: Exercises the message catalog and placeholder substitution.
// Purpose: Ensure CLI user-facing strings route through stable helpers.
// Dependencies: groupstat-cli i18n module and the `t!` macro.
// ============================================================================

//! ## Overview
//! Validates the groupstat CLI catalog behavior:
//! - Message arguments capture key/value substitutions.
//! - Translation falls back to keys on misses.
//! - The [`t!`](groupstat_cli::t) macro formats placeholders correctly.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use groupstat_cli::i18n::MessageArg;
use groupstat_cli::i18n::translate;
use groupstat_cli::t;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Confirms message arguments capture key/value pairs.
#[test]
fn message_arg_new_captures_key_and_value() {
    let arg = MessageArg::new("path", "/tmp/trial.csv");
    assert_eq!(arg.key, "path");
    assert_eq!(arg.value, "/tmp/trial.csv");
}

/// Confirms catalog entries resolve and replace placeholders.
#[test]
fn translate_substitutes_placeholders() {
    let args = vec![MessageArg::new("path", "out/trial_results_15-01-2024.csv")];
    let result = translate("event.output_written", args);
    assert_eq!(result, "Results written to out/trial_results_15-01-2024.csv");
}

/// Confirms missing keys fall back to the key string.
#[test]
fn translate_falls_back_to_key() {
    assert_eq!(translate("missing.key", Vec::new()), "missing.key");
}

/// Confirms the macro formats every named argument.
#[test]
fn macro_formats_named_arguments() {
    let message = t!("analyze.summary", total = 3, succeeded = 2, failed = 1);
    assert_eq!(message, "Processed 3 file(s): 2 succeeded, 1 failed.");
}

/// Confirms placeholders without a matching argument stay in the output.
#[test]
fn translate_keeps_unmatched_placeholders() {
    let args = vec![MessageArg::new("path", "fig/mass.svg")];
    assert_eq!(translate("event.plot_written", args), "Plot written to fig/mass.svg");
    let partial = translate("event.file_failed", vec![MessageArg::new("path", "bad.csv")]);
    assert_eq!(partial, "Failed to process bad.csv: {error}");
}
