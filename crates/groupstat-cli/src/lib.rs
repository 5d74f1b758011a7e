// crates/groupstat-cli/src/lib.rs
// ============================================================================
// Module: groupstat CLI Library
// Description: Shared helpers for the groupstat command-line interface.
// Purpose: Provide the message catalog and console sink to the binary and tests.
// Dependencies: groupstat-core
// ============================================================================

//! ## Overview
//! This library module houses shared CLI utilities: the message catalog that
//! every user-facing string goes through, and the console sink that renders
//! pipeline events as text lines. The binary entry point (`src/main.rs`)
//! imports these helpers to keep all output consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Console rendering of pipeline events.
pub mod console;
/// Message catalog and translation helpers.
pub mod i18n;
