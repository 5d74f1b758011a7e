// crates/groupstat-config/src/lib.rs
// ============================================================================
// Module: groupstat Config Library
// Description: Configuration model and validation for groupstat.
// Purpose: Single source of truth for groupstat.toml semantics.
// Dependencies: groupstat-core, serde, toml
// ============================================================================

//! ## Overview
//! `groupstat-config` defines the configuration model for groupstat. Every
//! section has built-in defaults, so a missing default config file is not an
//! error; an explicitly named file must exist and validate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
