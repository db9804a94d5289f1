// crates/humanity-config/src/lib.rs
// ============================================================================
// Module: Humanity Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for humanity-mcp.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `humanity-config` defines the configuration model for the Humanity MCP
//! service. It provides strict, fail-closed validation with hard limits on
//! file size and path lengths.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
