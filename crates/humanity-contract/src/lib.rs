// crates/humanity-contract/src/lib.rs
// ============================================================================
// Module: Humanity Contract Library
// Description: Canonical action registry and shared wire shapes.
// Purpose: Single source of truth for action identifiers and safety metadata.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `humanity-contract` defines the action contract table served by the
//! Humanity MCP service. Each advisory action is bound to its owning skill,
//! its input/output schema locations, and a mandatory safety boundary that is
//! returned with every successful invocation.
//!
//! The registry is built once at startup from [`ActionName::all`] and passed
//! by reference to the dispatcher and server; there is no global table.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod actions;
pub mod registry;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use actions::ActionName;
pub use registry::ActionContract;
pub use registry::ContractError;
pub use registry::ContractRegistry;
pub use registry::SCHEMA_DIR_PREFIX;
pub use registry::builtin_contracts;
pub use registry::validate_all;
pub use types::ActionInput;
pub use types::InvokeResponse;
pub use types::Uncertainty;
