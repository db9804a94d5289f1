// crates/humanity-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Shared wire shapes for action invocation results.
// Purpose: Provide canonical response shapes for handlers and the server.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Canonical shapes returned by action handlers. Field names follow the
//! camelCase wire format of the line protocol.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Validated action input: a JSON object keyed by field name.
pub type ActionInput = Map<String, Value>;

/// Confidence disclosure attached to every invocation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Uncertainty {
    /// Low uncertainty.
    Low,
    /// Medium uncertainty.
    Medium,
    /// High uncertainty.
    High,
}

impl Uncertainty {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Successful invocation payload.
///
/// # Invariants
/// - `boundary_notice` equals the registry safety boundary for `action`.
/// - `assumptions` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResponse {
    /// Action identifier.
    pub action: String,
    /// Handler-specific structured output.
    pub output: Map<String, Value>,
    /// Assumptions the handler made about its input.
    pub assumptions: Vec<String>,
    /// Confidence disclosure.
    pub uncertainty: Uncertainty,
    /// Safety boundary text from the registry.
    pub boundary_notice: String,
}
