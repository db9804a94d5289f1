// crates/humanity-mcp/src/handlers.rs
// ============================================================================
// Module: Action Handlers
// Description: Handler trait, built-in bindings, and shared rule helpers.
// Purpose: Turn a validated input into a structured advisory response.
// Dependencies: humanity-contract, regex, serde_json
// ============================================================================

//! ## Overview
//! Every advisory action is served by an [`ActionHandler`]. Handlers are pure:
//! they read the validated input, apply fixed rules, and return an
//! [`InvokeResponse`] carrying the safety boundary they were given. They never
//! fail and never touch I/O.
//!
//! The built-in binding is an exhaustive match over [`ActionName`], so the
//! default handler table always covers the whole contract registry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use humanity_contract::ActionInput;
use humanity_contract::ActionName;
use humanity_contract::InvokeResponse;
use humanity_contract::Uncertainty;
use regex::NoExpand;
use regex::Regex;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod accessibility;
pub mod communication;
pub mod emotional;

// ============================================================================
// SECTION: Handler Trait
// ============================================================================

/// Pure advisory handler for one action.
pub trait ActionHandler: Send + Sync {
    /// Produces the response for a validated input.
    fn invoke(&self, input: &ActionInput, boundary_notice: &str) -> InvokeResponse;
}

impl<F> ActionHandler for F
where
    F: Fn(&ActionInput, &str) -> InvokeResponse + Send + Sync,
{
    fn invoke(&self, input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
        self(input, boundary_notice)
    }
}

/// Handler table keyed by action identifier.
pub type HandlerMap = BTreeMap<String, Arc<dyn ActionHandler>>;

/// Returns the built-in handler for an action.
#[must_use]
pub fn handler_for(action: ActionName) -> Arc<dyn ActionHandler> {
    match action {
        ActionName::WcagAaaCheck => Arc::new(accessibility::wcag_check),
        ActionName::RewriteDepressionSensitiveContent => {
            Arc::new(emotional::rewrite_depression_sensitive)
        }
        ActionName::SupportiveReply => Arc::new(emotional::supportive_reply),
        ActionName::CognitiveAccessibilityAudit => Arc::new(accessibility::cognitive_audit),
        ActionName::CulturalContextCheck => Arc::new(communication::cultural_context),
        ActionName::DeescalationPlan => Arc::new(communication::deescalation_plan),
        ActionName::EmpatheticReframe => Arc::new(emotional::empathetic_reframe),
        ActionName::GriefSupportResponse => Arc::new(emotional::grief_support),
        ActionName::NeurodiversityDesignCheck => Arc::new(accessibility::neurodiversity_check),
        ActionName::AgeInclusiveDesignCheck => Arc::new(accessibility::age_inclusive_check),
    }
}

/// Returns the handler table for every built-in action.
#[must_use]
pub fn builtin_handlers() -> HandlerMap {
    ActionName::all()
        .iter()
        .map(|action| (action.as_str().to_string(), handler_for(*action)))
        .collect()
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Returns the trimmed string at `key`, or `fallback` when it is not a string.
pub(crate) fn text_field(input: &ActionInput, key: &str, fallback: &str) -> String {
    input
        .get(key)
        .and_then(Value::as_str)
        .map_or_else(|| fallback.to_string(), |text| text.trim().to_string())
}

/// Returns the string members of the array at `key`.
pub(crate) fn string_list(input: &ActionInput, key: &str) -> Vec<String> {
    input
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Converts string literals into owned strings.
pub(crate) fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

// ============================================================================
// SECTION: Response Helpers
// ============================================================================

/// Assembles a handler response.
pub(crate) fn respond(
    action: ActionName,
    boundary_notice: &str,
    uncertainty: Uncertainty,
    assumptions: Vec<String>,
    output: Value,
) -> InvokeResponse {
    let output = match output {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    InvokeResponse {
        action: action.as_str().to_string(),
        output,
        assumptions,
        uncertainty,
        boundary_notice: boundary_notice.to_string(),
    }
}

// ============================================================================
// SECTION: Rewrite Rules
// ============================================================================

/// Compiled case-insensitive substitution.
pub(crate) struct RewriteRule {
    /// Pattern to replace.
    pattern: Regex,
    /// Literal replacement text.
    replacement: &'static str,
}

/// Compiles `(pattern, replacement)` pairs as case-insensitive rules.
///
/// Patterns that fail to compile are skipped.
pub(crate) fn compile_rules(rules: &[(&str, &'static str)]) -> Vec<RewriteRule> {
    rules
        .iter()
        .filter_map(|&(pattern, replacement)| {
            Regex::new(&format!("(?i){pattern}")).ok().map(|pattern| RewriteRule {
                pattern,
                replacement,
            })
        })
        .collect()
}

/// Applies every rule in order, replacing all matches.
pub(crate) fn apply_rules(text: &str, rules: &[RewriteRule]) -> String {
    rules.iter().fold(text.to_string(), |current, rule| {
        rule.pattern.replace_all(&current, NoExpand(rule.replacement)).into_owned()
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
