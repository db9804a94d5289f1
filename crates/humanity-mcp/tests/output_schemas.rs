// crates/humanity-mcp/tests/output_schemas.rs
// ============================================================================
// Module: Bundled Schema Conformance Tests
// Description: Check handler outputs and sample inputs against shipped schemas.
// Purpose: Keep the bundled schema files in step with the handlers.
// Dependencies: humanity-mcp, humanity-contract, jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Compiles every bundled schema with `jsonschema` and checks that the
//! minimal inputs satisfy the input schemas and that every handler output
//! satisfies its output schema.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only fixtures use unwraps for clarity."
)]

mod common;

use std::fs;
use std::path::Path;

use humanity_contract::ContractRegistry;
use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use serde_json::json;

use crate::common::default_server;
use crate::common::invoke;
use crate::common::minimal_inputs;
use crate::common::send;

/// Compiles the bundled schema at a registry-relative path.
fn compile(relative: &str) -> Validator {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(relative);
    let document: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    jsonschema::options().with_draft(Draft::Draft202012).build(&document).unwrap()
}

/// Renders validation errors for assertion messages.
fn describe(validator: &Validator, instance: &Value) -> String {
    validator.iter_errors(instance).map(|err| err.to_string()).collect::<Vec<_>>().join("; ")
}

#[test]
fn minimal_inputs_satisfy_input_schemas() {
    let registry = ContractRegistry::builtin().unwrap();
    for (action, input) in minimal_inputs() {
        let contract = registry.lookup(action).unwrap();
        let validator = compile(&contract.input_schema_path);
        assert!(validator.is_valid(&input), "{action}: {}", describe(&validator, &input));
        assert!(!validator.is_valid(&json!({})), "{action} accepted an empty input");
    }
}

#[test]
fn handler_outputs_satisfy_output_schemas() {
    let registry = ContractRegistry::builtin().unwrap();
    let server = default_server();
    for (action, input) in minimal_inputs() {
        let contract = registry.lookup(action).unwrap();
        let validator = compile(&contract.output_schema_path);
        let response = send(&server, &invoke("o", action, input));
        let output = &response["data"]["output"];
        assert!(validator.is_valid(output), "{action}: {}", describe(&validator, output));
    }
}

#[test]
fn enum_variants_produce_conforming_outputs() {
    let server = default_server();
    let cases = [
        ("wcagaaa_check", json!({ "target": "form", "level": "A" })),
        ("rewrite_depression_sensitive_content", json!({ "text": "Last chance!", "mode": "audit" })),
        ("supportive_reply", json!({ "message": "x", "risk_level": "high" })),
        ("deescalation_plan", json!({ "situation": "legal threat", "intensity": "low" })),
        ("empathetic_reframe", json!({ "message": "no point anymore", "tone": "formal" })),
        ("grief_support_response", json!({ "message": "x", "support_mode": "practical" })),
        ("cultural_context_check", json!({ "message": "x", "audience": "y", "region": "Japan" })),
    ];
    let registry = ContractRegistry::builtin().unwrap();
    for (action, input) in cases {
        let contract = registry.lookup(action).unwrap();
        let output_validator = compile(&contract.output_schema_path);
        let input_validator = compile(&contract.input_schema_path);
        assert!(input_validator.is_valid(&input), "{action}");
        let response = send(&server, &invoke("v", action, input));
        let output = &response["data"]["output"];
        assert!(output_validator.is_valid(output), "{action}: {}", describe(&output_validator, output));
    }
}
