// crates/humanity-mcp/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared helpers for line protocol integration tests.
// Purpose: Build servers and drive request lines end to end.
// Dependencies: humanity-mcp, serde_json
// ============================================================================

//! ## Overview
//! Shared fixtures: a server with the built-in catalog, a helper that sends
//! one request line and parses the response line, and the minimal valid input
//! for every action.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use humanity_config::DEFAULT_MAX_LINE_BYTES;
use humanity_contract::ContractRegistry;
use humanity_mcp::ActionRouter;
use humanity_mcp::McpNoopAuditSink;
use humanity_mcp::McpServer;
use humanity_mcp::SchemaValidator;
use humanity_mcp::builtin_handlers;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Server over the built-in catalog with the default line ceiling.
pub fn default_server() -> McpServer {
    McpServer::new(
        ActionRouter::builtin().unwrap(),
        Arc::new(McpNoopAuditSink),
        DEFAULT_MAX_LINE_BYTES,
    )
}

/// Server whose schemas resolve under `root`.
pub fn server_with_schema_root(root: &Path) -> McpServer {
    let router = ActionRouter::new(
        Arc::new(ContractRegistry::builtin().unwrap()),
        SchemaValidator::new(root),
        builtin_handlers(),
        Arc::new(McpNoopAuditSink),
    );
    McpServer::new(router, Arc::new(McpNoopAuditSink), DEFAULT_MAX_LINE_BYTES)
}

/// Sends one request value and parses the response.
pub fn send(server: &McpServer, request: &Value) -> Value {
    let line = serde_json::to_string(request).unwrap();
    serde_json::from_str(&server.handle_line(line.as_bytes())).unwrap()
}

/// Streams raw input through the server and returns the raw output lines.
pub fn stream(server: &McpServer, input: &[u8]) -> Vec<String> {
    let mut output = Vec::new();
    server.serve_stream(Cursor::new(input.to_vec()), &mut output).unwrap();
    String::from_utf8(output).unwrap().lines().map(str::to_string).collect()
}

/// Builds an `invoke` envelope.
pub fn invoke(id: &str, action: &str, input: Value) -> Value {
    json!({
        "id": id,
        "type": "invoke",
        "payload": { "action": action, "input": input },
    })
}

/// Minimal valid input for every built-in action.
pub fn minimal_inputs() -> Vec<(&'static str, Value)> {
    vec![
        ("wcagaaa_check", json!({ "target": "https://example.org/checkout" })),
        ("rewrite_depression_sensitive_content", json!({ "text": "Act now! You must finish." })),
        ("supportive_reply", json!({ "message": "I had a hard week", "risk_level": "medium" })),
        ("cognitive_accessibility_audit", json!({ "content": "Fill in the form. Then submit." })),
        ("cultural_context_check", json!({ "message": "Hey guys", "audience": "elders" })),
        ("deescalation_plan", json!({ "situation": "Refund dispute", "intensity": "high" })),
        ("empathetic_reframe", json!({ "message": "Unfortunately we cannot help" })),
        ("grief_support_response", json!({ "message": "My mother passed away" })),
        ("neurodiversity_design_check", json!({ "ui_description": "Dense dashboard" })),
        ("age_inclusive_design_check", json!({ "flow_description": "Mobile banking login" })),
    ]
}
