// crates/humanity-mcp/src/audit.rs
// ============================================================================
// Module: MCP Audit Logging
// Description: Structured audit events for line request handling.
// Purpose: Emit content-free audit logs on a side channel.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit event payloads and sinks. Every served line produces one
//! `mcp_request` event. Internal defects and schema pass-through produce
//! `diagnostic` events, which are kept apart from user-facing errors.
//!
//! Events are JSON lines written to stderr or an append-only file, never to
//! stdout. Request inputs and handler outputs are never recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::telemetry::RequestKind;
use crate::telemetry::RequestOutcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct McpAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Request type classification.
    pub kind: RequestKind,
    /// Action identifier for registered actions only.
    pub action: Option<String>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request line size in bytes.
    pub request_bytes: usize,
    /// Response line size in bytes.
    pub response_bytes: usize,
}

/// Inputs required to construct a request audit event.
pub struct McpAuditEventParams {
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Request type classification.
    pub kind: RequestKind,
    /// Action identifier for registered actions only.
    pub action: Option<String>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request line size in bytes.
    pub request_bytes: usize,
    /// Response line size in bytes.
    pub response_bytes: usize,
}

impl McpAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: McpAuditEventParams) -> Self {
        Self {
            event: "mcp_request",
            timestamp_ms: now_ms(),
            request_id: params.request_id,
            kind: params.kind,
            action: params.action,
            outcome: params.outcome,
            error_kind: params.error_kind,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
        }
    }
}

/// Diagnostic classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A registered action had no handler, or a handler broke its contract.
    DispatchDefect,
    /// An input schema could not be loaded and validation was skipped.
    SchemaUnavailable,
}

/// Diagnostic audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Diagnostic classification.
    pub kind: DiagnosticKind,
    /// Action identifier.
    pub action: String,
    /// Human-readable detail.
    pub message: String,
}

impl DiagnosticEvent {
    /// Creates a new diagnostic event with a consistent timestamp.
    #[must_use]
    pub fn new(kind: DiagnosticKind, action: &str, message: impl Into<String>) -> Self {
        Self {
            event: "diagnostic",
            timestamp_ms: now_ms(),
            kind,
            action: action.to_string(),
            message: message.into(),
        }
    }
}

/// Returns the current time in milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for request and diagnostic events.
pub trait McpAuditSink: Send + Sync {
    /// Record a request audit event.
    fn record(&self, event: &McpAuditEvent);

    /// Record a diagnostic event.
    fn record_diagnostic(&self, _event: &DiagnosticEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct McpStderrAuditSink;

impl McpAuditSink for McpStderrAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        write_stderr_json(event);
    }

    fn record_diagnostic(&self, event: &DiagnosticEvent) {
        write_stderr_json(event);
    }
}

/// Writes one JSON line to stderr, ignoring failures.
fn write_stderr_json(event: &impl Serialize) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(std::io::stderr(), "{payload}");
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct McpFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl McpFileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one JSON line, ignoring failures.
    fn append(&self, event: &impl Serialize) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl McpAuditSink for McpFileAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        self.append(event);
    }

    fn record_diagnostic(&self, event: &DiagnosticEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct McpNoopAuditSink;

impl McpAuditSink for McpNoopAuditSink {
    fn record(&self, _event: &McpAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
