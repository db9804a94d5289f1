// crates/humanity-mcp/src/lib.rs
// ============================================================================
// Module: Humanity MCP Library
// Description: Line-delimited JSON service for advisory actions.
// Purpose: Expose the schema validator, dispatcher, handlers, and server.
// Dependencies: humanity-config, humanity-contract, regex, serde, tokio
// ============================================================================

//! ## Overview
//! `humanity-mcp` serves the advisory action catalog over newline-delimited
//! JSON. A request line is size-checked, parsed, shape-checked, validated
//! against the action's input schema, and dispatched to a pure handler; the
//! result or a typed error goes back as exactly one response line.
//!
//! The crate is transport-agnostic below [`McpServer::serve_stream`]; the CLI
//! binds it to stdin/stdout.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod handlers;
pub mod protocol;
pub mod router;
pub mod server;
pub mod telemetry;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::McpAuditSink;
pub use audit::McpFileAuditSink;
pub use audit::McpNoopAuditSink;
pub use audit::McpStderrAuditSink;
pub use handlers::ActionHandler;
pub use handlers::HandlerMap;
pub use handlers::builtin_handlers;
pub use protocol::ProtocolError;
pub use protocol::ResponseEnvelope;
pub use router::ActionRouter;
pub use router::DispatchError;
pub use server::McpServer;
pub use server::McpServerError;
pub use server::banner;
pub use telemetry::McpMetrics;
pub use telemetry::NoopMetrics;
pub use validation::SchemaValidator;
pub use validation::ValidationResult;
