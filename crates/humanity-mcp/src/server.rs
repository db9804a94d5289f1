// crates/humanity-mcp/src/server.rs
// ============================================================================
// Module: Line Server
// Description: Bounded line framing, request routing, and stdio serving.
// Purpose: Turn each inbound line into exactly one response line.
// Dependencies: humanity-config, humanity-contract, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`McpServer`] owns the dispatcher and the side channels (audit, metrics).
//! Lines are read with a hard size ceiling: bytes past the ceiling are
//! drained without being buffered and the line is answered with a
//! size error. Every line yields exactly one response line, in order.
//!
//! [`McpServer::serve_stdio`] reads stdin on a dedicated thread that feeds a
//! bounded channel. The serve loop races the next frame against the shutdown
//! future; a frame already received is handled to completion first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::io;
use std::io::BufRead;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use humanity_config::AuditConfig;
use humanity_config::ServiceConfig;
use humanity_contract::ContractRegistry;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::audit::McpAuditEvent;
use crate::audit::McpAuditEventParams;
use crate::audit::McpAuditSink;
use crate::audit::McpFileAuditSink;
use crate::audit::McpNoopAuditSink;
use crate::audit::McpStderrAuditSink;
use crate::handlers::builtin_handlers;
use crate::protocol::ProtocolError;
use crate::protocol::RequestType;
use crate::protocol::ResponseEnvelope;
use crate::protocol::parse_envelope;
use crate::protocol::parse_invoke;
use crate::protocol::parse_line;
use crate::protocol::release_value;
use crate::router::ActionRouter;
use crate::telemetry::McpMetrics;
use crate::telemetry::NoopMetrics;
use crate::telemetry::RequestKind;
use crate::telemetry::RequestMetricEvent;
use crate::telemetry::RequestOutcome;
use crate::validation::SchemaValidator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Service version reported in the startup banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Frames buffered between the stdin reader thread and the serve loop.
const STDIN_CHANNEL_CAPACITY: usize = 16;

/// Response line used when a response envelope cannot be encoded.
const ENCODE_FAILURE_LINE: &str = r#"{"ok":false,"error":"Internal error: response encoding failed"}"#;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server construction and transport failures.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
    /// Startup wiring failed.
    #[error("init error: {0}")]
    Init(String),
    /// Reading requests or writing responses failed.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Framing
// ============================================================================

/// One inbound line, classified by size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Line content without its terminator.
    Line(Vec<u8>),
    /// Line exceeded the ceiling; its content was discarded.
    Oversized {
        /// Bytes consumed for the line, excluding the `\n` terminator.
        bytes: usize,
    },
}

impl Frame {
    /// Returns the size of the inbound line in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Line(line) => line.len(),
            Self::Oversized {
                bytes,
            } => *bytes,
        }
    }

    /// Returns true for a zero-length line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads one `\n`-terminated line, buffering at most `max_bytes` of content.
///
/// A trailing `\r` is stripped and not counted. A final line without a
/// terminator is returned as a frame. Returns `Ok(None)` at end of input.
///
/// # Errors
///
/// Returns the underlying I/O error.
pub fn read_line_bounded<R: BufRead + ?Sized>(
    reader: &mut R,
    max_bytes: usize,
) -> io::Result<Option<Frame>> {
    let mut line = Vec::new();
    let mut consumed = 0usize;
    let mut oversized = false;
    let mut started = false;
    loop {
        let (used, done) = match reader.fill_buf() {
            Ok([]) => {
                if !started {
                    return Ok(None);
                }
                break;
            }
            Ok(available) => {
                let newline = available.iter().position(|byte| *byte == b'\n');
                let content = newline.map_or(available, |index| &available[.. index]);
                consumed = consumed.saturating_add(content.len());
                if !oversized {
                    // One extra byte leaves room for an optional `\r`.
                    if line.len() + content.len() > max_bytes.saturating_add(1) {
                        oversized = true;
                        line = Vec::new();
                    } else {
                        line.extend_from_slice(content);
                    }
                }
                newline.map_or((available.len(), false), |index| (index + 1, true))
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        started = true;
        reader.consume(used);
        if done {
            break;
        }
    }
    if !oversized && line.last() == Some(&b'\r') {
        line.pop();
    }
    if oversized || line.len() > max_bytes {
        return Ok(Some(Frame::Oversized {
            bytes: consumed,
        }));
    }
    Ok(Some(Frame::Line(line)))
}

// ============================================================================
// SECTION: Banner
// ============================================================================

/// Renders the startup banner written to stderr.
#[must_use]
pub fn banner(action_count: usize) -> String {
    [
        format!("Humanity4AI MCP Server v{VERSION}"),
        format!("Actions: {action_count} registered"),
        "Protocol: line-delimited JSON (see docs/protocol.md)".to_string(),
        "Ready — waiting for requests on stdin".to_string(),
    ]
    .join("\n")
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Classification of one handled line, recorded on the side channels.
struct Handled {
    /// Response envelope.
    response: ResponseEnvelope,
    /// Request type classification.
    kind: RequestKind,
    /// Registered action identifier, when one was invoked.
    action: Option<String>,
    /// Error label for failures.
    error_kind: Option<&'static str>,
}

impl Handled {
    /// Builds a failure classification.
    fn failure(
        id: Option<String>,
        kind: RequestKind,
        action: Option<String>,
        err: &ProtocolError,
    ) -> Self {
        Self {
            response: ResponseEnvelope::failure(id, err),
            kind,
            action,
            error_kind: Some(err.kind_label()),
        }
    }
}

/// Line-delimited JSON server for the advisory action catalog.
pub struct McpServer {
    /// Action dispatcher.
    router: ActionRouter,
    /// Request audit sink.
    audit: Arc<dyn McpAuditSink>,
    /// Metrics sink.
    metrics: Arc<dyn McpMetrics>,
    /// Request line ceiling in bytes.
    max_line_bytes: usize,
}

impl McpServer {
    /// Creates a server from a router, audit sink, and line ceiling.
    #[must_use]
    pub fn new(router: ActionRouter, audit: Arc<dyn McpAuditSink>, max_line_bytes: usize) -> Self {
        Self {
            router,
            audit,
            metrics: Arc::new(NoopMetrics),
            max_line_bytes,
        }
    }

    /// Builds the server described by a service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the configuration is invalid, the
    /// contract table is inconsistent, or the audit log cannot be opened.
    pub fn from_config(config: ServiceConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let registry = ContractRegistry::builtin()
            .map_err(|err| McpServerError::Init(format!("contract registry: {err}")))?;
        let audit = audit_sink(&config.audit)?;
        let router = ActionRouter::new(
            Arc::new(registry),
            SchemaValidator::from_config(&config.schemas),
            builtin_handlers(),
            Arc::clone(&audit),
        );
        Ok(Self::new(router, audit, config.server.max_line_bytes))
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn McpMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the contract registry.
    #[must_use]
    pub fn registry(&self) -> &ContractRegistry {
        self.router.registry()
    }

    /// Returns the request line ceiling in bytes.
    #[must_use]
    pub const fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    /// Handles one raw line (without terminator) and returns the response line.
    #[must_use]
    pub fn handle_line(&self, line: &[u8]) -> String {
        let frame = if line.len() > self.max_line_bytes {
            Frame::Oversized {
                bytes: line.len(),
            }
        } else {
            Frame::Line(line.to_vec())
        };
        self.handle_frame(&frame)
    }

    /// Handles one frame, records audit and metrics, and returns the
    /// response line without its terminator.
    #[must_use]
    pub fn handle_frame(&self, frame: &Frame) -> String {
        let started = Instant::now();
        let handled = self.route(frame);
        let line = serde_json::to_string(&handled.response)
            .unwrap_or_else(|_| ENCODE_FAILURE_LINE.to_string());
        let outcome =
            if handled.response.ok { RequestOutcome::Ok } else { RequestOutcome::Error };
        let event = RequestMetricEvent {
            kind: handled.kind,
            action: handled.action.clone(),
            outcome,
            error_kind: handled.error_kind,
            request_bytes: frame.len(),
            response_bytes: line.len(),
        };
        self.metrics.record_request(event.clone());
        self.metrics.record_latency(event, started.elapsed());
        self.audit.record(&McpAuditEvent::new(McpAuditEventParams {
            request_id: handled.response.id,
            kind: handled.kind,
            action: handled.action,
            outcome,
            error_kind: handled.error_kind,
            request_bytes: frame.len(),
            response_bytes: line.len(),
        }));
        line
    }

    /// Serves frames from `reader` until end of input.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] when reading or writing fails.
    pub fn serve_stream<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
    ) -> Result<(), McpServerError> {
        while let Some(frame) = read_line_bounded(&mut reader, self.max_line_bytes)
            .map_err(|err| McpServerError::Transport(format!("read failed: {err}")))?
        {
            let line = self.handle_frame(&frame);
            writeln!(writer, "{line}")
                .and_then(|()| writer.flush())
                .map_err(|err| McpServerError::Transport(format!("write failed: {err}")))?;
        }
        Ok(())
    }

    /// Serves stdin/stdout until end of input or until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] when reading or writing fails.
    pub async fn serve_stdio<F>(&self, shutdown: F) -> Result<(), McpServerError>
    where
        F: Future<Output = ()>,
    {
        let (sender, mut receiver) = mpsc::channel(STDIN_CHANNEL_CAPACITY);
        let max_line_bytes = self.max_line_bytes;
        std::thread::Builder::new()
            .name("humanity-mcp-stdin".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                let mut reader = stdin.lock();
                loop {
                    let next = read_line_bounded(&mut reader, max_line_bytes).transpose();
                    let Some(next) = next else {
                        break;
                    };
                    let failed = next.is_err();
                    if sender.blocking_send(next).is_err() || failed {
                        break;
                    }
                }
            })
            .map_err(|err| McpServerError::Init(format!("stdin reader: {err}")))?;

        let mut stdout = tokio::io::stdout();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                next = receiver.recv() => match next {
                    Some(Ok(frame)) => {
                        let mut line = self.handle_frame(&frame);
                        line.push('\n');
                        stdout
                            .write_all(line.as_bytes())
                            .await
                            .map_err(|err| McpServerError::Transport(format!("write failed: {err}")))?;
                        stdout
                            .flush()
                            .await
                            .map_err(|err| McpServerError::Transport(format!("write failed: {err}")))?;
                    }
                    Some(Err(err)) => {
                        return Err(McpServerError::Transport(format!("read failed: {err}")));
                    }
                    None => break,
                },
            }
        }
        Ok(())
    }

    /// Routes one frame to a response and its classification.
    fn route(&self, frame: &Frame) -> Handled {
        let line = match frame {
            Frame::Line(line) => line,
            Frame::Oversized {
                ..
            } => {
                let err = ProtocolError::FrameTooLarge {
                    limit: self.max_line_bytes,
                };
                return Handled::failure(None, RequestKind::Invalid, None, &err);
            }
        };
        let Ok(value) = parse_line(line) else {
            return Handled::failure(None, RequestKind::Invalid, None, &ProtocolError::MalformedJson);
        };
        let handled = self.route_value(&value);
        release_value(value);
        handled
    }

    /// Routes one parsed request line.
    fn route_value(&self, value: &Value) -> Handled {
        let envelope = match parse_envelope(value) {
            Ok(envelope) => envelope,
            Err(rejection) => {
                let id = rejection.id.clone();
                let err = ProtocolError::InvalidEnvelope(rejection);
                return Handled::failure(id, RequestKind::Invalid, None, &err);
            }
        };
        match envelope.request_type {
            RequestType::ListActions => self.list_actions(envelope.id),
            RequestType::Invoke => self.invoke(envelope.id, envelope.payload),
        }
    }

    /// Answers `list_actions` with the validated contract listing.
    fn list_actions(&self, id: Option<String>) -> Handled {
        let kind = RequestKind::ListActions;
        let listing = match self.registry().validated_listing() {
            Ok(listing) => listing,
            Err(err) => return Handled::failure(id, kind, None, &ProtocolError::from(err)),
        };
        match serde_json::to_value(listing) {
            Ok(data) => Handled {
                response: ResponseEnvelope::success(id, data),
                kind,
                action: None,
                error_kind: None,
            },
            Err(err) => Handled::failure(id, kind, None, &ProtocolError::Internal(err.to_string())),
        }
    }

    /// Answers `invoke` through the dispatcher.
    fn invoke(&self, id: Option<String>, payload: Option<&Value>) -> Handled {
        let kind = RequestKind::Invoke;
        let request = match parse_invoke(payload) {
            Ok(request) => request,
            Err(issues) => {
                return Handled::failure(
                    id,
                    kind,
                    None,
                    &ProtocolError::InvalidInvokePayload(issues),
                );
            }
        };
        let action = self.registry().lookup(&request.action).map(|contract| contract.action.clone());
        let result = self
            .router
            .invoke(&request.action, request.input)
            .map_err(ProtocolError::from)
            .and_then(|response| {
                serde_json::to_value(response).map_err(|err| ProtocolError::Internal(err.to_string()))
            });
        match result {
            Ok(data) => Handled {
                response: ResponseEnvelope::success(id, data),
                kind,
                action,
                error_kind: None,
            },
            Err(err) => Handled::failure(id, kind, action, &err),
        }
    }
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Builds the audit sink selected by configuration.
fn audit_sink(config: &AuditConfig) -> Result<Arc<dyn McpAuditSink>, McpServerError> {
    if !config.enabled {
        return Ok(Arc::new(McpNoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = McpFileAuditSink::new(Path::new(path)).map_err(|err| {
                McpServerError::Init(format!("failed to open audit log {path}: {err}"))
            })?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(McpStderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
