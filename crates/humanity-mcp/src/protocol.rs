// crates/humanity-mcp/src/protocol.rs
// ============================================================================
// Module: Line Protocol
// Description: Request envelope parsing and response envelope shapes.
// Purpose: Validate inbound envelopes and describe every failure precisely.
// Dependencies: humanity-contract, serde, serde_json, serde_stacker, thiserror
// ============================================================================

//! ## Overview
//! One request envelope per line:
//! `{"id"?: string, "type": "list_actions" | "invoke", "payload"?: any}`.
//! Envelope and invoke payload shapes are checked field by field; every
//! problem found is reported as a [`ProtocolIssue`] with a machine-readable
//! code and a path, so a client can fix all of them in one round trip.
//!
//! Unknown envelope members are ignored. Lines are parsed without a nesting
//! depth limit; the line size ceiling bounds the depth instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use humanity_contract::ActionInput;
use humanity_contract::ContractError;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::de::IgnoredAny;
use serde_json::Value;
use thiserror::Error;

use crate::router::DispatchError;

// ============================================================================
// SECTION: Request Shapes
// ============================================================================

/// Request type named by an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    /// List registered actions.
    ListActions,
    /// Invoke one action.
    Invoke,
}

impl RequestType {
    /// Every accepted wire name, in documentation order.
    const NAMES: [&'static str; 2] = ["list_actions", "invoke"];

    /// Parses a wire name.
    fn parse(value: &str) -> Option<Self> {
        match value {
            "list_actions" => Some(Self::ListActions),
            "invoke" => Some(Self::Invoke),
            _ => None,
        }
    }
}

/// Parsed request envelope, borrowing its payload from the request line.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<'a> {
    /// Client correlation identifier.
    pub id: Option<String>,
    /// Request type.
    pub request_type: RequestType,
    /// Request payload; absent when the member was omitted.
    pub payload: Option<&'a Value>,
}

/// Parsed `invoke` payload, borrowing its input from the request line.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest<'a> {
    /// Action identifier (non-empty).
    pub action: String,
    /// Action input object.
    pub input: &'a ActionInput,
}

// ============================================================================
// SECTION: Issues
// ============================================================================

/// Machine-readable issue classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Value has the wrong JSON type, or a required member is absent.
    InvalidType,
    /// String is not one of the accepted values.
    InvalidEnumValue,
    /// String is shorter than allowed.
    TooSmall,
}

/// One envelope or payload shape problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolIssue {
    /// Issue classification.
    pub code: IssueCode,
    /// Member path from the checked value's root.
    pub path: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

impl ProtocolIssue {
    /// Builds an issue for an absent required member.
    fn required(path: &[&str]) -> Self {
        Self {
            code: IssueCode::InvalidType,
            path: owned_path(path),
            message: "Required".to_string(),
        }
    }

    /// Builds an issue for a value of the wrong JSON type.
    fn wrong_type(path: &[&str], expected: &str, received: &Value) -> Self {
        Self {
            code: IssueCode::InvalidType,
            path: owned_path(path),
            message: format!("Expected {expected}, received {}", json_type_name(received)),
        }
    }
}

/// Envelope rejection with the identifier recovered from the line, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeRejection {
    /// Identifier, echoed when it was a string.
    pub id: Option<String>,
    /// Every shape problem found.
    pub issues: Vec<ProtocolIssue>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Per-line failures, each rendered as an `ok: false` response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Line exceeds the size ceiling.
    #[error("Request exceeds maximum size ({} KB)", .limit / 1024)]
    FrameTooLarge {
        /// Ceiling in bytes.
        limit: usize,
    },
    /// Line is not valid UTF-8 JSON.
    #[error("Malformed JSON request")]
    MalformedJson,
    /// Envelope shape is invalid.
    #[error("Invalid request envelope")]
    InvalidEnvelope(EnvelopeRejection),
    /// `invoke` payload shape is invalid.
    #[error("Invalid invoke payload")]
    InvalidInvokePayload(Vec<ProtocolIssue>),
    /// Dispatch failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// The contract table failed its listing check.
    #[error(transparent)]
    Registry(#[from] ContractError),
    /// A response payload could not be encoded.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProtocolError {
    /// Returns a stable label for audit and metrics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::FrameTooLarge {
                ..
            } => "frame_too_large",
            Self::MalformedJson => "malformed_json",
            Self::InvalidEnvelope(_) => "invalid_envelope",
            Self::InvalidInvokePayload(_) => "invalid_invoke_payload",
            Self::Dispatch(err) => err.kind_label(),
            Self::Registry(_) => "registry_invalid",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns the structured issues carried by shape failures.
    #[must_use]
    pub fn issues(&self) -> Option<&[ProtocolIssue]> {
        match self {
            Self::InvalidEnvelope(rejection) => Some(&rejection.issues),
            Self::InvalidInvokePayload(issues) => Some(issues),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Response Envelope
// ============================================================================

/// Outbound response envelope. Absent members are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    /// Identifier echoed from the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Success flag; governs whether `data` or `error` is present.
    pub ok: bool,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured shape issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<ProtocolIssue>>,
}

impl ResponseEnvelope {
    /// Builds a success response.
    #[must_use]
    pub const fn success(id: Option<String>, data: Value) -> Self {
        Self {
            id,
            ok: true,
            data: Some(data),
            error: None,
            issues: None,
        }
    }

    /// Builds a failure response from a protocol error.
    #[must_use]
    pub fn failure(id: Option<String>, err: &ProtocolError) -> Self {
        Self {
            id,
            ok: false,
            data: None,
            error: Some(err.to_string()),
            issues: err.issues().map(<[ProtocolIssue]>::to_vec),
        }
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Checks the envelope shape of a parsed JSON line.
///
/// # Errors
///
/// Returns [`EnvelopeRejection`] listing every shape problem.
pub fn parse_envelope(value: &Value) -> Result<Envelope<'_>, EnvelopeRejection> {
    let Some(object) = value.as_object() else {
        return Err(EnvelopeRejection {
            id: None,
            issues: vec![ProtocolIssue::wrong_type(&[], "object", value)],
        });
    };
    let mut issues = Vec::new();

    let id = match object.get("id") {
        None => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(other) => {
            issues.push(ProtocolIssue::wrong_type(&["id"], "string", other));
            None
        }
    };

    let request_type = match object.get("type") {
        None => {
            issues.push(ProtocolIssue::required(&["type"]));
            None
        }
        Some(Value::String(name)) => {
            let parsed = RequestType::parse(name);
            if parsed.is_none() {
                issues.push(ProtocolIssue {
                    code: IssueCode::InvalidEnumValue,
                    path: owned_path(&["type"]),
                    message: format!(
                        "Invalid enum value. Expected {}, received '{name}'",
                        RequestType::NAMES.map(|n| format!("'{n}'")).join(" | ")
                    ),
                });
            }
            parsed
        }
        Some(other) => {
            issues.push(ProtocolIssue::wrong_type(&["type"], "'list_actions' | 'invoke'", other));
            None
        }
    };

    match request_type {
        Some(request_type) if issues.is_empty() => Ok(Envelope {
            id,
            request_type,
            payload: object.get("payload"),
        }),
        _ => Err(EnvelopeRejection {
            id,
            issues,
        }),
    }
}

/// Checks the shape of an `invoke` payload.
///
/// # Errors
///
/// Returns every shape problem found.
pub fn parse_invoke(payload: Option<&Value>) -> Result<InvokeRequest<'_>, Vec<ProtocolIssue>> {
    let Some(payload) = payload else {
        return Err(vec![ProtocolIssue::required(&[])]);
    };
    let Some(object) = payload.as_object() else {
        return Err(vec![ProtocolIssue::wrong_type(&[], "object", payload)]);
    };
    let mut issues = Vec::new();

    let action = match object.get("action") {
        None => {
            issues.push(ProtocolIssue::required(&["action"]));
            None
        }
        Some(Value::String(action)) if action.is_empty() => {
            issues.push(ProtocolIssue {
                code: IssueCode::TooSmall,
                path: owned_path(&["action"]),
                message: "String must contain at least 1 character(s)".to_string(),
            });
            None
        }
        Some(Value::String(action)) => Some(action.clone()),
        Some(other) => {
            issues.push(ProtocolIssue::wrong_type(&["action"], "string", other));
            None
        }
    };

    let input = match object.get("input") {
        None => {
            issues.push(ProtocolIssue::required(&["input"]));
            None
        }
        Some(Value::Object(input)) => Some(input),
        Some(other) => {
            issues.push(ProtocolIssue::wrong_type(&["input"], "object", other));
            None
        }
    };

    match (action, input) {
        (Some(action), Some(input)) => Ok(InvokeRequest {
            action,
            input,
        }),
        _ => Err(issues),
    }
}

// ============================================================================
// SECTION: Line Parsing
// ============================================================================

/// Parses one request line as JSON without a nesting depth limit.
///
/// Syntax is checked in a first pass that builds no tree, so a rejected line
/// never leaves a partially built value behind.
///
/// # Errors
///
/// Returns the JSON syntax error.
pub fn parse_line(line: &[u8]) -> Result<Value, serde_json::Error> {
    deserialize_unbounded::<IgnoredAny>(line)?;
    deserialize_unbounded::<Value>(line)
}

/// Drops a parsed value without recursing into nested members.
pub fn release_value(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(members) => pending.extend(members.into_values()),
            _ => {}
        }
    }
}

/// Deserializes a complete document, growing the stack as nesting deepens.
fn deserialize_unbounded<T: DeserializeOwned>(line: &[u8]) -> Result<T, serde_json::Error> {
    let mut json = serde_json::Deserializer::from_slice(line);
    json.disable_recursion_limit();
    let value = <T as Deserialize>::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

/// Returns the JSON type name used in issue messages.
const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Converts a static path into owned segments.
fn owned_path(path: &[&str]) -> Vec<String> {
    path.iter().map(|segment| (*segment).to_string()).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use serde_json::Value;
    use serde_json::json;

    use super::IssueCode;
    use super::ProtocolError;
    use super::RequestType;
    use super::ResponseEnvelope;
    use super::parse_envelope;
    use super::parse_invoke;
    use super::parse_line;
    use super::release_value;

    #[test]
    fn envelope_accepts_both_request_types() {
        let list_line = json!({ "type": "list_actions", "payload": 5 });
        let list = parse_envelope(&list_line).unwrap();
        assert_eq!(list.request_type, RequestType::ListActions);
        assert_eq!(list.id, None);
        assert_eq!(list.payload, Some(&json!(5)));
        let invoke_line = json!({ "id": "a", "type": "invoke" });
        let invoke = parse_envelope(&invoke_line).unwrap();
        assert_eq!(invoke.request_type, RequestType::Invoke);
        assert_eq!(invoke.id.as_deref(), Some("a"));
        assert!(invoke.payload.is_none());
    }

    #[test]
    fn unknown_type_is_an_enum_issue_and_keeps_id() {
        let rejection = parse_envelope(&json!({ "id": "r1", "type": "delete" })).unwrap_err();
        assert_eq!(rejection.id.as_deref(), Some("r1"));
        assert_eq!(rejection.issues.len(), 1);
        assert_eq!(rejection.issues[0].code, IssueCode::InvalidEnumValue);
        assert_eq!(rejection.issues[0].path, vec!["type".to_string()]);
        assert_eq!(
            rejection.issues[0].message,
            "Invalid enum value. Expected 'list_actions' | 'invoke', received 'delete'"
        );
    }

    #[test]
    fn non_string_id_and_missing_type_are_both_reported() {
        let rejection = parse_envelope(&json!({ "id": 7 })).unwrap_err();
        assert_eq!(rejection.id, None);
        assert_eq!(rejection.issues.len(), 2);
        assert_eq!(rejection.issues[0].message, "Expected string, received number");
        assert_eq!(rejection.issues[1].message, "Required");
    }

    #[test]
    fn non_object_envelope_is_rejected() {
        let rejection = parse_envelope(&json!([1, 2])).unwrap_err();
        assert_eq!(rejection.issues[0].message, "Expected object, received array");
        assert!(rejection.issues[0].path.is_empty());
    }

    #[test]
    fn invoke_payload_requires_action_and_object_input() {
        let issues = parse_invoke(Some(&json!({ "action": "", "input": [] }))).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].code, IssueCode::TooSmall);
        assert_eq!(issues[1].message, "Expected object, received array");
        assert_eq!(parse_invoke(None).unwrap_err()[0].message, "Required");
    }

    #[test]
    fn invoke_payload_parses() {
        let payload = json!({ "action": "wcagaaa_check", "input": { "target": "x" } });
        let request = parse_invoke(Some(&payload)).unwrap();
        assert_eq!(request.action, "wcagaaa_check");
        assert_eq!(request.input["target"], "x");
    }

    #[test]
    fn line_parsing_has_no_depth_limit() {
        let line = format!("{}1{}", "[".repeat(1000), "]".repeat(1000));
        let mut value = parse_line(line.as_bytes()).unwrap();
        let mut depth = 0;
        while let Value::Array(mut items) = value {
            value = items.pop().unwrap();
            depth += 1;
        }
        assert_eq!(depth, 1000);
        assert_eq!(value, json!(1));
        assert!(parse_line(b"{} {}").is_err());
        assert!(parse_line(b"").is_err());
    }

    #[test]
    fn release_handles_deep_trees() {
        let mut value = json!({ "leaf": true });
        for _ in 0 .. 200_000 {
            value = Value::Array(vec![value]);
        }
        release_value(value);
    }

    #[test]
    fn failure_envelope_omits_absent_members() {
        let response = ResponseEnvelope::failure(None, &ProtocolError::MalformedJson);
        let rendered = serde_json::to_string(&response).unwrap();
        assert_eq!(rendered, r#"{"ok":false,"error":"Malformed JSON request"}"#);
    }

    #[test]
    fn frame_error_reports_limit_in_kilobytes() {
        let err = ProtocolError::FrameTooLarge {
            limit: 512 * 1024,
        };
        assert_eq!(err.to_string(), "Request exceeds maximum size (512 KB)");
    }
}
