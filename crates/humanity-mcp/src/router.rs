// crates/humanity-mcp/src/router.rs
// ============================================================================
// Module: Action Router
// Description: Registry lookup, validation gate, and handler dispatch.
// Purpose: Turn an action name and input into a response or a typed error.
// Dependencies: humanity-contract, thiserror
// ============================================================================

//! ## Overview
//! [`ActionRouter::invoke`] is the single dispatch path. It looks the action
//! up in the contract registry, validates the input against the registered
//! input schema, and calls the bound handler with the registered safety
//! boundary. Handler output is returned as-is.
//!
//! Internal defects (a registered action without a handler, or a handler
//! response that breaks the response invariants) surface to the caller as
//! errors and are also recorded as `dispatch_defect` diagnostics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use humanity_contract::ActionContract;
use humanity_contract::ActionInput;
use humanity_contract::ContractError;
use humanity_contract::ContractRegistry;
use humanity_contract::InvokeResponse;
use thiserror::Error;

use crate::audit::DiagnosticEvent;
use crate::audit::DiagnosticKind;
use crate::audit::McpAuditSink;
use crate::audit::McpNoopAuditSink;
use crate::handlers::HandlerMap;
use crate::handlers::builtin_handlers;
use crate::validation::FieldViolation;
use crate::validation::SchemaValidator;
use crate::validation::ValidationResult;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Dispatch failures returned to the caller as `ok: false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The action is not registered.
    #[error("Unknown action: '{0}'. Call list_actions to see available actions.")]
    UnknownAction(String),
    /// The input failed schema validation.
    #[error("Input validation failed for action '{action}': {}", join_violations(.errors))]
    InputValidation {
        /// Action identifier.
        action: String,
        /// Violations in detection order.
        errors: Vec<FieldViolation>,
    },
    /// The action is registered but no handler is bound.
    #[error(
        "Action '{0}' is registered but has no handler implementation. This should not happen — please report this as a bug."
    )]
    NotImplemented(String),
    /// The handler returned a response that breaks the response invariants.
    #[error("Action '{action}' produced an invalid response: {reason}. Please report this as a bug.")]
    HandlerContractViolation {
        /// Action identifier.
        action: String,
        /// Violated invariant.
        reason: &'static str,
    },
}

/// Joins violation messages with `; `.
fn join_violations(errors: &[FieldViolation]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl DispatchError {
    /// Returns a stable label for audit and metrics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::UnknownAction(_) => "unknown_action",
            Self::InputValidation {
                ..
            } => "input_validation",
            Self::NotImplemented(_) => "not_implemented",
            Self::HandlerContractViolation {
                ..
            } => "handler_contract_violation",
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Dispatches validated invocations to action handlers.
pub struct ActionRouter {
    /// Contract registry shared with the server.
    registry: Arc<ContractRegistry>,
    /// Input schema validator.
    validator: SchemaValidator,
    /// Handler table keyed by action identifier.
    handlers: HandlerMap,
    /// Diagnostic sink.
    audit: Arc<dyn McpAuditSink>,
}

impl ActionRouter {
    /// Creates a router from its parts.
    #[must_use]
    pub fn new(
        registry: Arc<ContractRegistry>,
        validator: SchemaValidator,
        handlers: HandlerMap,
        audit: Arc<dyn McpAuditSink>,
    ) -> Self {
        Self {
            registry,
            validator,
            handlers,
            audit,
        }
    }

    /// Creates a router over the built-in registry, bundled schemas, and
    /// built-in handlers, with diagnostics discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] when the built-in registry is inconsistent.
    pub fn builtin() -> Result<Self, ContractError> {
        Ok(Self::new(
            Arc::new(ContractRegistry::builtin()?),
            SchemaValidator::bundled(),
            builtin_handlers(),
            Arc::new(McpNoopAuditSink),
        ))
    }

    /// Returns the contract registry.
    #[must_use]
    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Invokes an action with the given input.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the action is unknown, the input is
    /// invalid, no handler is bound, or the handler response is defective.
    pub fn invoke(
        &self,
        action: &str,
        input: &ActionInput,
    ) -> Result<InvokeResponse, DispatchError> {
        let contract = self
            .registry
            .lookup(action)
            .ok_or_else(|| DispatchError::UnknownAction(action.to_string()))?;
        if let ValidationResult::Invalid {
            errors,
        } = self.validate(contract, input)
        {
            return Err(DispatchError::InputValidation {
                action: action.to_string(),
                errors,
            });
        }
        let Some(handler) = self.handlers.get(action) else {
            let err = DispatchError::NotImplemented(action.to_string());
            self.diagnose(DiagnosticKind::DispatchDefect, action, &err);
            return Err(err);
        };
        let response = handler.invoke(input, &contract.safety_boundary);
        if let Err(err) = check_response(contract, &response) {
            self.diagnose(DiagnosticKind::DispatchDefect, action, &err);
            return Err(err);
        }
        Ok(response)
    }

    /// Validates input against the contract's input schema.
    ///
    /// Schema load failures pass through and are recorded as diagnostics.
    fn validate(&self, contract: &ActionContract, input: &ActionInput) -> ValidationResult {
        match self.validator.check(&contract.input_schema_path, input) {
            Ok(result) => result,
            Err(err) => {
                self.diagnose(DiagnosticKind::SchemaUnavailable, &contract.action, &err);
                ValidationResult::Valid
            }
        }
    }

    /// Records a diagnostic event.
    fn diagnose(&self, kind: DiagnosticKind, action: &str, detail: &impl ToString) {
        self.audit.record_diagnostic(&DiagnosticEvent::new(kind, action, detail.to_string()));
    }
}

/// Checks handler-side response invariants.
fn check_response(
    contract: &ActionContract,
    response: &InvokeResponse,
) -> Result<(), DispatchError> {
    let reason = if response.boundary_notice != contract.safety_boundary {
        "boundaryNotice does not match the registered safety boundary"
    } else if response.assumptions.is_empty() {
        "assumptions must not be empty"
    } else {
        return Ok(());
    };
    Err(DispatchError::HandlerContractViolation {
        action: contract.action.clone(),
        reason,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
