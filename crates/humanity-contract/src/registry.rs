// crates/humanity-contract/src/registry.rs
// ============================================================================
// Module: Contract Registry
// Description: Immutable table of action contracts.
// Purpose: Validate and serve action metadata for dispatch and listing.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The registry maps an action identifier to its [`ActionContract`]. It is
//! validated once at construction and re-validated before every listing so
//! a record is never exposed without satisfying the table invariants.
//!
//! ## Invariants
//! - Action identifiers and skill names are unique across the table.
//! - Every field is non-empty.
//! - Schema paths are relative, traversal-free, and rooted under
//!   [`SCHEMA_DIR_PREFIX`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Component;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::actions::ActionName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory prefix every schema path must live under.
pub const SCHEMA_DIR_PREFIX: &str = "schemas/";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Registry entry binding an action to its schemas and safety boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionContract {
    /// Owning skill name.
    pub skill: String,
    /// Action identifier.
    pub action: String,
    /// Input schema path relative to the schema root.
    pub input_schema_path: String,
    /// Output schema path relative to the schema root.
    pub output_schema_path: String,
    /// Mandatory safety boundary text.
    pub safety_boundary: String,
}

impl ActionContract {
    /// Builds the canonical contract for a built-in action.
    #[must_use]
    pub fn for_action(action: ActionName) -> Self {
        let skill = action.skill();
        Self {
            skill: skill.to_string(),
            action: action.as_str().to_string(),
            input_schema_path: format!("{SCHEMA_DIR_PREFIX}{skill}.input.json"),
            output_schema_path: format!("{SCHEMA_DIR_PREFIX}{skill}.output.json"),
            safety_boundary: action.safety_boundary().to_string(),
        }
    }
}

/// Contract table violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The table has no entries.
    #[error("contract registry is empty")]
    Empty,
    /// A required field is empty.
    #[error("contract #{index} has empty field '{field}'")]
    EmptyField {
        /// Position of the offending contract.
        index: usize,
        /// Field name.
        field: &'static str,
    },
    /// An action identifier appears more than once.
    #[error("duplicate action identifier '{0}'")]
    DuplicateAction(String),
    /// A skill name appears more than once.
    #[error("duplicate skill name '{0}'")]
    DuplicateSkill(String),
    /// A schema path escapes the schema directory.
    #[error("schema path '{path}' for action '{action}' must be under schemas/")]
    SchemaPathOutsideRoot {
        /// Action identifier.
        action: String,
        /// Offending path.
        path: String,
    },
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Validated, read-only action registry.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    /// Contracts in canonical order.
    contracts: Vec<ActionContract>,
    /// Action identifier to position in `contracts`.
    index: BTreeMap<String, usize>,
}

impl ContractRegistry {
    /// Builds a registry after validating every contract.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] when any table invariant is violated.
    pub fn new(contracts: Vec<ActionContract>) -> Result<Self, ContractError> {
        validate_all(&contracts)?;
        let index = contracts
            .iter()
            .enumerate()
            .map(|(position, contract)| (contract.action.clone(), position))
            .collect();
        Ok(Self {
            contracts,
            index,
        })
    }

    /// Builds the registry for the built-in actions.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] when the built-in table is inconsistent.
    pub fn builtin() -> Result<Self, ContractError> {
        Self::new(builtin_contracts())
    }

    /// Looks up a contract by action identifier.
    #[must_use]
    pub fn lookup(&self, action: &str) -> Option<&ActionContract> {
        self.index.get(action).and_then(|position| self.contracts.get(*position))
    }

    /// Returns every contract in canonical order.
    #[must_use]
    pub fn all(&self) -> &[ActionContract] {
        &self.contracts
    }

    /// Returns the listing after re-checking the table invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] when a record fails validation.
    pub fn validated_listing(&self) -> Result<&[ActionContract], ContractError> {
        validate_all(&self.contracts)?;
        Ok(&self.contracts)
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Returns true when no actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

/// Returns the built-in contract table in canonical order.
#[must_use]
pub fn builtin_contracts() -> Vec<ActionContract> {
    ActionName::all().iter().copied().map(ActionContract::for_action).collect()
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates every contract against the registry invariants.
///
/// # Errors
///
/// Returns the first [`ContractError`] found, in table order.
pub fn validate_all(contracts: &[ActionContract]) -> Result<(), ContractError> {
    if contracts.is_empty() {
        return Err(ContractError::Empty);
    }
    let mut actions = BTreeSet::new();
    let mut skills = BTreeSet::new();
    for (index, contract) in contracts.iter().enumerate() {
        ensure_non_empty(index, "skill", &contract.skill)?;
        ensure_non_empty(index, "action", &contract.action)?;
        ensure_non_empty(index, "inputSchemaPath", &contract.input_schema_path)?;
        ensure_non_empty(index, "outputSchemaPath", &contract.output_schema_path)?;
        ensure_non_empty(index, "safetyBoundary", &contract.safety_boundary)?;
        if !actions.insert(contract.action.as_str()) {
            return Err(ContractError::DuplicateAction(contract.action.clone()));
        }
        if !skills.insert(contract.skill.as_str()) {
            return Err(ContractError::DuplicateSkill(contract.skill.clone()));
        }
        ensure_schema_path(&contract.action, &contract.input_schema_path)?;
        ensure_schema_path(&contract.action, &contract.output_schema_path)?;
    }
    Ok(())
}

/// Rejects empty or whitespace-only fields.
fn ensure_non_empty(index: usize, field: &'static str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::EmptyField {
            index,
            field,
        });
    }
    Ok(())
}

/// Requires a lexically contained path under the schema directory.
fn ensure_schema_path(action: &str, path: &str) -> Result<(), ContractError> {
    let contained = path.strip_prefix(SCHEMA_DIR_PREFIX).is_some_and(|rest| {
        !rest.is_empty()
            && Path::new(rest).components().all(|component| matches!(component, Component::Normal(_)))
    });
    if contained {
        Ok(())
    } else {
        Err(ContractError::SchemaPathOutsideRoot {
            action: action.to_string(),
            path: path.to_string(),
        })
    }
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

    use std::collections::BTreeSet;

    use super::ActionContract;
    use super::ContractError;
    use super::ContractRegistry;
    use super::builtin_contracts;
    use super::validate_all;

    #[test]
    fn builtin_registry_has_ten_unique_actions() {
        let registry = ContractRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 10);
        let actions: BTreeSet<_> = registry.all().iter().map(|c| c.action.as_str()).collect();
        let skills: BTreeSet<_> = registry.all().iter().map(|c| c.skill.as_str()).collect();
        assert_eq!(actions.len(), 10);
        assert_eq!(skills.len(), 10);
    }

    #[test]
    fn lookup_finds_registered_actions_only() {
        let registry = ContractRegistry::builtin().unwrap();
        let contract = registry.lookup("supportive_reply").unwrap();
        assert_eq!(contract.skill, "supportive-conversation");
        assert_eq!(contract.input_schema_path, "schemas/supportive-conversation.input.json");
        assert!(registry.lookup("not_a_real_action").is_none());
        assert!(registry.lookup("").is_none());
    }

    #[test]
    fn listing_serializes_camel_case_fields() {
        let registry = ContractRegistry::builtin().unwrap();
        let listing = serde_json::to_value(registry.validated_listing().unwrap()).unwrap();
        let first = &listing[0];
        assert_eq!(first["action"], "wcagaaa_check");
        assert!(first.get("inputSchemaPath").is_some());
        assert!(first.get("outputSchemaPath").is_some());
        assert!(first.get("safetyBoundary").is_some());
        assert!(first.get("input_schema_path").is_none());
    }

    #[test]
    fn duplicate_action_is_rejected() {
        let mut contracts = builtin_contracts();
        let mut copy = contracts[0].clone();
        copy.skill = "another-skill".to_string();
        contracts.push(copy);
        assert_eq!(
            validate_all(&contracts),
            Err(ContractError::DuplicateAction("wcagaaa_check".to_string()))
        );
    }

    #[test]
    fn duplicate_skill_is_rejected() {
        let mut contracts = builtin_contracts();
        let mut copy = contracts[1].clone();
        copy.action = "another_action".to_string();
        contracts.push(copy);
        assert!(matches!(validate_all(&contracts), Err(ContractError::DuplicateSkill(_))));
    }

    #[test]
    fn empty_safety_boundary_is_rejected() {
        let mut contracts = builtin_contracts();
        contracts[2].safety_boundary = "   ".to_string();
        assert_eq!(
            validate_all(&contracts),
            Err(ContractError::EmptyField {
                index: 2,
                field: "safetyBoundary",
            })
        );
    }

    #[test]
    fn schema_paths_must_stay_under_schema_dir() {
        for path in ["other/x.json", "schemas/../secret.json", "schemas/", "/schemas/x.json"] {
            let contract = ActionContract {
                skill: "s".to_string(),
                action: "a".to_string(),
                input_schema_path: path.to_string(),
                output_schema_path: "schemas/s.output.json".to_string(),
                safety_boundary: "b".to_string(),
            };
            assert!(
                matches!(
                    validate_all(&[contract]),
                    Err(ContractError::SchemaPathOutsideRoot { .. })
                ),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(ContractRegistry::new(Vec::new()), Err(ContractError::Empty)));
    }
}
