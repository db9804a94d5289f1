// crates/humanity-mcp/src/validation.rs
// ============================================================================
// Module: Schema Validator
// Description: Minimal JSON-Schema subset validation for action inputs.
// Purpose: Reject malformed action inputs before any handler runs.
// Dependencies: humanity-contract, humanity-config, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Input schemas are read from disk relative to a schema root and interpreted
//! through a small subset of JSON Schema: top-level `required` and
//! `properties`, and per-property `type` and `enum`. Every other keyword is
//! ignored.
//!
//! A schema that cannot be loaded (missing, unreadable, oversized, escaping
//! the root, or malformed) is treated as absent and the input passes. Callers
//! that need to observe that case use [`SchemaValidator::check`].
//!
//! ## Invariants
//! - Required fields that are absent, `null`, or the empty string share one
//!   violation class.
//! - Enumeration membership is checked before the primitive type; an
//!   enumeration miss suppresses the type check for that field.
//! - Fields absent from the input are never type checked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use humanity_config::DEFAULT_MAX_SCHEMA_BYTES;
use humanity_config::SchemaConfig;
use humanity_contract::ActionInput;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Schema Model
// ============================================================================

/// Primitive type constraint of a schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// No type constraint; only the enumeration applies.
    Any,
}

impl FieldKind {
    /// Maps a schema `type` keyword to a kind. Unknown or non-string values
    /// fall back to [`FieldKind::Any`].
    fn from_schema(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("string") => Self::String,
            Some("number") => Self::Number,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array,
            Some("object") => Self::Object,
            _ => Self::Any,
        }
    }

    /// Returns true when `value` satisfies the kind.
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }

    /// Returns the article-qualified noun used in violation messages.
    const fn expectation(self) -> Option<&'static str> {
        match self {
            Self::String => Some("a string"),
            Self::Number => Some("a number"),
            Self::Boolean => Some("a boolean"),
            Self::Array => Some("an array"),
            Self::Object => Some("an object"),
            Self::Any => None,
        }
    }
}

/// Constraint attached to one schema property.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Primitive type constraint.
    pub kind: FieldKind,
    /// Allowed values, when the property declares an `enum`.
    pub allowed: Option<Vec<Value>>,
}

impl FieldSpec {
    /// Interprets one entry of a schema `properties` object.
    fn from_schema(spec: &Value) -> Self {
        let allowed = spec.get("enum").and_then(Value::as_array).cloned();
        Self {
            kind: FieldKind::from_schema(spec.get("type")),
            allowed,
        }
    }
}

/// Parsed input schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    /// Required field names in declaration order.
    pub required: Vec<String>,
    /// Property constraints in document order.
    pub properties: Vec<(String, FieldSpec)>,
}

impl InputSchema {
    /// Interprets a schema document.
    ///
    /// Missing `required` or `properties` members default to empty.
    /// Non-string entries of `required` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLoadError::Malformed`] when the document is not a JSON
    /// object.
    pub fn from_value(path: &str, document: &Value) -> Result<Self, SchemaLoadError> {
        let Some(root) = document.as_object() else {
            return Err(SchemaLoadError::Malformed {
                path: path.to_string(),
                message: "schema document must be an object".to_string(),
            });
        };
        let required = root
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        let properties = root
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props.iter().map(|(name, spec)| (name.clone(), FieldSpec::from_schema(spec))).collect()
            })
            .unwrap_or_default();
        Ok(Self {
            required,
            properties,
        })
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// One input field violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldViolation {
    /// Required field is absent, `null`, or the empty string.
    #[error("Required field '{field}' is missing or empty")]
    MissingOrEmpty {
        /// Field name.
        field: String,
    },
    /// Field value is not one of the allowed values.
    #[error("'{field}' must be one of: {}", .allowed.join(", "))]
    NotInEnum {
        /// Field name.
        field: String,
        /// Allowed values rendered for display.
        allowed: Vec<String>,
    },
    /// Field value has the wrong primitive type.
    #[error("'{field}' must be {expected}")]
    WrongType {
        /// Field name.
        field: String,
        /// Expected type, article-qualified.
        expected: &'static str,
    },
}

impl FieldViolation {
    /// Returns the offending field name.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingOrEmpty {
                field,
            }
            | Self::NotInEnum {
                field,
                ..
            }
            | Self::WrongType {
                field,
                ..
            } => field,
        }
    }
}

/// Outcome of validating one input against one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Input satisfies the schema (or no schema was available).
    Valid,
    /// Input violates the schema.
    Invalid {
        /// Violations in detection order.
        errors: Vec<FieldViolation>,
    },
}

impl ValidationResult {
    /// Returns true for [`ValidationResult::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns the rendered violation messages.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Valid => Vec::new(),
            Self::Invalid {
                errors,
            } => errors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Reasons a schema could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaLoadError {
    /// Schema path is absolute or contains traversal components.
    #[error("schema path '{0}' escapes the schema root")]
    OutsideRoot(String),
    /// Schema file could not be read.
    #[error("schema '{path}' could not be read: {message}")]
    Io {
        /// Schema path as registered.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// Schema file exceeds the size limit.
    #[error("schema '{path}' exceeds {limit} bytes")]
    TooLarge {
        /// Schema path as registered.
        path: String,
        /// Configured limit in bytes.
        limit: usize,
    },
    /// Schema file is not a JSON object.
    #[error("schema '{path}' is malformed: {message}")]
    Malformed {
        /// Schema path as registered.
        path: String,
        /// Parser error text.
        message: String,
    },
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validates action inputs against schema files under a root directory.
#[derive(Debug)]
pub struct SchemaValidator {
    /// Directory registry schema paths are resolved against.
    root: PathBuf,
    /// Maximum schema file size in bytes.
    max_schema_bytes: usize,
    /// Successfully parsed schemas, when caching is enabled.
    cache: Option<Mutex<BTreeMap<String, Arc<InputSchema>>>>,
}

impl SchemaValidator {
    /// Creates an uncached validator rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_schema_bytes: DEFAULT_MAX_SCHEMA_BYTES,
            cache: None,
        }
    }

    /// Creates a validator over the schema set shipped with this package.
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(bundled_schema_root())
    }

    /// Creates a validator from the `[schemas]` configuration section.
    #[must_use]
    pub fn from_config(config: &SchemaConfig) -> Self {
        let root = config.root.as_ref().map_or_else(bundled_schema_root, PathBuf::from);
        Self::new(root).with_max_schema_bytes(config.max_schema_bytes).with_cache(config.cache)
    }

    /// Sets the maximum schema file size.
    #[must_use]
    pub const fn with_max_schema_bytes(mut self, limit: usize) -> Self {
        self.max_schema_bytes = limit;
        self
    }

    /// Enables or disables the parsed-schema cache.
    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(|| Mutex::new(BTreeMap::new()));
        self
    }

    /// Returns the schema root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates `input` against the schema at `schema_path`.
    ///
    /// A schema that cannot be loaded yields [`ValidationResult::Valid`].
    #[must_use]
    pub fn validate(&self, schema_path: &str, input: &ActionInput) -> ValidationResult {
        self.check(schema_path, input).unwrap_or(ValidationResult::Valid)
    }

    /// Validates `input`, surfacing schema load failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLoadError`] when the schema cannot be loaded.
    pub fn check(
        &self,
        schema_path: &str,
        input: &ActionInput,
    ) -> Result<ValidationResult, SchemaLoadError> {
        let schema = self.load(schema_path)?;
        Ok(validate_against(&schema, input))
    }

    /// Loads and parses a schema, consulting the cache when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLoadError`] when the schema cannot be loaded.
    pub fn load(&self, schema_path: &str) -> Result<Arc<InputSchema>, SchemaLoadError> {
        if let Some(cache) = &self.cache {
            if let Ok(guard) = cache.lock() {
                if let Some(schema) = guard.get(schema_path) {
                    return Ok(Arc::clone(schema));
                }
            }
        }
        let schema = Arc::new(self.read_schema(schema_path)?);
        if let Some(cache) = &self.cache {
            if let Ok(mut guard) = cache.lock() {
                guard.insert(schema_path.to_string(), Arc::clone(&schema));
            }
        }
        Ok(schema)
    }

    /// Reads and parses a schema file from disk.
    fn read_schema(&self, schema_path: &str) -> Result<InputSchema, SchemaLoadError> {
        let relative = Path::new(schema_path);
        let contained = !schema_path.is_empty()
            && relative.components().all(|component| matches!(component, Component::Normal(_)));
        if !contained {
            return Err(SchemaLoadError::OutsideRoot(schema_path.to_string()));
        }
        let full = self.root.join(relative);
        let io_error = |err: std::io::Error| SchemaLoadError::Io {
            path: schema_path.to_string(),
            message: err.to_string(),
        };
        let metadata = fs::metadata(&full).map_err(io_error)?;
        let too_large = SchemaLoadError::TooLarge {
            path: schema_path.to_string(),
            limit: self.max_schema_bytes,
        };
        if usize::try_from(metadata.len()).map_or(true, |len| len > self.max_schema_bytes) {
            return Err(too_large);
        }
        let bytes = fs::read(&full).map_err(io_error)?;
        if bytes.len() > self.max_schema_bytes {
            return Err(too_large);
        }
        let document: Value =
            serde_json::from_slice(&bytes).map_err(|err| SchemaLoadError::Malformed {
                path: schema_path.to_string(),
                message: err.to_string(),
            })?;
        InputSchema::from_value(schema_path, &document)
    }
}

/// Returns the directory holding the bundled `schemas/` folder.
fn bundled_schema_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Validates `input` against an already parsed schema.
#[must_use]
pub fn validate_against(schema: &InputSchema, input: &ActionInput) -> ValidationResult {
    let mut errors = Vec::new();
    for field in &schema.required {
        let missing = match input.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(text)) => text.is_empty(),
            Some(_) => false,
        };
        if missing {
            errors.push(FieldViolation::MissingOrEmpty {
                field: field.clone(),
            });
        }
    }
    for (field, spec) in &schema.properties {
        if let Some(value) = input.get(field) {
            if let Some(violation) = check_field(field, spec, value) {
                errors.push(violation);
            }
        }
    }
    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid {
            errors,
        }
    }
}

/// Checks one present field, enumeration first.
fn check_field(field: &str, spec: &FieldSpec, value: &Value) -> Option<FieldViolation> {
    if let Some(allowed) = &spec.allowed {
        if !allowed.iter().any(|member| enum_member_matches(member, value)) {
            return Some(FieldViolation::NotInEnum {
                field: field.to_string(),
                allowed: allowed.iter().map(render_enum_value).collect(),
            });
        }
    }
    if spec.kind.accepts(value) {
        return None;
    }
    spec.kind.expectation().map(|expected| FieldViolation::WrongType {
        field: field.to_string(),
        expected,
    })
}

/// Compares an enumeration member with an input value; numbers compare by
/// numeric value, so `1` and `1.0` are the same member.
fn enum_member_matches(member: &Value, value: &Value) -> bool {
    match (member, value) {
        (Value::Number(left), Value::Number(right)) => {
            left == right || numeric_value_eq(left.as_f64(), right.as_f64())
        }
        _ => member == value,
    }
}

/// Returns true when both numbers are representable and numerically equal.
#[allow(clippy::float_cmp, reason = "Enumeration membership is exact numeric equality.")]
fn numeric_value_eq(left: Option<f64>, right: Option<f64>) -> bool {
    matches!((left, right), (Some(left), Some(right)) if left == right)
}

/// Renders an enumeration member the way it reads in documentation.
fn render_enum_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
