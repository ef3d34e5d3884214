use jsonschema::error::{TypeKind, ValidationErrorKind};
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use crate::error::SchemaLintError;
use crate::messages::join_with_or;
use crate::pointer_map::escape_segment;

/// Source label used when the schema carries no `title`.
pub const DEFAULT_SOURCE: &str = "json-schema";

/// One schema violation, reduced to the attributes the diagnostic pipeline
/// consumes. Produced fresh on every validation call, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredError {
    pub kind: ErrorKind,
    /// Raw engine message, used as the fallback display text.
    pub message: String,
    /// Document-relative JSON Pointer; empty means the whole document.
    pub pointer: String,
}

/// Semantic kind of a violation. The engine reports these as loosely shaped
/// payloads; collapsing them into one tagged union keeps the path resolver
/// and message rewriter exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Value matched none of the union alternatives (`oneOf`).
    OneOf { alternatives: Vec<String> },
    /// Value has the wrong type.
    Type {
        expected: Vec<String>,
        received: String,
    },
    /// Object is missing a required property.
    Required { property: String },
    /// Object carries a property the schema rejects.
    AdditionalProperty { property: String },
    Other,
}

impl StructuredError {
    /// Property name carried by the error, when it has one.
    pub fn property(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Required { property } | ErrorKind::AdditionalProperty { property } => {
                Some(property)
            }
            _ => None,
        }
    }

    /// Whether the diagnostic should underline the key token rather than the
    /// value. Rejected additional properties point at the offending key.
    pub fn targets_key(&self) -> bool {
        matches!(self.kind, ErrorKind::AdditionalProperty { .. })
    }
}

/// Validates data values against one schema. Compiled once per schema and
/// reused across validation passes; holds no per-call state.
pub struct SchemaValidator {
    validator: jsonschema::Validator,
    title: String,
}

impl SchemaValidator {
    /// Compiles `schema` for reuse. Malformed schemas are a setup-time
    /// concern and surface here, never during per-document validation.
    pub fn new(schema: &Value) -> Result<Self, SchemaLintError> {
        trace!("Compiling schema validator");
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaLintError::InvalidSchema(e.to_string()))?;

        let title = schema
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SOURCE)
            .to_owned();

        debug!(title = %title, "Schema validator created");
        Ok(Self { validator, title })
    }

    /// Schema title, used as the diagnostic source label.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Runs validation and returns structured errors in engine order. Never
    /// fails: an internally failing engine degrades to zero errors.
    #[instrument(skip(self, data))]
    pub fn validate(&self, data: &Value) -> Vec<StructuredError> {
        let mut errors = Vec::new();
        for error in self.validator.iter_errors(data) {
            convert(error, data, &mut errors);
        }

        if errors.is_empty() {
            trace!("Schema validation passed with no errors");
        } else {
            warn!(error_count = errors.len(), "Schema validation found errors");
        }
        errors
    }
}

/// Converts one engine error into structured form. An additional-properties
/// error naming several rejected keys expands into one entry per key so each
/// key gets its own diagnostic.
fn convert(error: jsonschema::ValidationError, data: &Value, out: &mut Vec<StructuredError>) {
    let pointer = error.instance_path().as_str().to_owned();
    let message = error.to_string();

    match error.kind() {
        ValidationErrorKind::Type { kind } => {
            out.push(StructuredError {
                kind: ErrorKind::Type {
                    expected: expected_types(kind),
                    received: received_type(data, &pointer),
                },
                message,
                pointer,
            });
        }
        ValidationErrorKind::OneOfNotValid { context } => {
            let alternatives = one_of_alternatives(context);
            // a union error with no type expectations falls back to the
            // generic message cleanup
            let kind = if alternatives.is_empty() {
                ErrorKind::Other
            } else {
                ErrorKind::OneOf { alternatives }
            };
            out.push(StructuredError {
                kind,
                message,
                pointer,
            });
        }
        ValidationErrorKind::Required { property } => {
            let property = property
                .as_str()
                .map(str::to_owned)
                .unwrap_or_else(|| property.to_string());
            out.push(StructuredError {
                kind: ErrorKind::Required { property },
                message,
                pointer,
            });
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            for property in unexpected {
                out.push(StructuredError {
                    kind: ErrorKind::AdditionalProperty {
                        property: property.clone(),
                    },
                    message: message.clone(),
                    pointer: format!("{pointer}/{}", escape_segment(property)),
                });
            }
        }
        _ => {
            trace!(pointer = %pointer, "No dedicated handling for error kind");
            out.push(StructuredError {
                kind: ErrorKind::Other,
                message,
                pointer,
            });
        }
    }
}

fn expected_types(kind: &TypeKind) -> Vec<String> {
    match kind {
        TypeKind::Single(t) => vec![t.to_string()],
        TypeKind::Multiple(types) => types.iter().map(|t| t.to_string()).collect(),
    }
}

/// Names the type of the node the error points at, from the parsed data.
fn received_type(data: &Value, pointer: &str) -> String {
    let node = if pointer.is_empty() {
        Some(data)
    } else {
        data.pointer(pointer)
    };
    match node {
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
        None => "unknown",
    }
    .to_owned()
}

/// One display alternative per failed union branch, taken from each branch's
/// type expectation.
fn one_of_alternatives(context: &[Vec<jsonschema::ValidationError>]) -> Vec<String> {
    context
        .iter()
        .filter_map(|branch| {
            branch.iter().find_map(|error| match error.kind() {
                ValidationErrorKind::Type { kind } => Some(join_with_or(&expected_types(kind))),
                _ => None,
            })
        })
        .collect()
}
