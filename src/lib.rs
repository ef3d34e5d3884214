//! Validates JSON document text against a JSON Schema and pins every
//! violation to the exact byte range of the offending token, so editors can
//! underline the right spot instead of the whole document.
//!
//! The pipeline: tokenize the text into a pointer map, parse the data value,
//! run schema validation, resolve each error to a document path, look the
//! path up in the map, rewrite the message, emit a [`Diagnostic`]. Errors
//! that resolve to no source range are dropped rather than surfaced without
//! a position.

pub mod diagnostic;
pub mod error;
pub mod error_path;
pub mod line_number;
pub mod messages;
pub mod parsing;
pub mod pointer_map;
pub mod validation;

use tracing::{debug, instrument, trace};

pub use crate::diagnostic::{Diagnostic, MessageSpan, Severity};
pub use crate::error::SchemaLintError;
pub use crate::parsing::{ParsedDocument, parse_document};
pub use crate::pointer_map::{PointerEntry, PointerMap};
pub use crate::validation::{ErrorKind, SchemaValidator, StructuredError};

/// Documents with fewer non-whitespace characters than this are treated as
/// intentionally empty and produce no diagnostics.
const MIN_DOCUMENT_LEN: usize = 3;

/// Replacement for the built-in message rewriter.
pub type FormatError = Box<dyn Fn(&StructuredError) -> String + Send + Sync>;

/// Replacement for the built-in text -> {data, pointer map} parser.
pub type DocumentParser = Box<dyn Fn(&str) -> ParsedDocument + Send + Sync>;

/// Injection points for hosts that need to swap out message formatting or
/// document parsing. The defaults cover strict JSON.
#[derive(Default)]
pub struct JsonLinterOptions {
    pub format_error: Option<FormatError>,
    pub parser: Option<DocumentParser>,
}

/// A schema-bound linter. Construct once per schema and reuse across
/// validation passes; each [`JsonLinter::lint`] call is an independent,
/// stateless pass over the current text.
pub struct JsonLinter {
    validator: SchemaValidator,
    options: JsonLinterOptions,
}

impl JsonLinter {
    /// Compiles `schema` and binds it to a linter with default options.
    pub fn new(schema: &serde_json::Value) -> Result<Self, SchemaLintError> {
        Self::with_options(schema, JsonLinterOptions::default())
    }

    pub fn with_options(
        schema: &serde_json::Value,
        options: JsonLinterOptions,
    ) -> Result<Self, SchemaLintError> {
        Ok(Self {
            validator: SchemaValidator::new(schema)?,
            options,
        })
    }

    /// Lints one document snapshot and returns diagnostics in validator
    /// order. Never fails and never panics: syntax errors, engine faults and
    /// unresolvable error paths all degrade to fewer diagnostics.
    #[instrument(skip(self, text), fields(content_len = text.len()))]
    pub fn lint(&self, text: &str) -> Vec<Diagnostic> {
        // ignore blank or still-being-typed documents
        if text.chars().filter(|c| !c.is_whitespace()).count() < MIN_DOCUMENT_LEN {
            trace!("Document below minimum length, skipping validation");
            return Vec::new();
        }

        let parsed = match &self.options.parser {
            Some(parser) => parser(text),
            None => parse_document(text),
        };

        let errors = match &parsed.data {
            Some(data) => self.validator.validate(data),
            None => {
                debug!("No data value to validate");
                Vec::new()
            }
        };

        let mut diagnostics = Vec::new();
        for error in errors {
            let path = error_path::resolve(&error);
            let Some(entry) = parsed.pointers.get(&path) else {
                // a diagnostic without a source range cannot be rendered
                debug!(path = %path, "No source range for validation error, dropping");
                continue;
            };

            let (start, end) = if error.targets_key() {
                (entry.key_start, entry.key_end)
            } else {
                (entry.value_start, entry.value_end)
            };

            let message = match &self.options.format_error {
                Some(format) => format(&error),
                None => messages::rewrite(&error),
            };

            trace!(path = %path, start, end, "Emitting diagnostic");
            diagnostics.push(Diagnostic {
                start,
                end,
                severity: Severity::Error,
                message,
                source: self.validator.title().to_owned(),
            });
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SERVICE_SCHEMA: &str = r#"{
        "title": "Service Config",
        "type": "object",
        "required": ["service"],
        "properties": {
            "service": { "type": "string" },
            "port": { "type": "number" },
            "runtime": {
                "type": "object",
                "required": ["type"],
                "properties": { "type": { "type": "string" } }
            }
        }
    }"#;

    const CONTROL_JSON: &str = r#"{
  "service": "api",
  "port": 8080,
  "runtime": {
    "type": "docker"
  }
}"#;

    fn linter(schema: &str) -> JsonLinter {
        let schema: serde_json::Value = serde_json::from_str(schema).expect("schema parses");
        JsonLinter::new(&schema).expect("schema compiles")
    }

    #[test]
    fn valid_document_yields_no_diagnostics() {
        assert_eq!(linter(SERVICE_SCHEMA).lint(CONTROL_JSON), Vec::new());
    }

    #[test]
    fn empty_and_blank_documents_are_ignored() {
        let linter = linter(SERVICE_SCHEMA);
        assert!(linter.lint("").is_empty());
        assert!(linter.lint("   \n\t ").is_empty());
        assert!(linter.lint(" { } ").is_empty());
    }

    #[test]
    fn malformed_document_yields_no_diagnostics() {
        assert!(linter(SERVICE_SCHEMA).lint(r#"{"a":"#).is_empty());
    }

    #[test]
    fn type_mismatch_covers_the_value_token() {
        let schema = r#"{
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        }"#;
        let text = r#"{"name": 42}"#;

        let diagnostics = linter(schema).lint(text);

        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(&text[d.start..d.end], "42");
        assert_eq!(
            d.message,
            "Expected <code>string</code> but received <code>number</code>"
        );
        assert_eq!(d.severity, Severity::Error);
    }

    #[test]
    fn rejected_property_underlines_the_key() {
        let schema = r#"{
            "type": "object",
            "properties": { "a": {} },
            "additionalProperties": false
        }"#;
        let text = r#"{"a":1,"b":2}"#;

        let diagnostics = linter(schema).lint(text);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(&text[diagnostics[0].start..diagnostics[0].end], "\"b\"");
    }

    #[test]
    fn one_of_failure_names_every_alternative() {
        let schema = r#"{"oneOf": [{"type": "string"}, {"type": "number"}]}"#;
        let text = r#"{"x": true}"#;

        let diagnostics = linter(schema).lint(text);

        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.message, "Expected one of string or number");
        // attributed to the whole document
        assert_eq!(&text[d.start..d.end], text);
    }

    #[test]
    fn diagnostics_carry_the_schema_title_as_source() {
        let text = r#"{"service": 1}"#;
        let diagnostics = linter(SERVICE_SCHEMA).lint(text);

        assert!(!diagnostics.is_empty());
        assert!(diagnostics.iter().all(|d| d.source == "Service Config"));
    }

    #[test]
    fn lint_is_idempotent() {
        let linter = linter(SERVICE_SCHEMA);
        let text = r#"{"service": 1, "port": "http"}"#;

        assert_eq!(linter.lint(text), linter.lint(text));
    }

    #[test]
    fn offsets_stay_within_the_document() {
        let linter = linter(SERVICE_SCHEMA);
        let text = r#"{"service": 1, "port": "http", "extra": null}"#;

        for d in linter.lint(text) {
            assert!(d.start <= d.end);
            assert!(d.end <= text.len());
        }
    }

    #[test]
    fn nested_required_reports_on_the_parent_object() {
        let text = r#"{"service": "api", "runtime": {}}"#;
        let diagnostics = linter(SERVICE_SCHEMA).lint(text);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(&text[diagnostics[0].start..diagnostics[0].end], "{}");
    }

    #[test]
    fn format_override_replaces_the_rewriter() {
        let schema: serde_json::Value =
            serde_json::from_str(SERVICE_SCHEMA).expect("schema parses");
        let options = JsonLinterOptions {
            format_error: Some(Box::new(|error: &StructuredError| {
                format!("custom: {}", error.pointer)
            })),
            parser: None,
        };
        let linter = JsonLinter::with_options(&schema, options).expect("schema compiles");

        let diagnostics = linter.lint(r#"{"service": 1}"#);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "custom: /service");
    }

    #[test]
    fn parser_override_replaces_parsing_and_pointers() {
        let schema = json!({"type": "object", "required": ["service"]});
        let options = JsonLinterOptions {
            format_error: None,
            parser: Some(Box::new(|_text: &str| ParsedDocument {
                // a parser that refuses everything: no data, no pointers
                data: None,
                pointers: PointerMap::new(),
            })),
        };
        let linter = JsonLinter::with_options(&schema, options).expect("schema compiles");

        assert!(linter.lint(r#"{"port": 8080}"#).is_empty());
    }
}
