use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::validation::{ErrorKind, StructuredError};

/// Rewrites a structured error into display text. Union-type and
/// type-mismatch errors get dedicated formats; everything else starts from
/// the engine's raw message and cleans up its internal path syntax.
pub fn rewrite(error: &StructuredError) -> String {
    let message = match &error.kind {
        ErrorKind::OneOf { alternatives } => {
            format!("Expected one of {}", join_with_or(alternatives))
        }
        ErrorKind::Type { expected, received } => format!(
            "Expected <code>{}</code> but received <code>{}</code>",
            join_with_or(expected),
            received
        ),
        _ => cleanup(&error.message),
    };
    trace!(message = %message, "Rewrote validation error");
    message
}

/// Joins items into a natural-language alternative list:
/// `a` / `a or b` / `a, b, or c`.
pub fn join_with_or<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_owned(),
        [first, second] => format!("{} or {}", first.as_ref(), second.as_ref()),
        [head @ .., last] => {
            let head = head
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}, or {}", head, last.as_ref())
        }
    }
}

/// Strips engine-internal path syntax from a raw message and converts
/// backtick spans into code spans.
fn cleanup(raw: &str) -> String {
    static BACKTICK_SPAN: OnceLock<Regex> = OnceLock::new();
    let backtick_span =
        BACKTICK_SPAN.get_or_init(|| Regex::new(r"`([^`]*)`").expect("Valid regex"));

    let message = raw
        // don't mention the root object
        .replace("in `#` ", "")
        .replace('/', ".")
        .replace("#.", "");

    backtick_span
        .replace_all(&message, "<code>$1</code>")
        .into_owned()
}
