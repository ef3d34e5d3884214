use tracing::trace;

use crate::pointer_map::escape_segment;
use crate::validation::StructuredError;

/// Derives the best-available document path for a validation error.
///
/// Tie-break order: the error's own pointer when it names more than the bare
/// root, else `/` plus its property name, else the empty pointer for the
/// whole document. Never fails; ambiguous errors degrade to the whole
/// document.
pub fn resolve(error: &StructuredError) -> String {
    // schema-error space may prefix the root marker; the map never does
    let pointer = error.pointer.strip_prefix('#').unwrap_or(&error.pointer);

    if !pointer.is_empty() && pointer != "/" {
        return pointer.to_owned();
    }
    if let Some(property) = error.property() {
        return format!("/{}", escape_segment(property));
    }
    trace!("Error carries no pointer or property, attributing to whole document");
    String::new()
}
