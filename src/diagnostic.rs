use serde::Serialize;

/// Diagnostic severity. Schema violations are always errors; the variant
/// exists so hosts render a stable severity string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// A position-anchored, user-facing validation message. Offsets are byte
/// offsets into the document text that produced the diagnostic, with
/// `start <= end`. Owned by the host once emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub start: usize,
    pub end: usize,
    pub severity: Severity,
    /// Display text; may embed `<code>` spans for fixed-width fragments.
    pub message: String,
    /// Schema title, or the default source label.
    pub source: String,
}

/// One fragment of a rendered message. Escaping is the renderer's
/// responsibility; the text here is raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSpan {
    Text(String),
    Code(String),
}

impl Diagnostic {
    /// Renders the message into plain and code fragments, splitting on the
    /// embedded `<code>` markup. Computed on demand; hosts that only show
    /// plain text never pay for it.
    pub fn render_message(&self) -> Vec<MessageSpan> {
        let mut spans = Vec::new();
        let mut rest = self.message.as_str();

        while let Some(open) = rest.find("<code>") {
            if open > 0 {
                spans.push(MessageSpan::Text(rest[..open].to_owned()));
            }
            let after_open = &rest[open + "<code>".len()..];
            match after_open.find("</code>") {
                Some(close) => {
                    spans.push(MessageSpan::Code(after_open[..close].to_owned()));
                    rest = &after_open[close + "</code>".len()..];
                }
                None => {
                    // unterminated markup renders literally
                    spans.push(MessageSpan::Text(rest[open..].to_owned()));
                    rest = "";
                }
            }
        }
        if !rest.is_empty() {
            spans.push(MessageSpan::Text(rest.to_owned()));
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(message: &str) -> Diagnostic {
        Diagnostic {
            start: 0,
            end: 0,
            severity: Severity::Error,
            message: message.to_owned(),
            source: "json-schema".to_owned(),
        }
    }

    #[test]
    fn severity_serializes_as_error_string() {
        let value = serde_json::to_value(Severity::Error).expect("severity serializes");
        assert_eq!(value, serde_json::json!("error"));
    }

    #[test]
    fn plain_message_is_one_text_span() {
        let spans = diagnostic("something went wrong").render_message();
        assert_eq!(
            spans,
            vec![MessageSpan::Text("something went wrong".to_owned())]
        );
    }

    #[test]
    fn code_markup_splits_into_spans() {
        let spans =
            diagnostic("Expected <code>string</code> but received <code>number</code>")
                .render_message();
        assert_eq!(
            spans,
            vec![
                MessageSpan::Text("Expected ".to_owned()),
                MessageSpan::Code("string".to_owned()),
                MessageSpan::Text(" but received ".to_owned()),
                MessageSpan::Code("number".to_owned()),
            ]
        );
    }

    #[test]
    fn unterminated_markup_renders_literally() {
        let spans = diagnostic("broken <code>span").render_message();
        assert_eq!(
            spans,
            vec![
                MessageSpan::Text("broken ".to_owned()),
                MessageSpan::Text("<code>span".to_owned()),
            ]
        );
    }
}
