use tracing::{debug, instrument, trace};

use crate::pointer_map::{self, PointerMap};

/// Parse output for one document snapshot: the data value when the text is
/// strict JSON, plus the pointer map regardless of parse outcome.
pub struct ParsedDocument {
    pub data: Option<serde_json::Value>,
    pub pointers: PointerMap,
}

/// Parses `text` into a data value and a pointer map. Never fails: a syntax
/// error yields `None` data, and the pointer map still covers whatever
/// structure the scanner recovered.
#[instrument(skip(text), fields(content_len = text.len()))]
pub fn parse_document(text: &str) -> ParsedDocument {
    let data = match serde_json::from_str(text) {
        Ok(value) => {
            trace!("Parsed document as strict JSON");
            Some(value)
        }
        Err(error) => {
            debug!(error = %error, "JSON parse failed, document has no data value");
            None
        }
    };

    ParsedDocument {
        data,
        pointers: pointer_map::build(text),
    }
}
