use tower_lsp::lsp_types::Position;
use tracing::{instrument, trace};

/// Zero-based line number for a byte offset, counted as newline occurrences
/// before it. Offsets past the end clamp to the last line.
#[instrument(skip(raw_file_contents))]
pub fn from_index(raw_file_contents: &str, index: usize) -> u32 {
    let safe_index = index.min(raw_file_contents.len());

    let line_number = raw_file_contents[..safe_index]
        .bytes()
        .filter(|b| *b == b'\n')
        .count() as u32;

    trace!(
        index = safe_index,
        line_number = line_number,
        "Calculated line number from index"
    );

    line_number
}

/// Converts a byte offset into an LSP position. The character column is in
/// UTF-16 code units, as the LSP default encoding requires.
pub fn position_of(raw_file_contents: &str, index: usize) -> Position {
    let safe_index = index.min(raw_file_contents.len());
    let line = from_index(raw_file_contents, safe_index);

    let line_start = raw_file_contents[..safe_index]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let character = raw_file_contents[line_start..safe_index]
        .encode_utf16()
        .count() as u32;

    Position { line, character }
}
