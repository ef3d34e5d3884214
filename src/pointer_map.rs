use std::collections::HashMap;

use tracing::{instrument, trace};

/// Source ranges for one node in the document, as byte offsets into the
/// original text. For array elements and the root value the key range
/// coincides with the value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEntry {
    pub key_start: usize,
    pub key_end: usize,
    pub value_start: usize,
    pub value_end: usize,
}

pub type PointerMap = HashMap<String, PointerEntry>;

/// Scans `text` and maps every reachable JSON Pointer to the ranges of its
/// key and value tokens. Never fails: on a syntax error the map covers
/// whatever structure was recovered up to that point.
#[instrument(skip(text), fields(content_len = text.len()))]
pub fn build(text: &str) -> PointerMap {
    let mut map = PointerMap::new();
    let mut scanner = Scanner {
        bytes: text.as_bytes(),
        pos: 0,
    };
    // a scan abort leaves the entries gathered so far in place
    let _ = scanner.value("", None, &mut map);
    trace!(entries = map.len(), "Built pointer map");
    map
}

/// Escapes one pointer segment per RFC 6901.
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Marker for an unrecoverable scan position; the partial map is still valid.
struct ScanAbort;

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, expected: u8) -> Result<(), ScanAbort> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(ScanAbort)
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Scans one value at `path`, recording its entry. `key` carries the key
    /// token range when the value is an object member.
    fn value(
        &mut self,
        path: &str,
        key: Option<(usize, usize)>,
        map: &mut PointerMap,
    ) -> Result<(), ScanAbort> {
        self.skip_ws();
        let value_start = self.pos;
        match self.peek().ok_or(ScanAbort)? {
            b'{' => self.object(path, map)?,
            b'[' => self.array(path, map)?,
            b'"' => {
                self.string_token()?;
            }
            _ => self.literal_token()?,
        }
        let value_end = self.pos;
        let (key_start, key_end) = key.unwrap_or((value_start, value_end));
        map.insert(
            path.to_owned(),
            PointerEntry {
                key_start,
                key_end,
                value_start,
                value_end,
            },
        );
        Ok(())
    }

    fn object(&mut self, path: &str, map: &mut PointerMap) -> Result<(), ScanAbort> {
        self.expect(b'{')?;
        self.skip_ws();
        if self.eat(b'}') {
            return Ok(());
        }
        loop {
            self.skip_ws();
            let key_start = self.pos;
            let name = self.string_token()?;
            let key_end = self.pos;
            self.skip_ws();
            self.expect(b':')?;
            let child = format!("{path}/{}", escape_segment(&name));
            self.value(&child, Some((key_start, key_end)), map)?;
            self.skip_ws();
            if self.eat(b',') {
                continue;
            }
            return self.expect(b'}');
        }
    }

    fn array(&mut self, path: &str, map: &mut PointerMap) -> Result<(), ScanAbort> {
        self.expect(b'[')?;
        self.skip_ws();
        if self.eat(b']') {
            return Ok(());
        }
        let mut index = 0usize;
        loop {
            let child = format!("{path}/{index}");
            self.value(&child, None, map)?;
            index += 1;
            self.skip_ws();
            if self.eat(b',') {
                continue;
            }
            return self.expect(b']');
        }
    }

    /// Consumes a quoted string and returns its decoded contents. Keys need
    /// the decoded form so pointer segments match the parsed data model.
    fn string_token(&mut self) -> Result<String, ScanAbort> {
        self.expect(b'"')?;
        let mut out: Vec<u8> = Vec::new();
        loop {
            match self.next().ok_or(ScanAbort)? {
                b'"' => return String::from_utf8(out).map_err(|_| ScanAbort),
                b'\\' => {
                    let decoded = match self.next().ok_or(ScanAbort)? {
                        b'"' => '"',
                        b'\\' => '\\',
                        b'/' => '/',
                        b'b' => '\u{0008}',
                        b'f' => '\u{000C}',
                        b'n' => '\n',
                        b'r' => '\r',
                        b't' => '\t',
                        b'u' => self.unicode_escape()?,
                        _ => return Err(ScanAbort),
                    };
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
                }
                b => out.push(b),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, ScanAbort> {
        let unit = self.hex4()?;
        // high surrogate must pair with a trailing \uXXXX low surrogate
        if (0xD800..0xDC00).contains(&unit) {
            if !(self.eat(b'\\') && self.eat(b'u')) {
                return Err(ScanAbort);
            }
            let low = self.hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(ScanAbort);
            }
            let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(code).ok_or(ScanAbort);
        }
        char::from_u32(unit).ok_or(ScanAbort)
    }

    fn hex4(&mut self) -> Result<u32, ScanAbort> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = match self.next().ok_or(ScanAbort)? {
                b @ b'0'..=b'9' => u32::from(b - b'0'),
                b @ b'a'..=b'f' => u32::from(b - b'a') + 10,
                b @ b'A'..=b'F' => u32::from(b - b'A') + 10,
                _ => return Err(ScanAbort),
            };
            value = value * 16 + digit;
        }
        Ok(value)
    }

    /// Consumes a number, `true`, `false` or `null` token. The scanner does
    /// not judge validity; the strict parser does.
    fn literal_token(&mut self) -> Result<(), ScanAbort> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'+' | b'.')
        ) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(ScanAbort);
        }
        Ok(())
    }
}
