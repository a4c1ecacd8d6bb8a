// src/store/literal.rs
//! Decoder and encoder for the store's textual form:
//!
//! ```text
//! const contacts = [
//!   { slug: "contact-x", title: 'X', links: [ { label: null, url: "https://…" }, ], },
//! ];
//! ```
//!
//! The decoder accepts a superset of JSON: bare or quoted keys, single,
//! double or backtick strings, trailing commas, `//` and `/* */` comments,
//! `undefined`. Text before the array's `[` and after its `]` is kept
//! verbatim so it can be re-emitted unchanged.
//!
//! The encoder writes one canonical layout (two-space indent, bare keys
//! where they are valid identifiers, double-quoted strings). Encoding an
//! already-encoded store is a fixed point.

use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

const MAX_DEPTH: usize = 128;

/// A record decoded from the top-level array, with the 1-based position of
/// its opening brace for error reporting.
#[derive(Debug)]
pub struct Record {
    pub fields: Map<String, Value>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug)]
pub struct Decoded {
    pub prefix: String,
    pub records: Vec<Record>,
    pub suffix: String,
}

/// Decode a whole store text. Fails on anything that is not
/// `<prefix> [ {record}, ... ] <suffix>`.
pub fn decode(text: &str) -> Result<Decoded> {
    let mut p = Parser::new(text);
    let start = p.find_array_start()?;
    let prefix = s!(&text[..start]);

    p.expect(b'[')?;
    let mut records = Vec::new();
    loop {
        p.skip_trivia()?;
        match p.peek() {
            Some(b']') => { p.pos += 1; break; }
            Some(b'{') => {
                let (line, column) = p.position();
                let fields = p.parse_object(1)?;
                records.push(Record { fields, line, column });
            }
            Some(_) => return Err(p.error(format!("store element {} is not a record", records.len()))),
            None => return Err(p.error("unterminated store array")),
        }
        p.skip_trivia()?;
        match p.peek() {
            Some(b',') => p.pos += 1,
            Some(b']') => {}
            _ => return Err(p.error("expected `,` or `]` after record")),
        }
    }

    Ok(Decoded { prefix, records, suffix: s!(&text[p.pos..]) })
}

/// Encode records back to text between the given prefix and suffix.
pub fn encode<'a>(
    prefix: &str,
    records: impl IntoIterator<Item = &'a Map<String, Value>>,
    suffix: &str,
) -> String {
    let mut out = s!(prefix);
    let items: Vec<&Map<String, Value>> = records.into_iter().collect();
    if items.is_empty() {
        out.push_str("[]");
    } else {
        out.push_str("[\n");
        for (i, rec) in items.iter().enumerate() {
            if i > 0 { out.push_str(",\n"); }
            indent(&mut out, 1);
            write_object(&mut out, rec, 1);
        }
        out.push_str("\n]");
    }
    out.push_str(suffix);
    out
}

/* ---------------- Encoding ---------------- */

fn indent(out: &mut String, level: usize) {
    for _ in 0..level { out.push_str("  "); }
}

fn write_value(out: &mut String, v: &Value, level: usize) {
    match v {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            if items.is_empty() { out.push_str("[]"); return; }
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                if i > 0 { out.push_str(",\n"); }
                indent(out, level + 1);
                write_value(out, item, level + 1);
            }
            out.push('\n');
            indent(out, level);
            out.push(']');
        }
        Value::Object(map) => write_object(out, map, level),
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>, level: usize) {
    if map.is_empty() { out.push_str("{}"); return; }
    out.push_str("{\n");
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 { out.push_str(",\n"); }
        indent(out, level + 1);
        write_key(out, key);
        out.push_str(": ");
        write_value(out, value, level + 1);
    }
    out.push('\n');
    indent(out, level);
    out.push('}');
}

fn write_key(out: &mut String, key: &str) {
    if is_bare_identifier(key) { out.push_str(key); } else { write_string(out, key); }
}

/// `[A-Za-z_$][A-Za-z0-9_$]*`
pub fn is_bare_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{2028}' | '\u{2029}' => out.push_str(&format!("\\u{:04x}", ch as u32)),
            c if (c as u32) < 0x20 || c == '\u{7f}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/* ---------------- Decoding ---------------- */

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self { Self { src, bytes: src.as_bytes(), pos: 0 } }

    fn peek(&self) -> Option<u8> { self.bytes.get(self.pos).copied() }

    fn peek_char(&self) -> Option<char> { self.src[self.pos..].chars().next() }

    fn position(&self) -> (usize, usize) {
        let before = &self.src[..self.pos];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        let (line, column) = self.position();
        Error::Decode { line, column, message: message.into() }
    }

    fn expect(&mut self, b: u8) -> Result<()> {
        self.skip_trivia()?;
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", b as char)))
        }
    }

    /// Skip whitespace (including BOM) and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c) => self.pos += 1,
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    match self.src[self.pos..].find('\n') {
                        Some(nl) => self.pos += nl + 1,
                        None => self.pos = self.bytes.len(),
                    }
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    match self.src[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += end + 4,
                        None => return Err(self.error("unterminated block comment")),
                    }
                }
                Some(b) if b >= 0x80 => match self.peek_char() {
                    Some(c) if c.is_whitespace() || c == '\u{feff}' => self.pos += c.len_utf8(),
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    /// Position of the store array's `[`: either the first token of the
    /// text, or the first token after the first top-level `=`.
    fn find_array_start(&mut self) -> Result<usize> {
        self.skip_trivia()?;
        if self.peek() == Some(b'[') {
            return Ok(self.pos);
        }
        loop {
            match self.peek() {
                None => return Err(self.error("no `= [` array assignment found")),
                Some(b'=') => {
                    self.pos += 1;
                    self.skip_trivia()?;
                    return if self.peek() == Some(b'[') {
                        Ok(self.pos)
                    } else {
                        Err(self.error("expected an array literal after `=`"))
                    };
                }
                Some(b'/') if matches!(self.bytes.get(self.pos + 1), Some(b'/' | b'*')) => {
                    self.skip_trivia()?;
                }
                Some(_) => {
                    let step = self.peek_char().map_or(1, char::len_utf8);
                    self.pos += step;
                }
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.skip_trivia()?;
        match self.peek() {
            Some(b'{') => Ok(Value::Object(self.parse_object(depth)?)),
            Some(b'[') => self.parse_array(depth),
            Some(q @ (b'"' | b'\'' | b'`')) => Ok(Value::String(self.parse_string(q)?)),
            Some(b'-' | b'+' | b'.' | b'0'..=b'9') => self.parse_number(),
            Some(_) => {
                let start = self.pos;
                let word = self.parse_identifier();
                match word {
                    "null" | "undefined" => Ok(Value::Null),
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "" => Err(self.error("unexpected character")),
                    other => {
                        let msg = format!("unsupported value `{other}`");
                        self.pos = start;
                        Err(self.error(msg))
                    }
                }
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self, depth: usize) -> Result<Map<String, Value>> {
        self.expect(b'{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') { self.pos += 1; return Ok(map); }

            let key = self.parse_key()?;
            self.expect(b':')?;
            let value = self.parse_value(depth + 1)?;
            map.insert(key, value);

            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("expected `,` or `}` in record")),
            }
        }
    }

    fn parse_array(&mut self, depth: usize) -> Result<Value> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b']') { self.pos += 1; return Ok(Value::Array(items)); }

            items.push(self.parse_value(depth + 1)?);

            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                _ => return Err(self.error("expected `,` or `]` in array")),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String> {
        match self.peek() {
            Some(q @ (b'"' | b'\'' | b'`')) => self.parse_string(q),
            Some(b'0'..=b'9') => {
                let start = self.pos;
                while matches!(self.peek(), Some(b'0'..=b'9' | b'.')) { self.pos += 1; }
                Ok(s!(&self.src[start..self.pos]))
            }
            _ => match self.parse_identifier() {
                "" => Err(self.error("expected a field name")),
                ident => Ok(s!(ident)),
            },
        }
    }

    fn parse_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    fn parse_string(&mut self, quote: u8) -> Result<String> {
        self.pos += 1; // opening quote
        let mut out = s!();
        loop {
            let Some(c) = self.peek_char() else {
                return Err(self.error("unterminated string"));
            };
            self.pos += c.len_utf8();
            match c {
                _ if c as u32 == quote as u32 => return Ok(out),
                '\\' => self.parse_escape(&mut out)?,
                '\n' | '\r' if quote != b'`' => {
                    self.pos -= 1;
                    return Err(self.error("line break inside string"));
                }
                '$' if quote == b'`' && self.peek() == Some(b'{') => {
                    return Err(self.error("template interpolation is not supported"));
                }
                _ => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<()> {
        let Some(c) = self.peek_char() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += c.len_utf8();
        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !matches!(self.peek(), Some(b'0'..=b'9')) => out.push('\0'),
            'x' => {
                let code = self.hex_digits(2)?;
                out.push(self.char_from(code)?);
            }
            'u' => {
                let ch = self.parse_unicode_escape()?;
                out.push(ch);
            }
            // line continuation
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => { if self.peek() == Some(b'\n') { self.pos += 1; } }
            other => out.push(other),
        }
        Ok(())
    }

    fn parse_unicode_escape(&mut self) -> Result<char> {
        if self.peek() == Some(b'{') {
            self.pos += 1;
            let end = self.src[self.pos..].find('}').ok_or_else(|| self.error("unterminated `\\u{`"))?;
            let digits = &self.src[self.pos..self.pos + end];
            let code = u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid `\\u{}` escape"))?;
            self.pos += end + 1;
            return self.char_from(code);
        }

        let high = self.hex_digits(4)?;
        if (0xD800..0xDC00).contains(&high) {
            if self.src[self.pos..].starts_with("\\u") {
                self.pos += 2;
                let low = self.hex_digits(4)?;
                if (0xDC00..0xE000).contains(&low) {
                    return self.char_from(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
                }
            }
            return Err(self.error("unpaired surrogate in `\\u` escape"));
        }
        self.char_from(high)
    }

    fn hex_digits(&mut self, n: usize) -> Result<u32> {
        let digits = self.src.get(self.pos..self.pos + n).ok_or_else(|| self.error("truncated hex escape"))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid hex escape"))?;
        self.pos += n;
        Ok(code)
    }

    fn char_from(&self, code: u32) -> Result<char> {
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid code point U+{code:X}")))
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) { self.pos += 1; }

        let rest = &self.src[self.pos..];
        if rest.starts_with("0x") || rest.starts_with("0X") {
            self.pos += 2;
            let digits_start = self.pos;
            while matches!(self.peek(), Some(b) if b.is_ascii_hexdigit()) { self.pos += 1; }
            let magnitude = i64::from_str_radix(&self.src[digits_start..self.pos], 16)
                .map_err(|_| self.error("invalid hex number"))?;
            let value = if self.src[start..].starts_with('-') { -magnitude } else { magnitude };
            return Ok(Value::Number(value.into()));
        }

        let mut is_float = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' | b'e' | b'E' => { is_float = true; self.pos += 1; }
                b'-' | b'+' if matches!(self.bytes[self.pos - 1], b'e' | b'E') => self.pos += 1,
                _ => break,
            }
        }

        let text = self.src[start..self.pos].trim_start_matches('+');
        if !is_float {
            if let Ok(i) = text.parse::<i64>() { return Ok(Value::Number(i.into())); }
            if let Ok(u) = text.parse::<u64>() { return Ok(Value::Number(u.into())); }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("invalid number `{}`", &self.src[start..self.pos])))
    }
}
