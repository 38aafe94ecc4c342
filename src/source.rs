//! Reader for the generator's JavaScript search-data files.
//!
//! Index files are a single literal assigned to a top-level variable, e.g.
//! `var searchData = [ ['deque_14102', ['deque', [...]]], ... ];`. The reader
//! accepts the subset of JavaScript literal syntax the generator emits
//! (arrays, single- or double-quoted strings, numbers, `true`/`false`/`null`,
//! comments, trailing commas) and produces a `serde_json::Value` so the table
//! loader validates one representation regardless of the file flavour.

use crate::error::{IndexError, IndexResult};
use serde_json::{Number, Value};

/// Parse a search-data script. A leading `var name =` (or `let`/`const`) and
/// a trailing `;` are optional.
pub fn parse_search_script(text: &str) -> IndexResult<Value> {
    let mut reader = Reader::new(text);
    reader.skip_trivia()?;
    reader.skip_assignment()?;
    reader.skip_trivia()?;
    let value = reader.value()?;
    reader.skip_trivia()?;
    if reader.peek() == Some(b';') {
        reader.pos += 1;
        reader.skip_trivia()?;
    }
    if reader.pos < reader.bytes.len() {
        return Err(reader.error("unexpected trailing content"));
    }
    Ok(value)
}

/// Parse a JSON document holding the same tuple layout.
pub fn parse_search_json(text: &str) -> IndexResult<Value> {
    serde_json::from_str(text).map_err(|err| IndexError::Syntax {
        offset: byte_offset(text, err.line(), err.column()),
        message: err.to_string(),
    })
}

fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

struct Reader<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn error(&self, message: impl Into<String>) -> IndexError {
        IndexError::Syntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> IndexResult<()> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    let start = self.pos;
                    match self.text[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += end + 4,
                        None => {
                            self.pos = start;
                            return Err(self.error("unterminated block comment"));
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_assignment(&mut self) -> IndexResult<()> {
        if matches!(self.peek(), Some(b'[' | b'{' | b'\'' | b'"')) {
            return Ok(());
        }
        let rest = &self.text[self.pos..];
        let Some(eq) = rest.find('=') else {
            return Err(self.error("expected an array literal or an assignment"));
        };
        let lhs = rest[..eq].trim();
        let name = ["var ", "let ", "const "]
            .iter()
            .find_map(|kw| lhs.strip_prefix(kw))
            .unwrap_or(lhs)
            .trim();
        let valid_ident = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'));
        if !valid_ident {
            return Err(self.error(format!("unsupported assignment target '{lhs}'")));
        }
        self.pos += eq + 1;
        Ok(())
    }

    fn value(&mut self) -> IndexResult<Value> {
        match self.peek() {
            Some(b'[') => self.array(),
            Some(quote @ (b'\'' | b'"')) => self.string(quote).map(Value::String),
            Some(b'-' | b'0'..=b'9') => self.number(),
            Some(b) if b.is_ascii_alphabetic() => self.keyword(),
            Some(b) => Err(self.error(format!("unexpected character '{}'", b as char))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn array(&mut self) -> IndexResult<Value> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b']') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                Some(_) => return Err(self.error("expected ',' or ']'")),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn string(&mut self, quote: u8) -> IndexResult<String> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let rest = &self.text[self.pos..];
            let Some(offset) = rest.find(|c: char| c == quote as char || c == '\\' || c == '\n') else {
                self.pos = start;
                return Err(self.error("unterminated string"));
            };
            out.push_str(&rest[..offset]);
            self.pos += offset;
            match self.bytes[self.pos] {
                b'\\' => {
                    self.pos += 1;
                    out.push(self.escape()?);
                }
                b'\n' => return Err(self.error("newline in string literal")),
                _ => {
                    self.pos += 1;
                    return Ok(out);
                }
            }
        }
    }

    fn escape(&mut self) -> IndexResult<char> {
        let Some(b) = self.peek() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += 1;
        let c = match b {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'0' => '\0',
            b'u' => return self.unicode_escape(),
            b'x' => {
                let code = self.hex_digits(2)?;
                return char::from_u32(code).ok_or_else(|| self.error("invalid \\x escape"));
            }
            other if other.is_ascii() => other as char,
            _ => {
                // Escaped non-ASCII character: back up and take the full char.
                self.pos -= 1;
                let c = self.text[self.pos..]
                    .chars()
                    .next()
                    .ok_or_else(|| self.error("unterminated escape"))?;
                self.pos += c.len_utf8();
                c
            }
        };
        Ok(c)
    }

    fn unicode_escape(&mut self) -> IndexResult<char> {
        let high = self.hex_digits(4)?;
        if (0xD800..0xDC00).contains(&high) {
            if self.text[self.pos..].starts_with("\\u") {
                self.pos += 2;
                let low = self.hex_digits(4)?;
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code).ok_or_else(|| self.error("invalid surrogate pair"));
                }
            }
            return Err(self.error("unpaired surrogate in \\u escape"));
        }
        char::from_u32(high).ok_or_else(|| self.error("invalid \\u escape"))
    }

    fn hex_digits(&mut self, count: usize) -> IndexResult<u32> {
        let digits = self
            .text
            .get(self.pos..self.pos + count)
            .ok_or_else(|| self.error("truncated escape"))?;
        let code =
            u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid hex escape"))?;
        self.pos += count;
        Ok(code)
    }

    fn number(&mut self) -> IndexResult<Value> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')) {
            self.pos += 1;
        }
        let raw = &self.text[start..self.pos];
        if let Ok(int) = raw.parse::<i64>() {
            return Ok(Value::from(int));
        }
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| IndexError::Syntax {
                offset: start,
                message: format!("invalid number '{raw}'"),
            })
    }

    fn keyword(&mut self) -> IndexResult<Value> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        match &self.text[start..self.pos] {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" | "undefined" => Ok(Value::Null),
            other => Err(IndexError::Syntax {
                offset: start,
                message: format!("unexpected identifier '{other}'"),
            }),
        }
    }
}
