//! Token cursor used by every text reader in the crate.
//!
//! Values are whitespace separated inside a larger attribute stream, so
//! readers consume exactly the tokens they understand and leave the rest for
//! the caller. A failed read never consumes input unless stated otherwise.

use super::FieldError;

/// A read position inside a persisted text value.
#[derive(Debug, Clone)]
pub struct TextCursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TextCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// The unread part of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// True when only whitespace remains.
    pub fn is_exhausted(&self) -> bool {
        self.rest().trim_start().is_empty()
    }

    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Next non-whitespace character, without consuming anything.
    pub fn peek_char(&self) -> Option<char> {
        self.rest().trim_start().chars().next()
    }

    /// Next whitespace-delimited token, without consuming anything.
    pub fn peek_token(&self) -> Option<&'a str> {
        let rest = self.rest().trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    }

    /// Consume the next whitespace-delimited token.
    pub fn next_token(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let token = self.peek_token()?;
        self.pos += token.len();
        Some(token)
    }

    /// Consume `token` if it is the next token.
    pub fn eat_token(&mut self, token: &str) -> bool {
        if self.peek_token() == Some(token) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `prefix` if the next token starts with it, so `uID:20`
    /// reads like `uID: 20`.
    pub fn eat_prefix(&mut self, prefix: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    /// Consume everything up to and including the next `stop` that is not
    /// inside double quotes. Returns false, with the input exhausted, when
    /// there is none.
    pub fn skip_past(&mut self, stop: char) -> bool {
        let mut quoted = false;
        for (offset, c) in self.rest().char_indices() {
            if c == '"' {
                quoted = !quoted;
            } else if c == stop && !quoted {
                self.pos += offset + c.len_utf8();
                return true;
            }
        }
        self.pos = self.input.len();
        false
    }

    /// Consume an identifier made of alphanumerics and underscores.
    pub fn read_word(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        self.pos += end;
        Some(&rest[..end])
    }

    /// Read a 32-bit integer.
    ///
    /// Leaves the input untouched when no digits follow. Digits that overflow
    /// are consumed and reported.
    pub fn read_int(&mut self) -> Result<i32, FieldError> {
        self.skip_whitespace();
        let rest = self.rest();
        let digits = integer_prefix(rest);
        if digits == 0 {
            return Err(FieldError::read_failure("an integer", rest));
        }
        let text = &rest[..digits];
        self.pos += digits;
        text.parse::<i32>()
            .map_err(|_| FieldError::IntegerOverflow {
                text: text.to_string(),
            })
    }

    /// Read an integer, restoring the position on any failure.
    pub fn try_int(&mut self) -> Option<i32> {
        let start = self.pos;
        match self.read_int() {
            Ok(value) => Some(value),
            Err(_) => {
                self.pos = start;
                None
            }
        }
    }

    /// Read a floating point number.
    pub fn read_f64(&mut self) -> Result<f64, FieldError> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = float_prefix(rest);
        match rest[..len].parse::<f64>() {
            Ok(value) if len > 0 => {
                self.pos += len;
                Ok(value)
            }
            _ => Err(FieldError::read_failure("a number", rest)),
        }
    }

    /// Read a double-quoted string. Everything up to the closing quote is
    /// taken literally, newlines included.
    pub fn read_quoted(&mut self) -> Result<String, FieldError> {
        self.skip_whitespace();
        let rest = self.rest();
        let Some(body) = rest.strip_prefix('"') else {
            return Err(FieldError::read_failure("a quoted string", rest));
        };
        match body.find('"') {
            Some(end) => {
                self.pos += end + 2;
                Ok(body[..end].to_string())
            }
            None => Err(FieldError::UnterminatedString {
                start: body.chars().take(24).collect(),
            }),
        }
    }

    /// Read a run of quoted strings separated by whitespace.
    ///
    /// Stops at the first non-quote character. Trailing empty strings are
    /// dropped, empty strings in between are kept.
    pub fn read_quoted_list(&mut self) -> Result<Vec<String>, FieldError> {
        let mut strings = Vec::new();
        while self.peek_char() == Some('"') {
            strings.push(self.read_quoted()?);
        }
        while strings.last().is_some_and(String::is_empty) {
            strings.pop();
        }
        Ok(strings)
    }
}

/// Append `value` surrounded by double quotes.
pub fn write_quoted(out: &mut String, value: &str) {
    out.push('"');
    out.push_str(value);
    out.push('"');
}

fn integer_prefix(text: &str) -> usize {
    let bytes = text.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));
    let digits = bytes[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 { 0 } else { sign + digits }
}

fn float_prefix(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));
    let mantissa_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == mantissa_start || (end == mantissa_start + 1 && bytes[mantissa_start] == b'.') {
        return 0;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let exponent = integer_prefix(&text[end + 1..]);
        if exponent > 0 {
            end += 1 + exponent;
        }
    }
    end
}
