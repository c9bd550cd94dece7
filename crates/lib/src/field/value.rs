//! Text adapters for the value types a [`TypedField`](super::TypedField) can hold.

use std::fmt::{Debug, Write as _};

use super::{FieldError, TextCursor, text::write_quoted};

/// A value type storable in a field.
///
/// Implementations define how the value is printed into and read back from
/// a record. Reading consumes only the tokens belonging to the value.
pub trait FieldValue: Clone + PartialEq + Debug + Default + 'static {
    /// Short name used in diagnostics.
    const TYPE_NAME: &'static str;

    fn write_value(&self, out: &mut String);

    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError>;

    /// Whether a field holding this value is worth printing at all.
    fn is_printable(&self) -> bool {
        true
    }
}

impl FieldValue for i32 {
    const TYPE_NAME: &'static str = "int";

    fn write_value(&self, out: &mut String) {
        let _ = write!(out, "{self}");
    }

    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError> {
        cursor.read_int()
    }
}

impl FieldValue for f64 {
    const TYPE_NAME: &'static str = "double";

    fn write_value(&self, out: &mut String) {
        let _ = write!(out, "{self}");
    }

    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError> {
        cursor.read_f64()
    }
}

impl FieldValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn write_value(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }

    /// Accepts a leading digit (`0` is false) or one of `true`/`yes`
    /// (any case). Any other word reads as false.
    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError> {
        match cursor.peek_char() {
            Some(c) if c.is_ascii_digit() => {
                let value = cursor.read_int()?;
                Ok(value != 0)
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let word = cursor.read_word().unwrap_or_default().to_ascii_uppercase();
                Ok(word == "TRUE" || word == "YES")
            }
            _ => Err(FieldError::read_failure("a boolean", cursor.rest())),
        }
    }
}

impl FieldValue for String {
    const TYPE_NAME: &'static str = "string";

    fn write_value(&self, out: &mut String) {
        write_quoted(out, self);
    }

    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError> {
        cursor.read_quoted()
    }

    fn is_printable(&self) -> bool {
        !self.is_empty()
    }
}

impl FieldValue for Vec<String> {
    const TYPE_NAME: &'static str = "strings";

    /// One string per line after the first, empty ones kept on the same line.
    fn write_value(&self, out: &mut String) {
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(if value.is_empty() { " " } else { "\n\t" });
            }
            write_quoted(out, value);
        }
    }

    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError> {
        cursor.read_quoted_list()
    }

    fn is_printable(&self) -> bool {
        !self.is_empty()
    }
}

impl FieldValue for Vec<f64> {
    const TYPE_NAME: &'static str = "doubles";

    /// Six numbers per line.
    fn write_value(&self, out: &mut String) {
        write_rows(out, self, 6, |out, v| {
            let _ = write!(out, "{v}");
        });
    }

    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError> {
        let mut values = Vec::new();
        while let Ok(value) = cursor.read_f64() {
            values.push(value);
        }
        Ok(values)
    }

    fn is_printable(&self) -> bool {
        !self.is_empty()
    }
}

impl FieldValue for Vec<i32> {
    const TYPE_NAME: &'static str = "ints";

    /// Ten numbers per line.
    fn write_value(&self, out: &mut String) {
        write_rows(out, self, 10, |out, v| {
            let _ = write!(out, "{v}");
        });
    }

    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError> {
        let mut values = Vec::new();
        while let Some(value) = cursor.try_int() {
            values.push(value);
        }
        Ok(values)
    }

    fn is_printable(&self) -> bool {
        !self.is_empty()
    }
}

impl FieldValue for (i32, i32) {
    const TYPE_NAME: &'static str = "int pair";

    fn write_value(&self, out: &mut String) {
        let _ = write!(out, "{} {}", self.0, self.1);
    }

    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError> {
        Ok((cursor.read_int()?, cursor.read_int()?))
    }
}

impl FieldValue for (f64, f64) {
    const TYPE_NAME: &'static str = "double pair";

    fn write_value(&self, out: &mut String) {
        let _ = write!(out, "{} {}", self.0, self.1);
    }

    fn read_value(cursor: &mut TextCursor<'_>) -> Result<Self, FieldError> {
        Ok((cursor.read_f64()?, cursor.read_f64()?))
    }
}

fn write_rows<T>(out: &mut String, values: &[T], per_row: usize, item: impl Fn(&mut String, &T)) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(if i % per_row == 0 { "\n\t" } else { " " });
        }
        item(out, value);
    }
}
