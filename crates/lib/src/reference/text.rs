//! Text form of a single reference.
//!
//! ```text
//! 0                               empty slot
//! 20                              object id
//! 20 BEAM                         object id with explicit type name
//! aID: 1 4 uID: 20 [BEAM]         object id inside assembly 1/4
//! ```

use std::fmt::Write as _;

use super::ReferenceError;
use crate::{
    ObjectId,
    constants::{ASSEMBLY_TOKEN, USER_ID_TOKEN},
    field::TextCursor,
};

/// A reference as read from text, before type names are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference<'a> {
    pub id: ObjectId,
    pub assembly: Vec<i32>,
    pub type_name: Option<&'a str>,
}

/// True when the next token can begin a reference: a digit, a minus sign
/// or the assembly token.
pub fn starts_reference(cursor: &TextCursor<'_>) -> bool {
    match cursor.peek_char() {
        Some(c) if c.is_ascii_digit() || c == '-' => true,
        Some(_) => cursor.rest().trim_start().starts_with(ASSEMBLY_TOKEN),
        None => false,
    }
}

/// Parse one reference. On failure the cursor may have advanced past the
/// tokens that were recognised.
pub fn parse_reference<'a>(
    cursor: &mut TextCursor<'a>,
) -> Result<ParsedReference<'a>, ReferenceError> {
    let mut assembly = Vec::new();
    let id = match cursor.try_int() {
        Some(id) => id,
        None => {
            if !cursor.eat_prefix(ASSEMBLY_TOKEN) {
                return Err(ReferenceError::malformed(
                    "expected an object id or \"aID:\"",
                    cursor.rest(),
                ));
            }
            while let Some(level) = cursor.try_int() {
                assembly.push(level);
            }
            if !cursor.eat_prefix(USER_ID_TOKEN) {
                return Err(ReferenceError::malformed(
                    "expected \"uID:\" after the assembly path",
                    cursor.rest(),
                ));
            }
            cursor.read_int().map_err(|_| {
                ReferenceError::malformed("expected an object id after \"uID:\"", cursor.rest())
            })?
        }
    };

    Ok(ParsedReference {
        id,
        assembly,
        type_name: read_type_name(cursor),
    })
}

/// Append the text form of a non-empty reference.
pub fn write_reference(out: &mut String, id: ObjectId, assembly: &[i32], type_name: Option<&str>) {
    if !assembly.is_empty() {
        out.push_str(ASSEMBLY_TOKEN);
        out.push(' ');
        for level in assembly {
            let _ = write!(out, "{level} ");
        }
        out.push_str(USER_ID_TOKEN);
        out.push(' ');
    }
    let _ = write!(out, "{id}");
    if let Some(name) = type_name {
        out.push(' ');
        out.push_str(name);
    }
}

// A following word is a type name unless it begins the next reference
fn read_type_name<'a>(cursor: &mut TextCursor<'a>) -> Option<&'a str> {
    match cursor.peek_char() {
        Some(c) if c.is_ascii_alphabetic() && !starts_reference(cursor) => cursor.read_word(),
        _ => None,
    }
}
